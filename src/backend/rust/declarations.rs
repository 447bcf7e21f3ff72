//! Declaration emission for Rust: structs and their impls, traits, enums, modules, attributes and visibility.

use polyemit_core::lang::markers;
use polyemit_syntax::ast::*;

use super::expressions::escape_ident;
use super::types::{CATCH_ALL, UNIT};
use super::{RustGenerator, TARGET};
use crate::backend::lowering;
use crate::backend::{GenResult, GenerateError, Scope};
use crate::diagnostics::Diagnostic;

/// Attribute names Rust defines itself; anything else is kept as a comment.
const RUST_ATTRIBUTES: &[&str] = &["derive", "inline", "allow", "cfg", "test", "must_use", "deprecated", "repr"];

/// Where an item list lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ItemHost {
    /// Crate root or a namespace `mod`.
    Namespace,
    /// A module: fields become `const` items.
    Module,
}

/// How a method takes `self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum Receiver {
    #[default]
    None,
    Shared,
    Exclusive,
}

/// What an interface declared in the unit requires of every implementer.
#[derive(Debug, Default)]
pub(super) struct TraitShape {
    /// Method name and the receiver the trait and all of its impls agree on.
    pub methods: Vec<(String, Receiver)>,
    /// Property name and whether a setter is required.
    pub properties: Vec<(String, bool)>,
}

impl TraitShape {
    pub fn receiver(&self, method: &str) -> Option<Receiver> {
        self.methods.iter().find(|(name, _)| name == method).map(|(_, receiver)| *receiver)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|(prop, _)| prop == name)
    }

    pub fn has_setter(&self, name: &str) -> bool {
        self.properties.iter().any(|(prop, setter)| prop == name && *setter)
    }

    /// An implementer mutates `self` in `method`, so the signature must take `&mut self` everywhere.
    pub fn require_exclusive(&mut self, method: &str) {
        for (name, receiver) in &mut self.methods {
            if name == method && *receiver == Receiver::Shared {
                *receiver = Receiver::Exclusive;
            }
        }
    }
}

/// The members of one `impl Trait for Type` block.
#[derive(Default)]
struct TraitImpl<'d> {
    methods: Vec<&'d FunctionDecl>,
    accessors: Vec<&'d PropertyDecl>,
    /// Indices into the struct's fields of auto-properties the trait exposes through accessors.
    backed: Vec<usize>,
}

/// Per-call overrides for [`RustGenerator::emit_function`].
#[derive(Debug)]
pub(super) struct FunctionOptions<'o> {
    pub name_override: Option<&'o str>,
    pub return_override: Option<String>,
    pub visibility: &'o str,
    pub receiver: Receiver,
    /// Statements emitted ahead of the declared body.
    pub prologue: &'o [&'o Statement],
    /// Bodiless functions get `unimplemented!()`; trait declarations keep a bare `;`.
    pub require_body: bool,
}

impl Default for FunctionOptions<'_> {
    fn default() -> Self {
        Self {
            name_override: None,
            return_override: None,
            visibility: "pub ",
            receiver: Receiver::None,
            prologue: &[],
            require_body: true,
        }
    }
}

/// One struct field, from a field or an auto-property.
struct FieldSpec<'d> {
    visibility: &'static str,
    name: &'d str,
    ty: String,
    init: Option<&'d Expr>,
}

impl RustGenerator<'_> {
    pub(super) fn emit_item(&mut self, stmt: &Statement, scope: Scope<'_>, host: ItemHost) -> GenResult<()> {
        match stmt {
            Statement::Namespace(ns) => self.emit_namespace(ns)?,
            Statement::Class(decl) | Statement::Struct(decl) => self.emit_struct(decl)?,
            Statement::Interface(decl) => self.emit_trait(decl)?,
            Statement::Enum(decl) => self.emit_enum(decl)?,
            Statement::Module(module) => self.emit_module(module)?,
            Statement::Function(func) | Statement::Method(func) => {
                self.out.separator();
                let options = FunctionOptions {
                    visibility: visibility(&func.modifiers, true),
                    ..FunctionOptions::default()
                };
                self.emit_function(func, scope, options)?;
            }
            Statement::Field(field) if host == ItemHost::Module => {
                if !self.skip_marked("field", &field.name, &field.attributes) {
                    self.emit_const(field, scope)?;
                }
            }
            Statement::Field(FieldDecl { name, .. }) | Statement::Property(PropertyDecl { name, .. }) => {
                return Err(GenerateError::MisplacedMember {
                    target: TARGET.to_string(),
                    kind: stmt.kind_name().to_string(),
                    name: name.clone(),
                });
            }
            Statement::Import(import) => {
                let path = import.path.join("::");
                match &import.alias {
                    Some(alias) => self.out.line(&format!("use {} as {};", path, alias)),
                    None => self.out.line(&format!("use {};", path)),
                }
            }
            Statement::TypeAlias(alias) => {
                let target = self.map_type(&alias.target, scope);
                let generics = generic_args(&alias.generics);
                self.out.line(&format!("pub type {}{} = {};", alias.name, generics, target));
            }
            Statement::Include(include) => {
                for item in &include.program.statements {
                    self.emit_item(item, scope, host)?;
                }
            }
            Statement::Raw(raw) => self.emit_raw(raw),
            other => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("{} is not allowed at item level; skipped", other.kind_name()))
                        .with_context(TARGET),
                );
            }
        }
        Ok(())
    }

    /// `pub mod a { pub mod b { .. } }` for `a.b`.
    fn emit_namespace(&mut self, ns: &NamespaceDecl) -> GenResult<()> {
        self.out.separator();
        let parts: Vec<&str> = ns.name.split('.').collect();
        for part in &parts {
            self.out.open_block(&format!("pub mod {}", escape_ident(part)));
            self.out.line("use super::*;");
        }
        for member in &ns.members {
            self.out.separator();
            self.emit_item(member, Scope::top_level(), ItemHost::Namespace)?;
        }
        for _ in &parts {
            self.out.close_block();
        }
        Ok(())
    }

    fn emit_module(&mut self, module: &ModuleDecl) -> GenResult<()> {
        if self.skip_marked("module", &module.name, &module.attributes) {
            return Ok(());
        }
        self.out.separator();
        let scope = Scope::top_level().static_context(true);
        self.emit_attributes(&module.attributes, scope)?;
        self.out.open_block(&format!(
            "{}mod {}",
            visibility(&module.modifiers, true),
            escape_ident(&module.name)
        ));
        self.out.line("use super::*;");
        for member in &module.members {
            if matches!(member, Statement::Function(_) | Statement::Method(_)) {
                self.out.separator();
            }
            self.emit_item(member, scope, ItemHost::Module)?;
        }
        self.out.close_block();
        Ok(())
    }

    /// `pub const NAME: T = init;`
    fn emit_const(&mut self, field: &FieldDecl, scope: Scope<'_>) -> GenResult<()> {
        let Some(init) = &field.initializer else {
            self.diagnostics.report(
                Diagnostic::warning(format!("static field `{}` has no initializer; skipped", field.name))
                    .with_context(TARGET),
            );
            return Ok(());
        };
        let mut ty = match &field.ty {
            Some(ty) => self.map_type(ty, scope),
            None => self.inferred_type(&field.name, Some(init)),
        };
        // a `String` cannot be built in a const
        if ty == "String" && init.is_string_literal() {
            ty = "&str".to_string();
        }
        let value = self.expr(init, scope)?;
        self.out.line(&format!(
            "{}const {}: {} = {};",
            visibility(&field.modifiers, true),
            escape_ident(&field.name),
            ty,
            value
        ));
        Ok(())
    }

    /// `struct` + inherent `impl` (with `new`) + one `impl Trait for Type` per interface declared in the unit.
    fn emit_struct(&mut self, decl: &TypeDecl) -> GenResult<()> {
        if self.skip_marked("class", &decl.name, &decl.attributes) {
            return Ok(());
        }
        let scope = Scope::in_type(&decl.name, &decl.generics);

        let mut fields: Vec<FieldSpec<'_>> = Vec::new();
        let mut consts: Vec<&FieldDecl> = Vec::new();
        let mut constructor: Option<&FunctionDecl> = None;
        let mut methods: Vec<&FunctionDecl> = Vec::new();
        let mut accessors: Vec<&PropertyDecl> = Vec::new();
        let mut auto_props: Vec<usize> = Vec::new();
        let mut raws: Vec<&RawBlock> = Vec::new();

        for member in &decl.members {
            if self.member_marked(member) {
                continue;
            }
            match member {
                Statement::Field(field) if is_static_field(field) => consts.push(field),
                Statement::Field(field) => {
                    let ty = match &field.ty {
                        Some(ty) => self.map_type(ty, scope),
                        None => self.inferred_type(&field.name, field.initializer.as_ref()),
                    };
                    fields.push(FieldSpec {
                        visibility: visibility(&field.modifiers, false),
                        name: &field.name,
                        ty,
                        init: field.initializer.as_ref(),
                    });
                }
                Statement::Property(prop) if prop.is_auto() => {
                    let ty = match &prop.ty {
                        Some(ty) => self.map_type(ty, scope),
                        None => self.inferred_type(&prop.name, prop.initializer.as_ref()),
                    };
                    auto_props.push(fields.len());
                    fields.push(FieldSpec {
                        visibility: visibility(&prop.modifiers, false),
                        name: &prop.name,
                        ty,
                        init: prop.initializer.as_ref(),
                    });
                }
                Statement::Property(prop) => accessors.push(prop),
                Statement::Function(func) | Statement::Method(func) if func.is_constructor => {
                    if constructor.is_none() {
                        constructor = Some(func);
                    } else {
                        self.diagnostics.report(
                            Diagnostic::warning(format!(
                                "`{}` has several constructors; only the first is emitted",
                                decl.name
                            ))
                            .with_context(TARGET),
                        );
                    }
                }
                Statement::Function(func) | Statement::Method(func) => methods.push(func),
                Statement::Raw(raw) => raws.push(raw),
                other => {
                    self.diagnostics.report(
                        Diagnostic::warning(format!("{} is not allowed in a struct body; skipped", other.kind_name()))
                            .with_context(decl.name.as_str()),
                    );
                }
            }
        }

        // struct
        self.out.separator();
        let traits = self.implemented_traits(decl);
        let has_derive = decl.attributes.iter().any(|attr| attr.name == "derive");
        self.emit_attributes(&decl.attributes, scope)?;
        if !has_derive && fields.iter().all(|field| !field.ty.contains("dyn")) {
            self.out.line("#[derive(Debug, Clone)]");
        }
        let generic_decl = self.generic_params(&decl.generics, scope);
        let generic_use = generic_args(&decl.generics);
        let head = format!(
            "{}struct {}{}",
            visibility(&decl.modifiers, true),
            escape_ident(&decl.name),
            generic_decl
        );
        if fields.is_empty() {
            self.out.line(&format!("{} {{}}", head));
        } else {
            self.out.open_block(&head);
            for field in &fields {
                self.out
                    .line(&format!("{}{}: {},", field.visibility, escape_ident(field.name), field.ty));
            }
            self.out.close_block();
        }

        // members that satisfy a trait declared in this unit go to its impl
        let mut impls: Vec<TraitImpl<'_>> = traits.iter().map(|_| TraitImpl::default()).collect();
        let mut inherent: Vec<&FunctionDecl> = Vec::new();
        for method in methods {
            match self.trait_owner(&traits, |shape| shape.receiver(&method.name).is_some()) {
                Some(index) => impls[index].methods.push(method),
                None => inherent.push(method),
            }
        }
        let mut inherent_accessors: Vec<&PropertyDecl> = Vec::new();
        for prop in accessors {
            match self.trait_owner(&traits, |shape| shape.has_property(&prop.name)) {
                Some(index) => impls[index].accessors.push(prop),
                None => inherent_accessors.push(prop),
            }
        }
        for index in auto_props {
            let name = fields[index].name;
            if let Some(owner) = self.trait_owner(&traits, |shape| shape.has_property(name)) {
                impls[owner].backed.push(index);
            }
        }

        // inherent impl
        self.out.blank_line();
        self.out.open_block(&format!("impl{} {}{}", generic_decl, escape_ident(&decl.name), generic_use));
        for field in consts {
            self.emit_const(field, scope)?;
        }
        self.emit_constructor(constructor, &fields, scope)?;
        for prop in inherent_accessors {
            self.emit_accessors(prop, scope, false)?;
        }
        for method in inherent {
            self.out.separator();
            self.emit_method(method, scope, visibility(&method.modifiers, true))?;
        }
        for raw in raws {
            self.emit_raw(raw);
        }
        self.out.close_block();

        // trait impls
        for (ty, members) in traits.iter().zip(impls) {
            let trait_name = self.map_type(ty, scope);
            self.out.blank_line();
            self.out.open_block(&format!(
                "impl{} {} for {}{}",
                generic_decl,
                trait_name,
                escape_ident(&decl.name),
                generic_use
            ));
            for index in members.backed {
                let setter = self.traits.get(&ty.name).is_some_and(|shape| shape.has_setter(fields[index].name));
                self.emit_backed_accessors(&fields[index], setter);
            }
            for prop in members.accessors {
                self.emit_accessors(prop, scope, true)?;
            }
            for method in members.methods {
                self.out.separator();
                let receiver = self
                    .traits
                    .get(&ty.name)
                    .and_then(|shape| shape.receiver(&method.name))
                    .unwrap_or_else(|| receiver_for(method));
                let options = FunctionOptions {
                    visibility: "",
                    receiver,
                    ..FunctionOptions::default()
                };
                self.emit_function(method, scope, options)?;
            }
            self.out.close_block();
        }
        Ok(())
    }

    /// Index of the implemented trait that `requires` a member, if any.
    fn trait_owner(&self, traits: &[&TypeRef], requires: impl Fn(&TraitShape) -> bool) -> Option<usize> {
        traits
            .iter()
            .position(|ty| self.traits.get(&ty.name).is_some_and(|shape| requires(shape)))
    }

    /// Trait accessors over the field an auto-property was lowered to.
    fn emit_backed_accessors(&mut self, field: &FieldSpec<'_>, setter: bool) {
        let name = escape_ident(field.name);
        self.out.separator();
        self.out.open_block(&format!("fn {}(&self) -> {}", name, field.ty));
        self.out.line(&format!("self.{}.clone()", name));
        self.out.close_block();
        if setter {
            self.out.blank_line();
            self.out
                .open_block(&format!("fn set_{}(&mut self, value: {})", field.name, field.ty));
            self.out.line(&format!("self.{} = value;", name));
            self.out.close_block();
        }
    }

    /// Interfaces (and an interface used as a base) that are declared in this unit.
    ///
    /// Anything else is recorded as a comment: Rust has no inheritance to lower it to.
    fn implemented_traits<'d>(&mut self, decl: &'d TypeDecl) -> Vec<&'d TypeRef> {
        let mut traits = Vec::new();
        if let Some(base) = &decl.base {
            if self.known.is_interface(&base.name) {
                traits.push(base);
            } else {
                self.out.comment(&format!("extends {}", base));
                self.diagnostics.report(
                    Diagnostic::info(format!("`{}` extends `{}`; Rust has no class inheritance", decl.name, base))
                        .with_context(TARGET),
                );
            }
        }
        for iface in &decl.interfaces {
            if self.known.is_interface(&iface.name) {
                traits.push(iface);
            } else {
                self.out.comment(&format!("implements {}", iface));
                self.diagnostics.report(
                    Diagnostic::info(format!("interface `{}` is not declared in this unit; no impl emitted", iface))
                        .with_context(decl.name.as_str()),
                );
            }
        }
        traits
    }

    /// `pub fn new(..) -> Self` building `instance` from field initializers, then running the constructor body.
    fn emit_constructor(
        &mut self,
        ctor: Option<&FunctionDecl>,
        fields: &[FieldSpec<'_>],
        scope: Scope<'_>,
    ) -> GenResult<()> {
        let params = match ctor {
            Some(ctor) => self.param_list(&ctor.params, scope)?.join(", "),
            None => String::new(),
        };
        let vis = ctor.map_or("pub ", |ctor| visibility(&ctor.modifiers, true));
        let ctor_scope = scope.constructor().static_context(true);

        self.out.open_block(&format!("{}fn new({}) -> Self", vis, params));
        let body = ctor.and_then(|ctor| ctor.body.as_deref()).filter(|body| !body.is_empty());
        self.out
            .open_block(if body.is_some() { "let mut instance = Self" } else { "Self" });
        for field in fields {
            let value = match field.init {
                Some(init) => self.owned(init, ctor_scope)?,
                None => "Default::default()".to_string(),
            };
            self.out.line(&format!("{}: {},", escape_ident(field.name), value));
        }
        match body {
            Some(body) => {
                self.out.close_block_with(";");
                self.emit_block(body, ctor_scope)?;
                self.out.line("instance");
            }
            None => self.out.close_block(),
        }
        self.out.close_block();
        Ok(())
    }

    /// `name()` and `set_name(value)` for a property with accessor bodies.
    ///
    /// Inside a trait impl the getter takes `&self` to match the trait signature.
    fn emit_accessors(&mut self, prop: &PropertyDecl, scope: Scope<'_>, in_trait: bool) -> GenResult<()> {
        let ty = match &prop.ty {
            Some(ty) => self.map_type(ty, scope),
            None => self.inferred_type(&prop.name, prop.initializer.as_ref()),
        };
        let vis = if in_trait { "" } else { visibility(&prop.modifiers, false) };
        let name = escape_ident(&prop.name);
        for accessor in &prop.accessors {
            let Some(body) = &accessor.body else {
                continue;
            };
            self.out.separator();
            let head = match accessor.kind {
                AccessorKind::Get => {
                    let receiver = if !in_trait && lowering::assigns_to_this(body) { "&mut self" } else { "&self" };
                    format!("{}fn {}({}) -> {}", vis, name, receiver, ty)
                }
                AccessorKind::Set | AccessorKind::Init => {
                    format!("{}fn set_{}(&mut self, value: {})", vis, prop.name, ty)
                }
            };
            self.out.open_block(&head);
            self.emit_block(body, scope)?;
            self.out.close_block();
        }
        Ok(())
    }

    fn emit_method(&mut self, func: &FunctionDecl, scope: Scope<'_>, vis: &str) -> GenResult<()> {
        let options = FunctionOptions {
            visibility: vis,
            receiver: receiver_for(func),
            ..FunctionOptions::default()
        };
        self.emit_function(func, scope, options)
    }

    fn emit_trait(&mut self, decl: &TypeDecl) -> GenResult<()> {
        if self.skip_marked("interface", &decl.name, &decl.attributes) {
            return Ok(());
        }
        self.out.separator();
        let scope = Scope::in_type(&decl.name, &decl.generics).interface();
        self.emit_attributes(&decl.attributes, scope)?;

        let mut supertraits = Vec::new();
        for ty in decl.base.iter().chain(&decl.interfaces) {
            supertraits.push(self.map_type(ty, scope));
        }
        let mut head = format!(
            "{}trait {}{}",
            visibility(&decl.modifiers, true),
            escape_ident(&decl.name),
            self.generic_params(&decl.generics, scope)
        );
        if !supertraits.is_empty() {
            head.push_str(&format!(": {}", supertraits.join(" + ")));
        }

        self.out.open_block(&head);
        for member in &decl.members {
            if self.member_marked(member) {
                continue;
            }
            match member {
                Statement::Function(func) | Statement::Method(func) => {
                    self.out.separator();
                    let receiver = self
                        .traits
                        .get(&decl.name)
                        .and_then(|shape| shape.receiver(&func.name))
                        .unwrap_or_else(|| receiver_for(func));
                    let options = FunctionOptions {
                        visibility: "",
                        receiver,
                        require_body: false,
                        ..FunctionOptions::default()
                    };
                    self.emit_function(func, scope, options)?;
                }
                Statement::Property(prop) => {
                    let ty = match &prop.ty {
                        Some(ty) => self.map_type(ty, scope),
                        None => self.inferred_type(&prop.name, None),
                    };
                    self.out.line(&format!("fn {}(&self) -> {};", escape_ident(&prop.name), ty));
                    if prop.accessors.iter().any(|a| a.kind != AccessorKind::Get) {
                        self.out.line(&format!("fn set_{}(&mut self, value: {});", prop.name, ty));
                    }
                }
                other => {
                    self.diagnostics.report(
                        Diagnostic::warning(format!("{} is not allowed in a trait; skipped", other.kind_name()))
                            .with_context(decl.name.as_str()),
                    );
                }
            }
        }
        self.out.close_block();
        Ok(())
    }

    fn emit_enum(&mut self, decl: &EnumDecl) -> GenResult<()> {
        if self.skip_marked("enum", &decl.name, &decl.attributes) {
            return Ok(());
        }
        self.out.separator();
        let scope = Scope::top_level();
        self.emit_attributes(&decl.attributes, scope)?;
        if !decl.attributes.iter().any(|attr| attr.name == "derive") {
            self.out.line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
        }
        self.out.open_block(&format!(
            "{}enum {}",
            visibility(&decl.modifiers, true),
            escape_ident(&decl.name)
        ));
        for variant in &decl.variants {
            match &variant.value {
                Some(value) => {
                    let value = self.expr(value, scope)?;
                    self.out.line(&format!("{} = {},", escape_ident(&variant.name), value));
                }
                None => self.out.line(&format!("{},", escape_ident(&variant.name))),
            }
        }
        self.out.close_block();
        Ok(())
    }

    /// Function, method or associated function.
    pub(super) fn emit_function(
        &mut self,
        func: &FunctionDecl,
        scope: Scope<'_>,
        options: FunctionOptions<'_>,
    ) -> GenResult<()> {
        if self.skip_marked("function", &func.name, &func.attributes) {
            return Ok(());
        }
        if func.is_qualified() {
            self.diagnostics.report(
                Diagnostic::warning(format!("qualified function name `{}` is not allowed here; skipped", func.name))
                    .with_hint(format!(
                        "mark it `{}` if it maps onto a host API",
                        markers::as_str(markers::MarkerId::ForeignCall)
                    )),
            );
            return Ok(());
        }

        let fn_scope = scope
            .with_fn_generics(&func.generics)
            .static_context(options.receiver == Receiver::None);
        self.emit_attributes(&func.attributes, fn_scope)?;

        let mut params: Vec<String> = match options.receiver {
            Receiver::None => Vec::new(),
            Receiver::Shared => vec!["&self".to_string()],
            Receiver::Exclusive => vec!["&mut self".to_string()],
        };
        params.extend(self.param_list(&func.params, fn_scope)?);
        let ret = match options.return_override {
            Some(ret) => ret,
            None => self.return_type(func, fn_scope),
        };
        let ret = if ret == UNIT { String::new() } else { format!(" -> {}", ret) };
        let name = options.name_override.unwrap_or(func.name.as_str());
        let head = format!(
            "{}fn {}{}({}){}",
            options.visibility,
            escape_ident(name),
            self.generic_params(&func.generics, fn_scope),
            params.join(", "),
            ret
        );

        match &func.body {
            None if !options.require_body => self.out.line(&format!("{};", head)),
            None => {
                self.out.open_block(&head);
                self.out.line("unimplemented!()");
                self.out.close_block();
            }
            Some(body) => {
                self.out.open_block(&head);
                for stmt in options.prologue {
                    self.emit_statement(stmt, fn_scope)?;
                }
                self.emit_block(body, fn_scope)?;
                self.out.close_block();
            }
        }
        Ok(())
    }

    /// Declared return type; an undeclared type on a value-returning body falls back to the catch-all.
    fn return_type(&mut self, func: &FunctionDecl, scope: Scope<'_>) -> String {
        match &func.return_type {
            Some(ty) => self.map_type(ty, scope),
            None if func.body.as_deref().is_some_and(lowering::returns_value) => {
                self.diagnostics.report(
                    Diagnostic::warning(format!(
                        "`{}` returns a value but declares no return type; using `{}`",
                        func.name, CATCH_ALL
                    ))
                    .with_context(scope.class_name.unwrap_or(TARGET)),
                );
                CATCH_ALL.to_string()
            }
            None => UNIT.to_string(),
        }
    }

    fn param_list(&mut self, params: &[Parameter], scope: Scope<'_>) -> GenResult<Vec<String>> {
        let mut rendered = Vec::with_capacity(params.len());
        for param in params {
            let ty = match &param.ty {
                Some(ty) => self.map_type(ty, scope),
                None => self.inferred_type(&param.name, param.default.as_ref()),
            };
            if param.default.is_some() {
                self.diagnostics.report(
                    Diagnostic::info(format!("default value of parameter `{}` dropped", param.name))
                        .with_note("Rust has no default arguments"),
                );
            }
            rendered.push(format!("{}: {}", escape_ident(&param.name), ty));
        }
        Ok(rendered)
    }

    /// Type of an unannotated field, parameter or constant, read off a literal initializer when there is one.
    fn inferred_type(&mut self, name: &str, init: Option<&Expr>) -> String {
        let inferred = match init {
            Some(Expr::Literal(Literal::Number(text))) if !text.starts_with("0x") && text.contains(['.', 'e', 'E']) => {
                Some("f64")
            }
            Some(Expr::Literal(Literal::Number(_))) => Some("i64"),
            Some(Expr::Literal(Literal::String(_))) => Some("String"),
            Some(Expr::Literal(Literal::Bool(_))) => Some("bool"),
            Some(Expr::Literal(Literal::Char(_))) => Some("char"),
            _ => None,
        };
        match inferred {
            Some(ty) => ty.to_string(),
            None => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("`{}` has no declared type; using `{}`", name, CATCH_ALL))
                        .with_context(TARGET),
                );
                CATCH_ALL.to_string()
            }
        }
    }

    /// `<T: Bound + Other, U>`
    fn generic_params(&mut self, generics: &[GenericParam], scope: Scope<'_>) -> String {
        if generics.is_empty() {
            return String::new();
        }
        let mut rendered = Vec::with_capacity(generics.len());
        for param in generics {
            if param.constraints.is_empty() {
                rendered.push(param.name.clone());
            } else {
                let bounds: Vec<String> = param.constraints.iter().map(|c| self.map_type(c, scope)).collect();
                rendered.push(format!("{}: {}", param.name, bounds.join(" + ")));
            }
        }
        format!("<{}>", rendered.join(", "))
    }

    /// `#[name(args)]` for attributes Rust knows; a `// @name(args)` comment for the rest.
    fn emit_attributes(&mut self, attributes: &[Attribute], scope: Scope<'_>) -> GenResult<()> {
        for attr in attributes.iter().filter(|a| a.marker().is_none()) {
            let args = if attr.args.is_empty() {
                String::new()
            } else {
                format!("({})", self.args(&attr.args, scope)?)
            };
            if RUST_ATTRIBUTES.contains(&attr.name.as_str()) {
                self.out.line(&format!("#[{}{}]", attr.name, args));
            } else {
                self.out.comment(&format!("@{}{}", attr.name, args));
                self.diagnostics.report(
                    Diagnostic::info(format!("attribute `{}` has no Rust equivalent; kept as a comment", attr.name))
                        .with_context(TARGET),
                );
            }
        }
        Ok(())
    }

    fn member_marked(&mut self, member: &Statement) -> bool {
        match member {
            Statement::Field(f) => self.skip_marked("field", &f.name, &f.attributes),
            Statement::Property(p) => self.skip_marked("property", &p.name, &p.attributes),
            // a marked constructor leaves the synthesized `new`
            Statement::Function(f) | Statement::Method(f) if f.is_constructor => {
                self.skip_marked("constructor", &f.name, &f.attributes)
            }
            _ => false,
        }
    }

    /// Report and skip a declaration carrying a marker attribute.
    fn skip_marked(&mut self, kind: &str, name: &str, attributes: &[Attribute]) -> bool {
        let Some(marker) = marker_of(attributes) else {
            return false;
        };
        let marker = markers::as_str(marker);
        tracing::info!(kind, name, marker, "skipping marked declaration");
        self.diagnostics.report(
            Diagnostic::info(format!("{} `{}` is marked `{}`; nothing emitted", kind, name, marker))
                .with_context(TARGET),
        );
        true
    }
}

/// `pub ` for public (or default-public) items, `pub(crate) ` for protected/internal, nothing for private.
pub(super) fn visibility(modifiers: &[Modifier], default_public: bool) -> &'static str {
    match modifiers.iter().find(|m| m.is_access()) {
        Some(Modifier::Public) => "pub ",
        Some(Modifier::Protected | Modifier::Internal) => "pub(crate) ",
        Some(_) => "",
        None if default_public => "pub ",
        None => "",
    }
}

pub(super) fn receiver_for(func: &FunctionDecl) -> Receiver {
    if func.is_static || func.has_modifier(Modifier::Static) {
        Receiver::None
    } else if func.body.as_deref().is_some_and(lowering::assigns_to_this) {
        Receiver::Exclusive
    } else {
        Receiver::Shared
    }
}

fn is_static_field(field: &FieldDecl) -> bool {
    field.modifiers.iter().any(|m| matches!(m, Modifier::Static | Modifier::Const))
}

/// `<T, U>`
fn generic_args(generics: &[GenericParam]) -> String {
    if generics.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = generics.iter().map(|g| g.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        assert_eq!(visibility(&[], true), "pub ");
        assert_eq!(visibility(&[], false), "");
        assert_eq!(visibility(&[Modifier::Protected], true), "pub(crate) ");
        assert_eq!(visibility(&[Modifier::Static, Modifier::Private], true), "");
    }

    #[test]
    fn test_receiver_follows_this_assignments() {
        let mut method = FunctionDecl::new(
            "bump",
            vec![Statement::expr(Expr::Unary {
                op: polyemit_syntax::TokenKind::PlusPlus,
                operand: Box::new(Expr::member(Expr::This, "count")),
                postfix: true,
            })],
        );
        assert_eq!(receiver_for(&method), Receiver::Exclusive);
        method.body = Some(vec![Statement::ret(Expr::member(Expr::This, "count"))]);
        assert_eq!(receiver_for(&method), Receiver::Shared);
        method.is_static = true;
        assert_eq!(receiver_for(&method), Receiver::None);
    }
}
