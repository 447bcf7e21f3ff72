//! Declaration emission for C#: namespaces, types, modules, members, modifiers and attributes.

use polyemit_core::lang::markers;
use polyemit_syntax::ast::*;

use super::expressions::escape_ident;
use super::types::UNTYPED;
use super::{CSharpGenerator, TARGET};
use crate::backend::lowering;
use crate::backend::{GenResult, GenerateError, Scope};
use crate::diagnostics::Diagnostic;

/// What a member list belongs to; decides which members are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MemberHost {
    Namespace,
    /// Class, struct or interface.
    Type,
    /// `static class` built from a module or the implicit container.
    Module,
}

/// Per-call overrides for [`CSharpGenerator::emit_function`].
#[derive(Debug, Default)]
pub(super) struct FunctionOptions<'o> {
    pub name_override: Option<&'o str>,
    pub return_override: Option<String>,
    pub force_static: bool,
    /// Local function inside a body: no modifiers.
    pub local: bool,
    /// Statements emitted ahead of the declared body.
    pub prologue: &'o [&'o Statement],
}

impl CSharpGenerator<'_> {
    pub(super) fn emit_member(&mut self, stmt: &Statement, scope: Scope<'_>, host: MemberHost) -> GenResult<()> {
        match stmt {
            Statement::Namespace(ns) if host == MemberHost::Namespace => self.emit_namespace(ns)?,
            Statement::Class(decl) if host != MemberHost::Type => self.emit_type("class", decl, scope)?,
            Statement::Struct(decl) if host != MemberHost::Type => self.emit_type("struct", decl, scope)?,
            Statement::Interface(decl) if host != MemberHost::Type => self.emit_type("interface", decl, scope)?,
            Statement::Enum(decl) if host != MemberHost::Type => self.emit_enum(decl, scope)?,
            Statement::Module(module) if host != MemberHost::Type => self.emit_module(module, scope)?,
            Statement::Namespace(_)
            | Statement::Class(_)
            | Statement::Struct(_)
            | Statement::Interface(_)
            | Statement::Enum(_)
            | Statement::Module(_) => {
                return Err(GenerateError::NestedType {
                    outer: scope.class_name.unwrap_or_default().to_string(),
                    inner: declared_name(stmt).to_string(),
                });
            }
            Statement::Function(func) | Statement::Method(func) if host != MemberHost::Namespace => {
                self.out.separator();
                self.emit_function(func, scope, FunctionOptions::default())?;
            }
            Statement::Field(field) if host != MemberHost::Namespace => self.emit_field(field, scope)?,
            Statement::Property(prop) if host != MemberHost::Namespace => self.emit_property(prop, scope)?,
            Statement::Function(FunctionDecl { name, .. })
            | Statement::Method(FunctionDecl { name, .. })
            | Statement::Field(FieldDecl { name, .. })
            | Statement::Property(PropertyDecl { name, .. }) => {
                return Err(GenerateError::MisplacedMember {
                    target: TARGET.to_string(),
                    kind: stmt.kind_name().to_string(),
                    name: name.clone(),
                });
            }
            Statement::Import(import) if host == MemberHost::Namespace => {
                let path = import.path.join(".");
                match &import.alias {
                    Some(alias) => self.out.line(&format!("using {} = {};", alias, path)),
                    None => self.out.line(&format!("using {};", path)),
                }
            }
            Statement::Include(include) => {
                for member in &include.program.statements {
                    self.emit_member(member, scope, host)?;
                }
            }
            Statement::Raw(raw) => self.emit_raw(raw),
            other => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("{} is not allowed here; skipped", other.kind_name()))
                        .with_context(scope.class_name.unwrap_or(TARGET)),
                );
            }
        }
        Ok(())
    }

    fn emit_namespace(&mut self, ns: &NamespaceDecl) -> GenResult<()> {
        self.out.open_block(&format!("namespace {}", ns.name));
        for member in &ns.members {
            self.out.separator();
            self.emit_member(member, Scope::top_level(), MemberHost::Namespace)?;
        }
        self.out.close_block();
        Ok(())
    }

    /// Class, struct or interface.
    fn emit_type(&mut self, keyword: &str, decl: &TypeDecl, scope: Scope<'_>) -> GenResult<()> {
        if self.skip_marked(keyword, &decl.name, &decl.attributes) {
            return Ok(());
        }
        self.out.separator();
        self.emit_attributes(&decl.attributes, scope)?;

        let is_static = decl.modifiers.contains(&Modifier::Static);
        let mut type_scope = Scope::in_type(&decl.name, &decl.generics).static_context(is_static);
        if keyword == "interface" {
            type_scope = type_scope.interface();
        }

        let mut head = format!(
            "{}{} {}{}",
            modifier_prefix(&decl.modifiers, Some(Modifier::Public), false, scope),
            keyword,
            escape_ident(&decl.name),
            generic_list(&decl.generics)
        );
        let mut bases = Vec::new();
        for base in decl.base.iter().chain(&decl.interfaces) {
            bases.push(self.map_type(base, type_scope));
        }
        if !bases.is_empty() {
            head.push_str(&format!(" : {}", bases.join(", ")));
        }
        head.push_str(&self.where_clauses(&decl.generics, type_scope));

        self.out.open_block(&head);
        for member in &decl.members {
            self.emit_member(member, type_scope, MemberHost::Type)?;
        }
        self.out.close_block();
        Ok(())
    }

    fn emit_enum(&mut self, decl: &EnumDecl, scope: Scope<'_>) -> GenResult<()> {
        if self.skip_marked("enum", &decl.name, &decl.attributes) {
            return Ok(());
        }
        self.out.separator();
        self.emit_attributes(&decl.attributes, scope)?;
        let head = format!(
            "{}enum {}",
            modifier_prefix(&decl.modifiers, Some(Modifier::Public), false, scope),
            escape_ident(&decl.name)
        );
        self.out.open_block(&head);
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

    fn emit_module(&mut self, module: &ModuleDecl, scope: Scope<'_>) -> GenResult<()> {
        if self.skip_marked("module", &module.name, &module.attributes) {
            return Ok(());
        }
        self.out.separator();
        self.emit_attributes(&module.attributes, scope)?;
        let head = format!(
            "{}class {}",
            modifier_prefix(&module.modifiers, Some(Modifier::Public), true, scope),
            escape_ident(&module.name)
        );
        let module_scope = Scope::in_type(&module.name, &[]).static_context(true);
        self.out.open_block(&head);
        for member in &module.members {
            self.emit_member(member, module_scope, MemberHost::Module)?;
        }
        self.out.close_block();
        Ok(())
    }

    /// Function, method or constructor.
    pub(super) fn emit_function(
        &mut self,
        func: &FunctionDecl,
        scope: Scope<'_>,
        options: FunctionOptions<'_>,
    ) -> GenResult<()> {
        let kind = if func.is_constructor { "constructor" } else { "function" };
        if self.skip_marked(kind, &func.name, &func.attributes) {
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

        let make_static = !func.is_constructor
            && !scope.in_interface
            && (func.is_static || scope.in_static || options.force_static);
        let fn_scope = scope.with_fn_generics(&func.generics).static_context(make_static);
        self.emit_attributes(&func.attributes, fn_scope)?;

        let params = self.params(&func.params, fn_scope)?;
        let modifiers = if options.local {
            String::new()
        } else {
            modifier_prefix(&func.modifiers, Some(Modifier::Public), make_static, scope)
        };
        let head = if func.is_constructor {
            let name = scope.class_name.unwrap_or(func.name.as_str());
            format!("{}{}({})", modifiers, escape_ident(name), params)
        } else {
            let name = options.name_override.unwrap_or(func.name.as_str());
            let ret = match options.return_override {
                Some(ret) => ret,
                None => self.return_type(func, fn_scope),
            };
            format!(
                "{}{} {}{}({}){}",
                modifiers,
                ret,
                escape_ident(name),
                generic_list(&func.generics),
                params,
                self.where_clauses(&func.generics, fn_scope)
            )
        };

        match &func.body {
            None => self.out.line(&format!("{};", head)),
            Some(body) => {
                let body_scope = if func.is_constructor { fn_scope.constructor() } else { fn_scope };
                self.out.open_block(&head);
                for stmt in options.prologue {
                    self.emit_statement(stmt, body_scope)?;
                }
                self.emit_block(body, body_scope)?;
                self.out.close_block();
            }
        }
        Ok(())
    }

    /// Declared return type, else `dynamic` when the body returns a value, else `void`.
    fn return_type(&mut self, func: &FunctionDecl, scope: Scope<'_>) -> String {
        match &func.return_type {
            Some(ty) => self.map_type(ty, scope),
            None if func.body.as_deref().is_some_and(lowering::returns_value) => UNTYPED.to_string(),
            None => "void".to_string(),
        }
    }

    fn params(&mut self, params: &[Parameter], scope: Scope<'_>) -> GenResult<String> {
        let mut rendered = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.map_type_or(param.ty.as_ref(), UNTYPED, scope);
            let mut text = format!("{} {}", ty, escape_ident(&param.name));
            if let Some(default) = &param.default {
                text.push_str(&format!(" = {}", self.expr(default, scope)?));
            }
            rendered.push(text);
        }
        Ok(rendered.join(", "))
    }

    fn where_clauses(&mut self, generics: &[GenericParam], scope: Scope<'_>) -> String {
        let mut clauses = String::new();
        for param in generics.iter().filter(|p| !p.constraints.is_empty()) {
            let constraints: Vec<String> = param.constraints.iter().map(|c| self.map_type(c, scope)).collect();
            clauses.push_str(&format!(" where {} : {}", param.name, constraints.join(", ")));
        }
        clauses
    }

    fn emit_field(&mut self, field: &FieldDecl, scope: Scope<'_>) -> GenResult<()> {
        if self.skip_marked("field", &field.name, &field.attributes) {
            return Ok(());
        }
        self.emit_attributes(&field.attributes, scope)?;
        let is_const = field.modifiers.contains(&Modifier::Const);
        let modifiers = modifier_prefix(&field.modifiers, Some(Modifier::Private), scope.in_static && !is_const, scope);
        let ty = self.map_type_or(field.ty.as_ref(), UNTYPED, scope);
        let mut text = format!("{}{} {}", modifiers, ty, escape_ident(&field.name));
        if let Some(init) = &field.initializer {
            text.push_str(&format!(" = {}", self.expr(init, scope)?));
        }
        text.push(';');
        self.out.line(&text);
        Ok(())
    }

    fn emit_property(&mut self, prop: &PropertyDecl, scope: Scope<'_>) -> GenResult<()> {
        if self.skip_marked("property", &prop.name, &prop.attributes) {
            return Ok(());
        }
        self.emit_attributes(&prop.attributes, scope)?;
        let modifiers = modifier_prefix(&prop.modifiers, Some(Modifier::Private), scope.in_static, scope);
        let ty = self.map_type_or(prop.ty.as_ref(), UNTYPED, scope);
        let head = format!("{}{} {}", modifiers, ty, escape_ident(&prop.name));

        if prop.is_auto() {
            let accessors = if prop.accessors.is_empty() {
                "get; set;".to_string()
            } else {
                prop.accessors
                    .iter()
                    .map(|a| format!("{}{};", accessor_modifiers(a), accessor_keyword(a.kind)))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            let mut text = format!("{} {{ {} }}", head, accessors);
            if let Some(init) = &prop.initializer {
                text.push_str(&format!(" = {};", self.expr(init, scope)?));
            }
            self.out.line(&text);
            return Ok(());
        }

        self.out.separator();
        self.out.open_block(&head);
        for accessor in &prop.accessors {
            let keyword = format!("{}{}", accessor_modifiers(accessor), accessor_keyword(accessor.kind));
            match &accessor.body {
                Some(body) => {
                    self.out.open_block(&keyword);
                    self.emit_block(body, scope)?;
                    self.out.close_block();
                }
                None => self.out.line(&format!("{};", keyword)),
            }
        }
        self.out.close_block();
        Ok(())
    }

    /// `[Name(args)]` lines for every non-marker attribute.
    fn emit_attributes(&mut self, attributes: &[Attribute], scope: Scope<'_>) -> GenResult<()> {
        for attr in attributes.iter().filter(|a| a.marker().is_none()) {
            if attr.args.is_empty() {
                self.out.line(&format!("[{}]", attr.name));
            } else {
                let args = self.args(&attr.args, scope)?;
                self.out.line(&format!("[{}({})]", attr.name, args));
            }
        }
        Ok(())
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

/// `public static ` style prefix: access (explicit or `default`), then `static`, then the rest.
fn modifier_prefix(explicit: &[Modifier], default: Option<Modifier>, make_static: bool, scope: Scope<'_>) -> String {
    let mut words: Vec<&str> = explicit.iter().filter(|m| m.is_access()).map(|m| m.as_str()).collect();
    if words.is_empty() && !scope.in_interface {
        words.extend(default.map(Modifier::as_str));
    }
    if make_static || explicit.contains(&Modifier::Static) {
        words.push(Modifier::Static.as_str());
    }
    words.extend(
        explicit
            .iter()
            .filter(|m| !m.is_access() && **m != Modifier::Static)
            .map(|m| m.as_str()),
    );
    if words.is_empty() { String::new() } else { format!("{} ", words.join(" ")) }
}

pub(super) fn generic_list(generics: &[GenericParam]) -> String {
    if generics.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = generics.iter().map(|g| g.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

fn accessor_keyword(kind: AccessorKind) -> &'static str {
    match kind {
        AccessorKind::Get => "get",
        AccessorKind::Set => "set",
        AccessorKind::Init => "init",
    }
}

fn accessor_modifiers(accessor: &Accessor) -> String {
    accessor.modifiers.iter().map(|m| format!("{} ", m.as_str())).collect()
}

fn declared_name(stmt: &Statement) -> &str {
    match stmt {
        Statement::Namespace(ns) => &ns.name,
        Statement::Class(d) | Statement::Struct(d) | Statement::Interface(d) => &d.name,
        Statement::Enum(e) => &e.name,
        Statement::Module(m) => &m.name,
        other => other.kind_name(),
    }
}
