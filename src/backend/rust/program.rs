//! Rust unit layout: lint header, `use` lines, type aliases, items and `fn main`.

use polyemit_syntax::ast::*;
use rustc_hash::FxHashMap;

use super::declarations::{receiver_for, FunctionOptions, ItemHost, Receiver, TraitShape};
use super::types::UNIT;
use super::{RustGenerator, TARGET};
use crate::backend::composer::{self, Partition};
use crate::backend::emitter::{BraceStyle, SourceEmitter};
use crate::backend::lowering;
use crate::backend::types::KnownTypes;
use crate::backend::{GenResult, GenerateError, GeneratedUnit, Scope};
use crate::diagnostics::Diagnostic;

/// Rust's entry-point spelling.
const ENTRY: &str = "main";
/// Name a value-returning entry function is emitted under; `fn main` then exits with its result.
const VALUE_ENTRY: &str = "main_entry";
/// Return type of a value-returning entry that declares none.
const DEFAULT_EXIT_TYPE: &str = "i64";

const LINT_ALLOWS: &str = "#![allow(unused_imports, unused_variables, unused_mut, dead_code, non_snake_case, \
                           unreachable_code, unused_parens, non_camel_case_types)]";

impl RustGenerator<'_> {
    /// Lay out the whole unit and build the header last.
    pub(super) fn compose(mut self, program: &Program) -> GenResult<GeneratedUnit> {
        let statements = composer::flatten_includes(&program.statements);
        if let Some((outer, inner)) = composer::find_nested_type(&statements) {
            return Err(GenerateError::NestedType { outer, inner });
        }
        self.known = KnownTypes::collect(&statements);
        self.traits = collect_traits(&statements);
        let partition = Partition::of(&statements);
        tracing::debug!(
            containers = partition.containers.len(),
            functions = partition.functions.len(),
            loose = partition.loose.len(),
            traits = self.traits.len(),
            "partitioned unit"
        );

        if let Some(Statement::Field(FieldDecl { name, .. }) | Statement::Property(PropertyDecl { name, .. })) =
            partition.members.first()
        {
            return Err(GenerateError::MisplacedMember {
                target: TARGET.to_string(),
                kind: partition.members[0].kind_name().to_string(),
                name: name.clone(),
            });
        }

        for raw in &partition.raw {
            self.out.separator();
            self.emit_raw(raw);
        }
        for container in &partition.containers {
            self.emit_item(container, Scope::top_level(), ItemHost::Namespace)?;
        }

        let entry = partition.entry_function(&self.config.entry_name);
        for func in &partition.functions {
            if entry.is_some_and(|entry| std::ptr::eq(entry, *func)) {
                continue;
            }
            self.out.separator();
            let options = FunctionOptions {
                visibility: super::declarations::visibility(&func.modifiers, true),
                ..FunctionOptions::default()
            };
            self.emit_function(func, Scope::top_level(), options)?;
        }

        let has_entry = match entry {
            Some(func) => self.emit_entry_function(func, &partition.loose)?,
            None if !partition.loose.is_empty() => {
                self.emit_synthesized_main(&partition.loose)?;
                true
            }
            None => false,
        };
        if !has_entry && self.config.output_kind.is_executable() {
            return Err(GenerateError::MissingEntryPoint {
                target: TARGET.to_string(),
                entry: self.config.entry_name.clone(),
            });
        }

        let body = std::mem::replace(&mut self.out, SourceEmitter::new(0, BraceStyle::SameLine)).finish();
        let header = self.header(&partition);
        let source = if header.is_empty() { body } else { format!("{}\n{}", header, body) };
        let source = if self.config.format_output { self.formatted(source) } else { source };
        Ok(GeneratedUnit {
            source,
            imports: self.imports,
            entry_point: has_entry.then(|| ENTRY.to_string()),
        })
    }

    /// The user's entry function as `fn main`, with loose statements prepended to its body.
    ///
    /// A value-returning entry keeps its body under [`VALUE_ENTRY`] and `fn main` exits with the result.
    fn emit_entry_function(&mut self, func: &FunctionDecl, loose: &[&Statement]) -> GenResult<bool> {
        if func.marker().is_some() {
            // skipped by emit_function; still report it
            self.emit_function(func, Scope::top_level(), FunctionOptions::default())?;
            return Ok(false);
        }
        if !loose.is_empty() {
            self.diagnostics.report(
                Diagnostic::info(format!("{} top-level statement(s) moved into `{}`", loose.len(), func.name))
                    .with_context(TARGET),
            );
        }

        // mapped once here; emit_function gets the spelling through `return_override`
        let declared = func.return_type.as_ref().map(|ty| self.map_type(ty, Scope::top_level()));
        let returns_value = match &declared {
            Some(ty) => ty != UNIT,
            None => func.body.as_deref().is_some_and(lowering::returns_value) || loose_returns_value(loose),
        };
        self.out.separator();
        if !returns_value {
            let options = FunctionOptions {
                name_override: Some(ENTRY),
                return_override: Some(UNIT.to_string()),
                visibility: "",
                prologue: loose,
                ..FunctionOptions::default()
            };
            self.emit_function(func, Scope::top_level(), options)?;
            return Ok(true);
        }

        let options = FunctionOptions {
            name_override: Some(VALUE_ENTRY),
            return_override: Some(declared.unwrap_or_else(|| DEFAULT_EXIT_TYPE.to_string())),
            visibility: "",
            prologue: loose,
            ..FunctionOptions::default()
        };
        self.emit_function(func, Scope::top_level(), options)?;
        self.emit_exit_main();
        Ok(true)
    }

    /// `fn main` built from loose statements alone.
    fn emit_synthesized_main(&mut self, loose: &[&Statement]) -> GenResult<()> {
        let returns_value = loose_returns_value(loose);
        let name = if returns_value { VALUE_ENTRY } else { ENTRY };
        self.out.separator();
        if returns_value {
            self.out
                .open_block(&format!("fn {}() -> {}", name, DEFAULT_EXIT_TYPE));
        } else {
            self.out.open_block(&format!("fn {}()", name));
        }
        for stmt in loose {
            self.emit_statement(stmt, Scope::top_level())?;
        }
        self.out.close_block();
        if returns_value {
            self.emit_exit_main();
        }
        Ok(())
    }

    fn emit_exit_main(&mut self) {
        self.out.blank_line();
        self.out.open_block(&format!("fn {}()", ENTRY));
        self.out
            .line(&format!("std::process::exit({}() as i32);", VALUE_ENTRY));
        self.out.close_block();
    }

    /// Lint allowances, sorted `use` lines, then `pub type` aliases.
    fn header(&mut self, partition: &Partition<'_>) -> String {
        for import in &partition.imports {
            let path = import.path.join("::");
            match &import.alias {
                Some(alias) => self.imports.insert(format!("{} as {}", path, alias)),
                None => self.imports.insert(path),
            };
        }
        let mut aliases = Vec::new();
        for alias in &partition.aliases {
            let target = self.map_type(&alias.target, Scope::top_level());
            let generics: Vec<&str> = alias.generics.iter().map(|g| g.name.as_str()).collect();
            let generics = if generics.is_empty() { String::new() } else { format!("<{}>", generics.join(", ")) };
            aliases.push(format!("pub type {}{} = {};", alias.name, generics, target));
        }

        let mut header = String::new();
        if self.config.allow_lints {
            header.push_str(LINT_ALLOWS);
            header.push_str("\n\n");
        }
        for path in &self.imports {
            header.push_str(&format!("use {};\n", path));
        }
        if !aliases.is_empty() {
            if !self.imports.is_empty() {
                header.push('\n');
            }
            for line in aliases {
                header.push_str(&line);
                header.push('\n');
            }
        }
        if header.ends_with("\n\n") {
            header.pop();
        }
        header
    }

    /// Re-print the unit through `prettyplease`; unparsable text is returned unchanged.
    fn formatted(&mut self, source: String) -> String {
        match syn::parse_file(&source) {
            Ok(file) => prettyplease::unparse(&file),
            Err(err) => {
                tracing::warn!(error = %err, "generated Rust did not parse; leaving it unformatted");
                self.diagnostics.report(
                    Diagnostic::warning(format!("formatting skipped: {}", err))
                        .with_context(TARGET)
                        .with_note("the generated text is returned as-is"),
                );
                source
            }
        }
    }
}

fn loose_returns_value(loose: &[&Statement]) -> bool {
    loose.iter().any(|stmt| lowering::returns_value(std::slice::from_ref(*stmt)))
}

/// What every interface in the unit requires of its implementers, by interface name.
///
/// A trait method takes `&mut self` as soon as the interface or any implementer's body assigns through `this`, so
/// the trait signature and every `impl` agree.
fn collect_traits(statements: &[Statement]) -> FxHashMap<String, TraitShape> {
    let mut traits: FxHashMap<String, TraitShape> = FxHashMap::default();
    for_each_type(statements, &mut |stmt| {
        let Statement::Interface(decl) = stmt else {
            return;
        };
        let mut shape = TraitShape::default();
        for member in &decl.members {
            match member {
                Statement::Function(func) | Statement::Method(func) => {
                    shape.methods.push((func.name.clone(), receiver_for(func)));
                }
                Statement::Property(prop) => {
                    let setter = prop.accessors.iter().any(|a| a.kind != AccessorKind::Get);
                    shape.properties.push((prop.name.clone(), setter));
                }
                _ => {}
            }
        }
        traits.insert(decl.name.clone(), shape);
    });

    for_each_type(statements, &mut |stmt| {
        let (Statement::Class(decl) | Statement::Struct(decl)) = stmt else {
            return;
        };
        for iface in decl.base.iter().chain(&decl.interfaces) {
            let Some(shape) = traits.get_mut(&iface.name) else {
                continue;
            };
            for member in &decl.members {
                if let Statement::Function(func) | Statement::Method(func) = member {
                    if receiver_for(func) == Receiver::Exclusive {
                        shape.require_exclusive(&func.name);
                    }
                }
            }
        }
    });
    traits
}

/// Every class, struct and interface, including those inside namespaces and modules.
fn for_each_type<'s, F: FnMut(&'s Statement)>(statements: &'s [Statement], f: &mut F) {
    for stmt in statements {
        match stmt {
            Statement::Namespace(NamespaceDecl { members, .. }) | Statement::Module(ModuleDecl { members, .. }) => {
                for_each_type(members, f);
            }
            Statement::Class(_) | Statement::Struct(_) | Statement::Interface(_) => f(stmt),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_traits_walks_namespaces() {
        let shape = TypeDecl::new(
            "Shape",
            vec![
                Statement::Method(FunctionDecl {
                    name: "area".to_string(),
                    ..FunctionDecl::default()
                }),
                Statement::Property(PropertyDecl {
                    name: "label".to_string(),
                    ..PropertyDecl::default()
                }),
            ],
        );
        let ns = Statement::Namespace(NamespaceDecl {
            name: "Geo".to_string(),
            members: vec![Statement::Interface(shape)],
        });
        let traits = collect_traits(&[ns]);
        let shape = traits.get("Shape").unwrap();
        assert_eq!(shape.receiver("area"), Some(Receiver::Shared));
        assert!(shape.has_property("label"));
        assert!(!shape.has_setter("label"));
    }

    #[test]
    fn test_mutating_implementer_makes_trait_method_exclusive() {
        let bumper = TypeDecl::new(
            "Bumper",
            vec![
                Statement::Method(FunctionDecl {
                    name: "bump".to_string(),
                    ..FunctionDecl::default()
                }),
                Statement::Method(FunctionDecl {
                    name: "peek".to_string(),
                    ..FunctionDecl::default()
                }),
            ],
        );
        let bump = FunctionDecl::new(
            "bump",
            vec![Statement::expr(Expr::Assignment {
                target: Box::new(Expr::member(Expr::This, "count")),
                op: polyemit_syntax::TokenKind::PlusEqual,
                value: Box::new(Expr::number("1")),
            })],
        );
        let peek = FunctionDecl::new("peek", vec![Statement::ret(Expr::member(Expr::This, "count"))]);
        let counter = TypeDecl {
            interfaces: vec![TypeRef::named("Bumper")],
            ..TypeDecl::new("Counter", vec![Statement::Method(bump), Statement::Method(peek)])
        };
        let traits = collect_traits(&[Statement::Interface(bumper), Statement::Class(counter)]);
        let shape = traits.get("Bumper").unwrap();
        assert_eq!(shape.receiver("bump"), Some(Receiver::Exclusive));
        assert_eq!(shape.receiver("peek"), Some(Receiver::Shared));
    }

    #[test]
    fn test_loose_returns_value() {
        let ret = Statement::ret(Expr::number("1"));
        let print = Statement::expr(Expr::call(Expr::ident("print"), vec![]));
        assert!(loose_returns_value(&[&print, &ret]));
        assert!(!loose_returns_value(&[&print]));
    }
}
