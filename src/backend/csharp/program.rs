//! C# unit layout: implicit container, `Main` entry point, optional shims and the `using` header.

use polyemit_syntax::ast::*;

use super::declarations::{FunctionOptions, MemberHost};
use super::types::NS_SYSTEM;
use super::{CSharpGenerator, TARGET};
use crate::backend::composer::{self, Partition};
use crate::backend::emitter::{BraceStyle, SourceEmitter};
use crate::backend::lowering;
use crate::backend::types::KnownTypes;
use crate::backend::{GenResult, GenerateError, GeneratedUnit, Scope};
use crate::diagnostics::Diagnostic;

/// C#'s entry-point spelling.
const ENTRY: &str = "Main";

/// Static helpers emitted into the implicit class when shims are enabled.
const SHIMS: &str = "\
static void print(params object[] values) => Console.WriteLine(string.Join(\" \", values));
static int len(System.Collections.IEnumerable items) { var n = 0; foreach (var _ in items) n++; return n; }
static int len(string text) => text.Length;
static string str(object value) => Convert.ToString(value);
static dynamic abs(dynamic value) => Math.Abs(value);
static dynamic min(dynamic a, dynamic b) => Math.Min(a, b);
static dynamic max(dynamic a, dynamic b) => Math.Max(a, b);
static double sqrt(double value) => Math.Sqrt(value);";

impl CSharpGenerator<'_> {
    /// Lay out the whole unit and build the header last.
    pub(super) fn compose(mut self, program: &Program) -> GenResult<GeneratedUnit> {
        let statements = composer::flatten_includes(&program.statements);
        if let Some((outer, inner)) = composer::find_nested_type(&statements) {
            return Err(GenerateError::NestedType { outer, inner });
        }
        self.known = KnownTypes::collect(&statements);
        let partition = Partition::of(&statements);
        tracing::debug!(
            containers = partition.containers.len(),
            functions = partition.functions.len(),
            loose = partition.loose.len(),
            known_types = self.known.len(),
            "partitioned unit"
        );

        for raw in &partition.raw {
            self.out.separator();
            self.emit_raw(raw);
        }
        for container in &partition.containers {
            self.out.separator();
            self.emit_member(container, Scope::top_level(), MemberHost::Namespace)?;
        }

        let mut entry_point = None;
        if partition.has_loose_code() {
            self.out.separator();
            entry_point = self.emit_implicit_container(&partition)?;
        }
        if entry_point.is_none() {
            entry_point = find_static_entry(&statements, "");
        }
        if entry_point.is_none() && self.config.output_kind.is_executable() {
            return Err(GenerateError::MissingEntryPoint {
                target: TARGET.to_string(),
                entry: self.config.entry_name.clone(),
            });
        }

        let body = std::mem::replace(&mut self.out, SourceEmitter::new(0, BraceStyle::NextLine)).finish();
        let header = self.header(&partition);
        let source = if header.is_empty() { body } else { format!("{}\n{}", header, body) };
        Ok(GeneratedUnit {
            source,
            imports: self.imports,
            entry_point,
        })
    }

    /// `namespace <ns> { public class <cls> { .. } }` around every loose function, member and statement.
    ///
    /// Returns the qualified entry point when one was emitted.
    fn emit_implicit_container(&mut self, partition: &Partition<'_>) -> GenResult<Option<String>> {
        let namespace = self.config.implicit_namespace.clone();
        let class = self.config.implicit_class.clone();
        let scope = Scope::in_type(&class, &[]).static_context(true);

        self.out.open_block(&format!("namespace {}", namespace));
        self.out.open_block(&format!("public class {}", class));

        if self.config.emit_shims {
            self.require_namespace(NS_SYSTEM);
            self.out.verbatim(SHIMS);
        }
        for member in &partition.members {
            self.emit_member(member, scope, MemberHost::Module)?;
        }

        let entry = partition.entry_function(&self.config.entry_name);
        let mut has_entry = false;
        for func in &partition.functions {
            self.out.separator();
            let is_entry = entry.is_some_and(|entry| std::ptr::eq(entry, *func));
            if !is_entry {
                let options = FunctionOptions {
                    force_static: true,
                    ..FunctionOptions::default()
                };
                self.emit_function(func, scope, options)?;
                continue;
            }

            if !partition.loose.is_empty() {
                self.diagnostics.report(
                    Diagnostic::info(format!(
                        "{} top-level statement(s) moved into `{}`",
                        partition.loose.len(),
                        func.name
                    ))
                    .with_context(TARGET),
                );
            }
            let returns_value = func.body.as_deref().is_some_and(lowering::returns_value)
                || loose_returns_value(&partition.loose);
            let options = FunctionOptions {
                name_override: Some(ENTRY),
                return_override: (func.return_type.is_none() && returns_value).then(|| "int".to_string()),
                force_static: true,
                local: false,
                prologue: &partition.loose,
            };
            self.emit_function(func, scope, options)?;
            has_entry = func.marker().is_none();
        }

        if entry.is_none() && !partition.loose.is_empty() {
            let ret = if loose_returns_value(&partition.loose) { "int" } else { "void" };
            self.out.separator();
            self.out.open_block(&format!("public static {} {}()", ret, ENTRY));
            for stmt in &partition.loose {
                self.emit_statement(stmt, scope)?;
            }
            self.out.close_block();
            has_entry = true;
        }

        self.out.close_block();
        self.out.close_block();
        Ok(has_entry.then(|| format!("{}.{}.{}", namespace, class, ENTRY)))
    }

    /// `using` directives for explicit imports and required namespaces, then alias directives.
    fn header(&mut self, partition: &Partition<'_>) -> String {
        let mut aliases = Vec::new();
        for import in &partition.imports {
            match &import.alias {
                Some(alias) => aliases.push(format!("using {} = {};", alias, import.path.join("."))),
                None => {
                    self.imports.insert(import.path.join("."));
                }
            }
        }
        for alias in &partition.aliases {
            if !alias.generics.is_empty() {
                self.diagnostics.report(
                    Diagnostic::warning(format!("generic type alias `{}` has no C# equivalent; skipped", alias.name))
                        .with_context(TARGET),
                );
                continue;
            }
            // Aliases map against the declared types only; other aliases are not in scope for a `using`.
            let target = self.map_type(&alias.target, Scope::top_level());
            aliases.push(format!("using {} = {};", alias.name, target));
        }

        let mut header = String::new();
        for namespace in &self.imports {
            header.push_str(&format!("using {};\n", namespace));
        }
        if !aliases.is_empty() {
            if !header.is_empty() {
                header.push('\n');
            }
            for line in aliases {
                header.push_str(&line);
                header.push('\n');
            }
        }
        header
    }
}

fn loose_returns_value(loose: &[&Statement]) -> bool {
    loose.iter().any(|stmt| lowering::returns_value(std::slice::from_ref(*stmt)))
}

/// A static `Main` already declared in a class or module, as a qualified name.
fn find_static_entry(statements: &[Statement], prefix: &str) -> Option<String> {
    let qualify = |name: &str| {
        if prefix.is_empty() { name.to_string() } else { format!("{}.{}", prefix, name) }
    };
    statements.iter().find_map(|stmt| match stmt {
        Statement::Namespace(ns) => find_static_entry(&ns.members, &qualify(&ns.name)),
        Statement::Class(decl) | Statement::Struct(decl) => decl.members.iter().find_map(|member| match member {
            Statement::Function(f) | Statement::Method(f)
                if f.name == ENTRY && (f.is_static || f.has_modifier(Modifier::Static)) =>
            {
                Some(format!("{}.{}", qualify(&decl.name), ENTRY))
            }
            _ => None,
        }),
        Statement::Module(module) => module.members.iter().find_map(|member| match member {
            Statement::Function(f) | Statement::Method(f) if f.name == ENTRY => {
                Some(format!("{}.{}", qualify(&module.name), ENTRY))
            }
            _ => None,
        }),
        _ => None,
    })
}
