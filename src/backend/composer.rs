//! Target-independent program composition.
//!
//! Flattens includes, partitions a unit's top-level statements, and merges several units into one for combined
//! builds. The target-specific layout (implicit containers, entry-point conventions) lives in each backend's
//! `program.rs`.

use std::collections::{HashMap, HashSet};

use polyemit_syntax::ast::*;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Inline every `Include` (recursively) in place.
pub fn flatten_includes(statements: &[Statement]) -> Vec<Statement> {
    let mut flat = Vec::with_capacity(statements.len());
    push_flattened(statements, &mut flat);
    flat
}

fn push_flattened(statements: &[Statement], out: &mut Vec<Statement>) {
    for stmt in statements {
        match stmt {
            Statement::Include(include) => {
                tracing::debug!(path = %include.path, "inlining include");
                push_flattened(&include.program.statements, out);
            }
            other => out.push(other.clone()),
        }
    }
}

/// Top-level statements bucketed by role.
#[derive(Debug, Default)]
pub struct Partition<'p> {
    pub imports: Vec<&'p ImportDecl>,
    pub aliases: Vec<&'p TypeAliasDecl>,
    /// Namespaces, classes, structs, interfaces, enums and modules, in source order.
    pub containers: Vec<&'p Statement>,
    pub functions: Vec<&'p FunctionDecl>,
    /// Fields and properties declared outside any type.
    pub members: Vec<&'p Statement>,
    /// Raw blocks written directly at the top level; they stay outside any implicit container.
    pub raw: Vec<&'p RawBlock>,
    /// Everything else: executable statements.
    pub loose: Vec<&'p Statement>,
}

impl<'p> Partition<'p> {
    /// Partition already-flattened statements.
    pub fn of(statements: &'p [Statement]) -> Self {
        let mut partition = Self::default();
        for stmt in statements {
            match stmt {
                Statement::Import(import) => partition.imports.push(import),
                Statement::TypeAlias(alias) => partition.aliases.push(alias),
                Statement::Namespace(_)
                | Statement::Class(_)
                | Statement::Struct(_)
                | Statement::Interface(_)
                | Statement::Enum(_)
                | Statement::Module(_) => partition.containers.push(stmt),
                Statement::Function(f) | Statement::Method(f) => partition.functions.push(f),
                Statement::Field(_) | Statement::Property(_) => partition.members.push(stmt),
                Statement::Raw(raw) => partition.raw.push(raw),
                // flatten_includes has already run
                Statement::Include(include) => {
                    tracing::warn!(path = %include.path, "unflattened include reached partitioning");
                }
                _ => partition.loose.push(stmt),
            }
        }
        partition
    }

    /// Whether anything needs an implicit container around it.
    pub fn has_loose_code(&self) -> bool {
        !self.functions.is_empty() || !self.members.is_empty() || !self.loose.is_empty()
    }

    /// Top-level function called `entry_name`, if any.
    pub fn entry_function(&self, entry_name: &str) -> Option<&'p FunctionDecl> {
        self.functions.iter().copied().find(|f| f.name == entry_name)
    }
}

/// Merge several units into one for a combined build.
///
/// - imports are deduplicated by identity key (path + alias)
/// - type aliases are deduplicated by name; a conflicting redefinition is a warning and the first wins
/// - namespaces with the same name are unioned, member order preserved
/// - everything else is kept in order
#[tracing::instrument(skip_all, fields(unit_count = programs.len()))]
pub fn merge_programs(programs: &[Program], sink: &mut dyn DiagnosticSink) -> Program {
    let mut imports: Vec<Statement> = Vec::new();
    let mut import_keys: HashSet<String> = HashSet::new();
    let mut aliases: Vec<Statement> = Vec::new();
    let mut alias_targets: HashMap<String, TypeRef> = HashMap::new();
    let mut namespaces: Vec<NamespaceDecl> = Vec::new();
    let mut namespace_index: HashMap<String, usize> = HashMap::new();
    let mut types: Vec<Statement> = Vec::new();
    let mut functions: Vec<Statement> = Vec::new();
    let mut members: Vec<Statement> = Vec::new();
    let mut loose: Vec<Statement> = Vec::new();

    for program in programs {
        for stmt in flatten_includes(&program.statements) {
            match stmt {
                Statement::Import(import) => {
                    if import_keys.insert(import.key()) {
                        imports.push(Statement::Import(import));
                    }
                }
                Statement::TypeAlias(alias) => match alias_targets.get(&alias.name) {
                    Some(existing) if *existing != alias.target => {
                        sink.report(
                            Diagnostic::warning(format!(
                                "conflicting redefinition of type alias `{}`; keeping `{}`",
                                alias.name, existing
                            ))
                            .with_note(format!("redefinition targets `{}`", alias.target)),
                        );
                    }
                    Some(_) => {}
                    None => {
                        alias_targets.insert(alias.name.clone(), alias.target.clone());
                        aliases.push(Statement::TypeAlias(alias));
                    }
                },
                Statement::Namespace(ns) => match namespace_index.get(&ns.name) {
                    Some(&index) => namespaces[index].members.extend(ns.members),
                    None => {
                        namespace_index.insert(ns.name.clone(), namespaces.len());
                        namespaces.push(ns);
                    }
                },
                stmt @ (Statement::Class(_)
                | Statement::Struct(_)
                | Statement::Interface(_)
                | Statement::Enum(_)
                | Statement::Module(_)) => types.push(stmt),
                stmt @ (Statement::Function(_) | Statement::Method(_)) => functions.push(stmt),
                stmt @ (Statement::Field(_) | Statement::Property(_)) => members.push(stmt),
                other => loose.push(other),
            }
        }
    }

    tracing::debug!(
        imports = imports.len(),
        aliases = aliases.len(),
        namespaces = namespaces.len(),
        "merged units"
    );

    let mut statements = imports;
    statements.extend(aliases);
    statements.extend(namespaces.into_iter().map(Statement::Namespace));
    statements.extend(types);
    statements.extend(functions);
    statements.extend(members);
    statements.extend(loose);
    Program::new(statements)
}

/// First type declared inside another type, as `(outer, inner)`.
///
/// Types may nest inside namespaces and modules, never inside classes, structs or interfaces.
pub fn find_nested_type(statements: &[Statement]) -> Option<(String, String)> {
    for stmt in statements {
        match stmt {
            Statement::Namespace(ns) => {
                if let Some(found) = find_nested_type(&ns.members) {
                    return Some(found);
                }
            }
            Statement::Module(module) => {
                if let Some(found) = find_nested_type(&module.members) {
                    return Some(found);
                }
            }
            Statement::Class(decl) | Statement::Struct(decl) | Statement::Interface(decl) => {
                if let Some(inner) = decl.members.iter().find_map(declared_type_name) {
                    return Some((decl.name.clone(), inner.to_string()));
                }
            }
            _ => {}
        }
    }
    None
}

fn declared_type_name(stmt: &Statement) -> Option<&str> {
    match stmt {
        Statement::Class(d) | Statement::Struct(d) | Statement::Interface(d) => Some(&d.name),
        Statement::Enum(e) => Some(&e.name),
        Statement::Namespace(ns) => Some(&ns.name),
        Statement::Module(m) => Some(&m.name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticBag;

    fn include(path: &str, statements: Vec<Statement>) -> Statement {
        Statement::Include(IncludeDecl {
            path: path.to_string(),
            program: Program::new(statements),
        })
    }

    #[test]
    fn test_flatten_nested_includes() {
        let inner = include("b.src", vec![Statement::Break]);
        let outer = include("a.src", vec![Statement::Continue, inner]);
        let flat = flatten_includes(&[outer, Statement::Return(None)]);
        assert_eq!(flat, vec![Statement::Continue, Statement::Break, Statement::Return(None)]);
    }

    #[test]
    fn test_partition_buckets() {
        let statements = vec![
            Statement::Import(ImportDecl::new(&["System"])),
            Statement::Class(TypeDecl::new("A", vec![])),
            Statement::Function(FunctionDecl::new("main", vec![])),
            Statement::let_("x", Expr::number("1")),
            Statement::Raw(RawBlock {
                target: None,
                code: "// top".to_string(),
            }),
        ];
        let partition = Partition::of(&statements);
        assert_eq!(partition.imports.len(), 1);
        assert_eq!(partition.containers.len(), 1);
        assert_eq!(partition.functions.len(), 1);
        assert_eq!(partition.loose.len(), 1);
        assert_eq!(partition.raw.len(), 1);
        assert!(partition.has_loose_code());
        assert!(partition.entry_function("main").is_some());
    }

    #[test]
    fn test_merge_conflicting_alias_warns_first_wins() {
        let alias = |target: &str| {
            Statement::TypeAlias(TypeAliasDecl {
                name: "Id".to_string(),
                generics: vec![],
                target: TypeRef::named(target),
            })
        };
        let a = Program::new(vec![alias("int")]);
        let b = Program::new(vec![alias("string")]);
        let c = Program::new(vec![alias("int")]);
        let mut bag = DiagnosticBag::new();
        let merged = merge_programs(&[a, b, c], &mut bag);
        assert_eq!(merged.statements, vec![alias("int")]);
        assert_eq!(bag.warnings().count(), 1);
    }

    #[test]
    fn test_find_nested_type() {
        let outer = TypeDecl::new("Outer", vec![Statement::Enum(EnumDecl {
            name: "Inner".to_string(),
            ..EnumDecl::default()
        })]);
        let ns = Statement::Namespace(NamespaceDecl {
            name: "App".to_string(),
            members: vec![Statement::Class(outer)],
        });
        assert_eq!(find_nested_type(&[ns]), Some(("Outer".to_string(), "Inner".to_string())));
        let flat = Statement::Class(TypeDecl::new("Flat", vec![]));
        assert_eq!(find_nested_type(&[flat]), None);
    }
}
