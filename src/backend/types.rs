//! Target-independent half of type mapping.
//!
//! A [`TypeRef`] is first normalized (unstructured `name<args>`, `T[]` and `T?` text becomes structured arguments),
//! then classified into a [`TypeShape`] following the resolution order every backend shares:
//!
//! 1. generic parameter in scope
//! 2. primitive name or alias
//! 3. generic container
//! 4. type declared in the current unit (or a type alias)
//! 5. qualified name, passed through
//! 6. anything else is unresolved; the backend may consult its [`TypeResolver`] before using its catch-all
//!
//! Backends turn shapes into spellings in `csharp/types.rs` and `rust/types.rs`.

use std::collections::{HashMap, HashSet};

use polyemit_core::lang::types::{self, GenericTypeId, PrimitiveTypeId};
use polyemit_syntax::ast::{GenericParam, Statement, TypeRef};

// ============================================================================
// Normalization
// ============================================================================

/// Split type arguments, respecting nested brackets
pub fn split_type_args(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '[' | '<' | '(' => depth += 1,
            ']' | '>' | ')' => depth -= 1,
            ',' if depth == 0 => {
                result.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < s.len() && !s[start..].trim().is_empty() {
        result.push(&s[start..]);
    }

    result
}

/// Parse type text such as `map<string, list<int>>`, `int[]` or `string?` into a structured reference.
pub fn parse_type_text(text: &str) -> TypeRef {
    let text = text.trim();
    if let Some(inner) = text.strip_suffix('?') {
        return TypeRef::generic("optional", vec![parse_type_text(inner)]);
    }
    if let Some(inner) = text.strip_suffix("[]") {
        return TypeRef::generic("array", vec![parse_type_text(inner)]);
    }
    if text.ends_with('>') {
        if let Some(open) = text.find('<') {
            let name = text[..open].trim();
            let inner = &text[open + 1..text.len() - 1];
            let args = split_type_args(inner).into_iter().map(parse_type_text).collect();
            return TypeRef::generic(name, args);
        }
    }
    TypeRef::named(text)
}

/// Give a reference structured arguments all the way down.
pub fn normalize(ty: &TypeRef) -> TypeRef {
    if ty.args.is_empty() {
        parse_type_text(&ty.name)
    } else {
        TypeRef {
            name: ty.name.trim().to_string(),
            args: ty.args.iter().map(normalize).collect(),
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// What a normalized type reference names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeShape<'t> {
    GenericParam(&'t str),
    Primitive(PrimitiveTypeId),
    Container(GenericTypeId, &'t [TypeRef]),
    Declared(&'t str, &'t [TypeRef]),
    Qualified(&'t str, &'t [TypeRef]),
    Unresolved(&'t str, &'t [TypeRef]),
}

/// Classify a normalized reference.
///
/// `generics` holds the generic parameter lists in scope, innermost last.
pub fn classify<'t>(ty: &'t TypeRef, generics: &[&[GenericParam]], known: &KnownTypes) -> TypeShape<'t> {
    let name = ty.name.as_str();
    let args = ty.args.as_slice();

    if args.is_empty() && generics.iter().any(|list| list.iter().any(|g| g.name == name)) {
        return TypeShape::GenericParam(name);
    }
    if args.is_empty() {
        if let Some(id) = types::primitive_from_str(name) {
            return TypeShape::Primitive(id);
        }
    }
    if let Some(id) = types::generic_from_str(name) {
        return TypeShape::Container(id, args);
    }
    if known.contains(name) {
        return TypeShape::Declared(name, args);
    }
    if name.contains('.') || name.contains("::") {
        return TypeShape::Qualified(name, args);
    }
    TypeShape::Unresolved(name, args)
}

/// Pad container arguments up to the arity the container requires.
pub fn fill_args(id: GenericTypeId, mut args: Vec<String>, filler: &str) -> Vec<String> {
    let minimum = types::generic_arity(id).minimum();
    while args.len() < minimum {
        args.push(filler.to_string());
    }
    args
}

// ============================================================================
// Declared types
// ============================================================================

/// Names of the types declared in the unit being generated.
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    types: HashSet<String>,
    interfaces: HashSet<String>,
}

impl KnownTypes {
    /// Collect every class, struct, interface, enum and alias name, descending into namespaces, modules and type
    /// members.
    pub fn collect(statements: &[Statement]) -> Self {
        let mut known = Self::default();
        known.scan(statements);
        known
    }

    fn scan(&mut self, statements: &[Statement]) {
        for stmt in statements {
            match stmt {
                Statement::Class(decl) | Statement::Struct(decl) => {
                    self.insert(&decl.name);
                    self.scan(&decl.members);
                }
                Statement::Interface(decl) => {
                    self.insert(&decl.name);
                    self.interfaces.insert(decl.name.clone());
                }
                Statement::Enum(decl) => self.insert(&decl.name),
                Statement::TypeAlias(alias) => self.insert(&alias.name),
                Statement::Namespace(ns) => self.scan(&ns.members),
                Statement::Module(module) => self.scan(&module.members),
                Statement::Include(include) => self.scan(&include.program.statements),
                _ => {}
            }
        }
    }

    pub fn insert(&mut self, name: &str) {
        self.types.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ============================================================================
// Type resolution service
// ============================================================================

/// Recovers an exact host-runtime spelling for a type name the manual tables do not know.
///
/// Lookups are read-only and may run concurrently from independent `generate` calls.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolver that never resolves anything: the manual table is all there is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTypeResolver;

impl TypeResolver for NoopTypeResolver {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Resolver backed by a fixed name -> spelling table.
#[derive(Debug, Clone, Default)]
pub struct TableTypeResolver {
    table: HashMap<String, String>,
}

impl TableTypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, spelling: &str) -> Self {
        self.insert(name, spelling);
        self
    }

    pub fn insert(&mut self, name: &str, spelling: &str) {
        self.table.insert(name.to_string(), spelling.to_string());
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Commonly used .NET base class library types.
    pub fn dotnet() -> Self {
        const DOTNET: &[(&str, &str)] = &[
            ("StringBuilder", "System.Text.StringBuilder"),
            ("Encoding", "System.Text.Encoding"),
            ("Regex", "System.Text.RegularExpressions.Regex"),
            ("DateTime", "System.DateTime"),
            ("TimeSpan", "System.TimeSpan"),
            ("Guid", "System.Guid"),
            ("Uri", "System.Uri"),
            ("Random", "System.Random"),
            ("Exception", "System.Exception"),
            ("Console", "System.Console"),
            ("Math", "System.Math"),
            ("Lazy", "System.Lazy"),
            ("Stopwatch", "System.Diagnostics.Stopwatch"),
            ("File", "System.IO.File"),
            ("Path", "System.IO.Path"),
            ("Stream", "System.IO.Stream"),
            ("StreamReader", "System.IO.StreamReader"),
            ("StreamWriter", "System.IO.StreamWriter"),
            ("HttpClient", "System.Net.Http.HttpClient"),
            ("CancellationToken", "System.Threading.CancellationToken"),
            ("Queue", "System.Collections.Generic.Queue"),
            ("Stack", "System.Collections.Generic.Stack"),
            ("LinkedList", "System.Collections.Generic.LinkedList"),
            ("KeyValuePair", "System.Collections.Generic.KeyValuePair"),
            ("IEnumerable", "System.Collections.Generic.IEnumerable"),
        ];
        let mut resolver = Self::new();
        for (name, spelling) in DOTNET {
            resolver.insert(name, spelling);
        }
        resolver
    }
}

impl TypeResolver for TableTypeResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.table.get(name).cloned()
    }
}
