//! Abstract Syntax Tree definitions consumed by the backend.
//!
//! The tree is produced once per compilation unit by the external parser and is never mutated afterwards. Shapes that
//! must be mutually exclusive are sum types: a `for` loop is either C-style or an iteration ([`ForKind`]), and a match
//! arm yields either one expression or a statement block ([`ArmResult`]).

use polyemit_core::lang::markers::{self, MarkerId};
use serde::{Deserialize, Serialize};

use crate::tokens::TokenKind;

/// Identifier (a plain `String`; the parser does not intern).
pub type Ident = String;

/// A program is an ordered list of statements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Import(ImportDecl),
    /// An include whose target the parser has already resolved and parsed.
    Include(IncludeDecl),
    TypeAlias(TypeAliasDecl),
    Namespace(NamespaceDecl),
    Class(TypeDecl),
    Struct(TypeDecl),
    Interface(TypeDecl),
    Enum(EnumDecl),
    Module(ModuleDecl),
    Function(FunctionDecl),
    Method(FunctionDecl),
    Field(FieldDecl),
    Property(PropertyDecl),
    Variable(VariableDecl),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(Option<Expr>),
    Break,
    Continue,
    Match(MatchNode),
    Switch(SwitchStmt),
    Expression(Expr),
    /// Target text passed through verbatim.
    Raw(RawBlock),
}

impl Statement {
    /// Short human-readable kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Import(_) => "import",
            Statement::Include(_) => "include",
            Statement::TypeAlias(_) => "type alias",
            Statement::Namespace(_) => "namespace",
            Statement::Class(_) => "class",
            Statement::Struct(_) => "struct",
            Statement::Interface(_) => "interface",
            Statement::Enum(_) => "enum",
            Statement::Module(_) => "module",
            Statement::Function(_) => "function",
            Statement::Method(_) => "method",
            Statement::Field(_) => "field",
            Statement::Property(_) => "property",
            Statement::Variable(_) => "variable",
            Statement::If(_) => "if",
            Statement::While(_) => "while",
            Statement::For(_) => "for",
            Statement::Return(_) => "return",
            Statement::Break => "break",
            Statement::Continue => "continue",
            Statement::Match(_) => "match",
            Statement::Switch(_) => "switch",
            Statement::Expression(_) => "expression",
            Statement::Raw(_) => "raw block",
        }
    }

    /// Whether the statement declares a named type.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            Statement::Class(_) | Statement::Struct(_) | Statement::Interface(_) | Statement::Enum(_)
        )
    }

    /// Expression statement shorthand.
    pub fn expr(expr: Expr) -> Self {
        Statement::Expression(expr)
    }

    /// `let name = value` shorthand.
    pub fn let_(name: &str, value: Expr) -> Self {
        Statement::Variable(VariableDecl {
            name: name.to_string(),
            ty: None,
            value: Some(value),
            kind: BindingKind::Let,
        })
    }

    /// `return value` shorthand.
    pub fn ret(value: Expr) -> Self {
        Statement::Return(Some(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Module path segments (`System.Text` is `["System", "Text"]`).
    pub path: Vec<Ident>,
    #[serde(default)]
    pub alias: Option<Ident>,
}

impl ImportDecl {
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            alias: None,
        }
    }

    /// Identity key used to deduplicate imports across units.
    pub fn key(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{}={}", alias, self.path.join(".")),
            None => self.path.join("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludeDecl {
    pub path: String,
    pub program: Program,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub name: Ident,
    #[serde(default)]
    pub generics: Vec<GenericParam>,
    pub target: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NamespaceDecl {
    /// May be dotted (`App.Models`).
    pub name: Ident,
    pub members: Vec<Statement>,
}

/// Class, struct or interface declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDecl {
    pub name: Ident,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<Attribute>,
    pub generics: Vec<GenericParam>,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<Statement>,
}

impl TypeDecl {
    pub fn new(name: &str, members: Vec<Statement>) -> Self {
        Self {
            name: name.to_string(),
            members,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDecl {
    pub name: Ident,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<Attribute>,
    pub variants: Vec<EnumVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: Ident,
    #[serde(default)]
    pub value: Option<Expr>,
}

/// A module: a named bag of static members.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDecl {
    pub name: Ident,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<Attribute>,
    pub members: Vec<Statement>,
}

/// Function or method declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDecl {
    /// May be qualified (`Console.Beep`) for foreign-call declarations.
    pub name: Ident,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub generics: Vec<GenericParam>,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<Attribute>,
    /// `None` for declarations without a body (abstract, interface, external).
    pub body: Option<Vec<Statement>>,
    pub is_constructor: bool,
    pub is_static: bool,
}

impl FunctionDecl {
    pub fn new(name: &str, body: Vec<Statement>) -> Self {
        Self {
            name: name.to_string(),
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }

    pub fn marker(&self) -> Option<MarkerId> {
        marker_of(&self.attributes)
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: Option<TypeRef>,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<Attribute>,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDecl {
    pub name: Ident,
    pub ty: Option<TypeRef>,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<Attribute>,
    pub accessors: Vec<Accessor>,
    pub initializer: Option<Expr>,
}

impl PropertyDecl {
    /// Whether every accessor is bodiless (`{ get; set; }`).
    pub fn is_auto(&self) -> bool {
        self.accessors.iter().all(|a| a.body.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    pub kind: AccessorKind,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub body: Option<Vec<Statement>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Immutable binding.
    #[default]
    Let,
    /// Mutable binding.
    Var,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: Ident,
    #[serde(default)]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub value: Option<Expr>,
    #[serde(default)]
    pub kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Vec<Statement>,
    #[serde(default)]
    pub else_branch: Option<Vec<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub kind: ForKind,
    pub body: Vec<Statement>,
}

/// The two loop shapes; a `for` is always exactly one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForKind {
    /// `for (init; condition; increment)`; every part is optional.
    CStyle {
        init: Option<Box<Statement>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
    },
    /// `for variable in iterable`.
    Iteration {
        variable: Ident,
        variable_type: Option<TypeRef>,
        iterable: Expr,
    },
}

/// A match, in statement or expression position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchNode {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: ArmPattern,
    pub result: ArmResult,
}

/// Arm selector: the wildcard, or one or more value patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArmPattern {
    Default,
    Values(Vec<Expr>),
}

/// What an arm yields: exactly one expression or a statement block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArmResult {
    Expression(Expr),
    Block(Vec<Statement>),
}

/// C-style switch statement: every case body is a statement block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub subject: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub pattern: ArmPattern,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Target id the text is written for; `None` means every target.
    #[serde(default)]
    pub target: Option<String>,
    pub code: String,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Identifier(Ident),
    QualifiedIdentifier(Vec<Ident>),
    MemberAccess {
        object: Box<Expr>,
        member: Ident,
    },
    IndexAccess {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: TokenKind,
        right: Box<Expr>,
    },
    Unary {
        op: TokenKind,
        operand: Box<Expr>,
        #[serde(default)]
        postfix: bool,
    },
    Assignment {
        target: Box<Expr>,
        op: TokenKind,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    ConstructorCall {
        ty: TypeRef,
        args: Vec<Expr>,
    },
    ArrayLiteral {
        elements: Vec<Expr>,
        #[serde(default)]
        element_type: Option<TypeRef>,
    },
    Lambda {
        params: Vec<Parameter>,
        body: LambdaBody,
    },
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        /// `false` for the simple half-open `start..end`.
        #[serde(default)]
        inclusive: bool,
    },
    Block(Vec<Statement>),
    Match(Box<MatchNode>),
    This,
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Identifier(name.to_string())
    }

    pub fn number(text: &str) -> Self {
        Expr::Literal(Literal::Number(text.to_string()))
    }

    pub fn string(text: &str) -> Self {
        Expr::Literal(Literal::String(text.to_string()))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn binary(left: Expr, op: TokenKind, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(object: Expr, member: &str) -> Self {
        Expr::MemberAccess {
            object: Box::new(object),
            member: member.to_string(),
        }
    }

    pub fn range(start: Option<Expr>, end: Option<Expr>) -> Self {
        Expr::Range {
            start: start.map(Box::new),
            end: end.map(Box::new),
            inclusive: false,
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Expr::Literal(Literal::String(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Numeric text exactly as written in source.
    Number(String),
    String(String),
    Char(char),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LambdaBody {
    Expression(Box<Expr>),
    Block(Vec<Statement>),
}

// ============================================================================
// Types, parameters, attributes, modifiers
// ============================================================================

/// A type as written in source.
///
/// When `args` is empty, `name` may still carry unstructured generic text (`map<string, int>`), an array suffix
/// (`int[]`) or a nullable suffix (`string?`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: &str, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Ident,
    #[serde(default)]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl Parameter {
    pub fn new(name: &str, ty: Option<TypeRef>) -> Self {
        Self {
            name: name.to_string(),
            ty,
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParam {
    pub name: Ident,
    #[serde(default)]
    pub constraints: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: Ident,
    #[serde(default)]
    pub args: Vec<Expr>,
}

impl Attribute {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// The marker this attribute spells, if any.
    pub fn marker(&self) -> Option<MarkerId> {
        markers::from_str(&self.name)
    }
}

/// First marker found among `attributes`.
pub fn marker_of(attributes: &[Attribute]) -> Option<MarkerId> {
    attributes.iter().find_map(Attribute::marker)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Abstract,
    Virtual,
    Override,
    Readonly,
    Const,
    Async,
    Sealed,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Readonly => "readonly",
            Modifier::Const => "const",
            Modifier::Async => "async",
            Modifier::Sealed => "sealed",
        }
    }

    /// Access modifiers (`public`, `private`, `protected`, `internal`).
    pub fn is_access(self) -> bool {
        matches!(
            self,
            Modifier::Public | Modifier::Private | Modifier::Protected | Modifier::Internal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_key_includes_alias() {
        let plain = ImportDecl::new(&["System", "Text"]);
        let mut aliased = plain.clone();
        aliased.alias = Some("T".to_string());
        assert_eq!(plain.key(), "System.Text");
        assert_eq!(aliased.key(), "T=System.Text");
    }

    #[test]
    fn test_marker_lookup() {
        let attrs = vec![Attribute::new("Obsolete"), Attribute::new("foreign-call")];
        assert_eq!(marker_of(&attrs), Some(MarkerId::ForeignCall));
        assert_eq!(marker_of(&[Attribute::new("Obsolete")]), None);
    }

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::generic("map", vec![TypeRef::named("string"), TypeRef::named("int")]);
        assert_eq!(ty.to_string(), "map<string, int>");
    }

    #[test]
    fn test_program_json_roundtrip_shape() {
        let json = r#"{
            "statements": [
                { "Function": { "name": "main", "body": [
                    { "Expression": { "Call": { "callee": { "Identifier": "print" },
                                                "args": [ { "Literal": { "String": "hi" } } ] } } }
                ] } }
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };
        assert_eq!(func.name, "main");
        assert!(!func.is_constructor);
        assert_eq!(func.body.as_ref().map(Vec::len), Some(1));
    }
}
