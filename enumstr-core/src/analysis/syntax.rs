//! Tagged syntax model of the parts of a Go file enumstr cares about, and
//! the lowering from the tree-sitter concrete syntax tree into it.
//!
//! Only declarations are modelled: the package clause, imports, the names
//! that enter package scope, and every `const` group (including groups
//! declared inside function bodies).

use std::path::{Path, PathBuf};
use tree_sitter::Node;

use super::parser::node_text;

/// 1-indexed source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    fn of(node: Node<'_>) -> Self {
        let p = node.start_position();
        Self {
            line: p.row + 1,
            column: p.column + 1,
        }
    }
}

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Position,
}

impl Ident {
    fn from_node(node: Node<'_>, source: &str) -> Self {
        Self {
            name: node_text(node, source).to_string(),
            pos: Position::of(node),
        }
    }
}

/// A name an expression or type refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Plain identifier in expression position.
    Value(Ident),
    /// Identifier in type position.
    Type(Ident),
    /// Package qualifier of a qualified type.
    Package(Ident),
}

/// Explicit type annotation of a const spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Named(Ident),
    /// `pkg.T`
    Qualified { package: Ident, name: Ident },
    /// Any other type (pointer, slice, generic instantiation, ...).
    Other { text: String, refs: Vec<Reference> },
}

impl TypeExpr {
    pub fn references(&self) -> Vec<Reference> {
        match self {
            TypeExpr::Named(id) => vec![Reference::Type(id.clone())],
            TypeExpr::Qualified { package, .. } => vec![Reference::Package(package.clone())],
            TypeExpr::Other { refs, .. } => refs.clone(),
        }
    }
}

/// Shape of an initializer expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `f(a, b)`; `callee` is set when the function is a plain identifier.
    Call { callee: Option<Ident>, args: usize },
    /// A bare identifier.
    Name(Ident),
    /// Basic literal, `true`, `false` or `nil`.
    Literal,
    /// The predeclared `iota`.
    Iota,
    /// Everything else: operators, parentheses, selectors, ...
    Composite,
}

/// Initializer expression of a const spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub refs: Vec<Reference>,
    pub pos: Position,
}

/// One line of a const group: `A, B T = x, y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub pos: Position,
}

/// A `const` declaration, either a single spec or a parenthesized group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstGroup {
    pub specs: Vec<ConstSpec>,
    /// Declared at package level rather than inside a function body.
    pub top_level: bool,
    pub pos: Position,
}

/// Kind of a package-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Type,
    Const,
    Var,
    Func,
}

/// A name declared in package scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub name: Ident,
    pub kind: DeclKind,
}

/// An import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Explicit name: an alias, `.` or `_`.
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
    pub pos: Position,
}

impl Import {
    /// Reports whether this is a `.` import.
    pub fn is_dot(&self) -> bool {
        self.alias.as_deref() == Some(".")
    }

    /// Name the import binds in the file scope, if it can be told from the
    /// import path alone.
    ///
    /// Without an alias the last path element is used, skipping a trailing
    /// major version element (`/v2`) and a `.vN` suffix (`yaml.v3`). An
    /// element that is not an identifier (`go-isatty`) gives `None`: the
    /// package clause of the imported package decides its name.
    pub fn local_name(&self) -> Option<String> {
        match self.alias.as_deref() {
            Some(".") | Some("_") => None,
            Some(alias) => Some(alias.to_string()),
            None => self
                .path_name()
                .filter(|name| is_identifier(name))
                .map(str::to_string),
        }
    }

    /// Reports whether the import binds a name that cannot be derived from
    /// its path.
    pub fn has_unknown_name(&self) -> bool {
        self.alias.is_none() && !self.path_name().is_some_and(is_identifier)
    }

    fn path_name(&self) -> Option<&str> {
        let mut elems = self.path.rsplit('/');
        let mut last = elems.next()?;
        if is_major_version(last) {
            last = elems.next()?;
        }
        let name = match last.rsplit_once(".v") {
            Some((base, v)) if v.chars().all(|c| c.is_ascii_digit()) && !v.is_empty() => base,
            _ => last,
        };
        Some(name)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Lowered view of one Go file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package: Ident,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
    /// Types declared inside function bodies.
    pub local_types: Vec<Ident>,
    /// Every const group in file order.
    pub const_groups: Vec<ConstGroup>,
}

impl SourceFile {
    /// Lowers a parsed, error-free tree.
    ///
    /// Returns `None` when the file has no package clause.
    pub fn lower(path: &Path, root: Node<'_>, source: &str) -> Option<Self> {
        let mut cursor = root.walk();
        let package = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")
            .and_then(|clause| first_named(clause, "package_identifier"))
            .map(|n| Ident::from_node(n, source))?;

        let mut file = SourceFile {
            path: path.to_path_buf(),
            package,
            imports: Vec::new(),
            decls: Vec::new(),
            local_types: Vec::new(),
            const_groups: Vec::new(),
        };

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "import_declaration" => file.lower_imports(node, source),
                "type_declaration" => {
                    for name in type_names(node, source) {
                        file.decls.push(Decl { name, kind: DeclKind::Type });
                    }
                }
                "var_declaration" => {
                    for name in spec_names(node, "var_spec", source) {
                        file.decls.push(Decl { name, kind: DeclKind::Var });
                    }
                }
                "const_declaration" => {
                    for name in spec_names(node, "const_spec", source) {
                        file.decls.push(Decl { name, kind: DeclKind::Const });
                    }
                }
                "function_declaration" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        file.decls.push(Decl {
                            name: Ident::from_node(name, source),
                            kind: DeclKind::Func,
                        });
                    }
                }
                _ => {}
            }
        }

        file.collect_nested(root, source);
        Some(file)
    }

    fn lower_imports(&mut self, node: Node<'_>, source: &str) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => {
                    let alias = child
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source).to_string());
                    let path = child
                        .child_by_field_name("path")
                        .map(|n| unquote(node_text(n, source)))
                        .unwrap_or_default();
                    self.imports.push(Import {
                        alias,
                        path,
                        pos: Position::of(child),
                    });
                }
                "import_spec_list" => self.lower_imports(child, source),
                _ => {}
            }
        }
    }

    /// Walks the whole tree in source order collecting const groups and
    /// function-local type declarations.
    fn collect_nested(&mut self, node: Node<'_>, source: &str) {
        match node.kind() {
            "const_declaration" => {
                let top_level = node.parent().is_some_and(|p| p.kind() == "source_file");
                self.const_groups.push(lower_const_group(node, top_level, source));
                return;
            }
            "type_declaration" if node.parent().is_some_and(|p| p.kind() != "source_file") => {
                self.local_types.extend(type_names(node, source));
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.collect_nested(child, source);
        }
    }
}

fn first_named<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|n| n.kind() == kind);
    found
}

fn unquote(literal: &str) -> String {
    literal.trim_matches(|c| c == '"' || c == '`').to_string()
}

/// Names declared by a `type` declaration (specs and aliases).
fn type_names(node: Node<'_>, source: &str) -> Vec<Ident> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "type_spec" | "type_alias" => {
                if let Some(name) = child.child_by_field_name("name") {
                    out.push(Ident::from_node(name, source));
                }
            }
            _ => {}
        }
    }
    out
}

/// Names declared by the specs of a `var` or `const` declaration.
fn spec_names(node: Node<'_>, spec_kind: &str, source: &str) -> Vec<Ident> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == spec_kind {
            out.extend(field_names(child, source));
        } else if child.kind().ends_with("_spec_list") {
            out.extend(spec_names(child, spec_kind, source));
        }
    }
    out
}

/// Nodes of the `name` field. Commas share the field; the blank identifier
/// may be an anonymous token depending on the grammar version.
fn field_names(spec: Node<'_>, source: &str) -> Vec<Ident> {
    let mut cursor = spec.walk();
    let names = spec
        .children_by_field_name("name", &mut cursor)
        .filter(|n| n.is_named() || node_text(*n, source) == "_")
        .map(|n| Ident::from_node(n, source))
        .collect();
    names
}

fn lower_const_group(node: Node<'_>, top_level: bool, source: &str) -> ConstGroup {
    let mut cursor = node.walk();
    let specs = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "const_spec")
        .map(|spec| lower_const_spec(spec, source))
        .collect();
    ConstGroup {
        specs,
        top_level,
        pos: Position::of(node),
    }
}

fn lower_const_spec(spec: Node<'_>, source: &str) -> ConstSpec {
    let ty = spec.child_by_field_name("type").map(|t| lower_type(t, source));
    let values = match spec.child_by_field_name("value") {
        Some(list) => {
            let mut cursor = list.walk();
            let exprs: Vec<Expr> = list
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .map(|n| lower_expr(n, source))
                .collect();
            exprs
        }
        None => Vec::new(),
    };
    ConstSpec {
        names: field_names(spec, source),
        ty,
        values,
        pos: Position::of(spec),
    }
}

fn lower_type(node: Node<'_>, source: &str) -> TypeExpr {
    match node.kind() {
        "type_identifier" => TypeExpr::Named(Ident::from_node(node, source)),
        "qualified_type" => {
            match (
                node.child_by_field_name("package"),
                node.child_by_field_name("name"),
            ) {
                (Some(package), Some(name)) => TypeExpr::Qualified {
                    package: Ident::from_node(package, source),
                    name: Ident::from_node(name, source),
                },
                _ => other_type(node, source),
            }
        }
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => lower_type(inner, source),
            None => other_type(node, source),
        },
        _ => other_type(node, source),
    }
}

fn other_type(node: Node<'_>, source: &str) -> TypeExpr {
    let mut refs = Vec::new();
    collect_refs(node, source, &mut refs);
    TypeExpr::Other {
        text: node_text(node, source).to_string(),
        refs,
    }
}

fn lower_expr(node: Node<'_>, source: &str) -> Expr {
    let kind = match node.kind() {
        "call_expression" => {
            let callee = node
                .child_by_field_name("function")
                .filter(|f| f.kind() == "identifier")
                .map(|f| Ident::from_node(f, source));
            let args = node
                .child_by_field_name("arguments")
                .map(|a| {
                    let mut cursor = a.walk();
                    let count = a
                        .named_children(&mut cursor)
                        .filter(|n| n.kind() != "comment")
                        .count();
                    count
                })
                .unwrap_or(0);
            ExprKind::Call { callee, args }
        }
        "type_conversion_expression" => match node.child_by_field_name("type") {
            Some(ty) if ty.kind() == "type_identifier" => ExprKind::Call {
                callee: Some(Ident::from_node(ty, source)),
                args: 1,
            },
            _ => ExprKind::Composite,
        },
        "identifier" => ExprKind::Name(Ident::from_node(node, source)),
        "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal"
        | "interpreted_string_literal" | "raw_string_literal" | "true" | "false" | "nil" => {
            ExprKind::Literal
        }
        "iota" => ExprKind::Iota,
        _ => ExprKind::Composite,
    };

    let mut refs = Vec::new();
    collect_refs(node, source, &mut refs);
    Expr {
        kind,
        refs,
        pos: Position::of(node),
    }
}

fn collect_refs(node: Node<'_>, source: &str, out: &mut Vec<Reference>) {
    match node.kind() {
        "identifier" => out.push(Reference::Value(Ident::from_node(node, source))),
        "type_identifier" => out.push(Reference::Type(Ident::from_node(node, source))),
        "package_identifier" => out.push(Reference::Package(Ident::from_node(node, source))),
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_refs(child, source, out);
            }
        }
    }
}
