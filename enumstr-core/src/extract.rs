//! Constant extraction: resolve the owning type of every named constant.
//!
//! Groups are walked in file order and specs top to bottom. Per spec:
//! 1. an explicit type annotation moves the group's type cursor and owns
//!    every name of the spec;
//! 2. otherwise each name with an initializer of the form `T(x)`, where `T`
//!    resolves to a type, belongs to `T` (the cursor is left alone);
//! 3. a spec with neither type nor initializer takes the cursor.
//!
//! Initializers of any other shape leave the name unattributed, and the
//! blank identifier is never recorded.

use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::{
    ConstGroup, Expr, ExprKind, Ident, ObjectKind, Package, SourceFile, TypeExpr,
};
use crate::common::is_blank;

/// A constant attributed to a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConstant {
    pub type_name: String,
    pub name: String,
    /// Position of first encounter across the whole package.
    pub order: usize,
    pub file: String,
    pub line: usize,
    /// Declared at package level rather than inside a function body.
    pub top_level: bool,
}

/// Type name to constants, in first-appearance order on both levels.
///
/// Names are not deduplicated: a constant declared in two function bodies is
/// recorded twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeRegistry {
    types: IndexMap<String, Vec<ResolvedConstant>>,
    #[serde(skip)]
    next_order: usize,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a package-level constant `name` under `type_name`. The blank
    /// identifier is ignored.
    pub fn insert(&mut self, type_name: &str, name: &str, file: &str, line: usize) {
        self.insert_scoped(type_name, name, file, line, true);
    }

    /// Like [`insert`](Self::insert), for a constant that may be local to a
    /// function body.
    pub fn insert_scoped(
        &mut self,
        type_name: &str,
        name: &str,
        file: &str,
        line: usize,
        top_level: bool,
    ) {
        if is_blank(name) {
            return;
        }
        let constant = ResolvedConstant {
            type_name: type_name.to_string(),
            name: name.to_string(),
            order: self.next_order,
            file: file.to_string(),
            line,
            top_level,
        };
        self.next_order += 1;
        self.push(constant);
    }

    fn push(&mut self, constant: ResolvedConstant) {
        self.types
            .entry(constant.type_name.clone())
            .or_default()
            .push(constant);
    }

    /// Constants of one type, in declaration order.
    pub fn constants(&self, type_name: &str) -> &[ResolvedConstant] {
        self.types.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Constant names of one type, in declaration order.
    pub fn names(&self, type_name: &str) -> Vec<&str> {
        self.constants(type_name)
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Types in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ResolvedConstant])> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of recorded constants over all types.
    pub fn constant_count(&self) -> usize {
        self.types.values().map(Vec::len).sum()
    }
}

/// Walks every const group of the package and builds the registry.
pub fn extract_constants(pkg: &Package) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for file in &pkg.files {
        let path = file.path.display().to_string();
        for group in &file.const_groups {
            extract_group(pkg, file, &path, group, &mut registry);
        }
    }
    registry
}

/// Keeps what a package-level `String` method can refer to: types declared
/// in the package scope, and only their package-level constants. Recorded
/// order is preserved.
pub fn retain_package_types(registry: &TypeRegistry, pkg: &Package) -> TypeRegistry {
    let mut kept = TypeRegistry {
        types: IndexMap::new(),
        next_order: registry.next_order,
    };
    for (type_name, constants) in registry.iter() {
        if pkg.scope.get(type_name) != Some(ObjectKind::Type) {
            continue;
        }
        for constant in constants.iter().filter(|c| c.top_level) {
            kept.push(constant.clone());
        }
    }
    kept
}

fn extract_group(
    pkg: &Package,
    file: &SourceFile,
    path: &str,
    group: &ConstGroup,
    registry: &mut TypeRegistry,
) {
    let mut cursor: Option<&str> = None;
    let record = |registry: &mut TypeRegistry, ty: &str, name: &Ident| {
        registry.insert_scoped(ty, &name.name, path, name.pos.line, group.top_level);
    };

    for spec in &group.specs {
        match (&spec.ty, spec.values.is_empty()) {
            (Some(TypeExpr::Named(ty)), _) => {
                cursor = Some(ty.name.as_str());
                for name in &spec.names {
                    record(registry, &ty.name, name);
                }
            }
            (Some(TypeExpr::Qualified { .. } | TypeExpr::Other { .. }), _) => {
                cursor = None;
            }
            (None, false) => {
                for (name, value) in spec.names.iter().zip(&spec.values) {
                    if let Some(ty) = conversion_target(pkg, file, value) {
                        record(registry, ty, name);
                    }
                }
            }
            (None, true) => {
                if let Some(ty) = cursor {
                    for name in &spec.names {
                        record(registry, ty, name);
                    }
                }
            }
        }
    }
}

/// The type named by a single-argument conversion `T(x)`.
fn conversion_target<'a>(pkg: &Package, file: &SourceFile, value: &'a Expr) -> Option<&'a str> {
    match &value.kind {
        ExprKind::Call {
            callee: Some(callee),
            args: 1,
        } if pkg.is_type_name(file, &callee.name) => Some(callee.name.as_str()),
        ExprKind::Call { .. }
        | ExprKind::Name(_)
        | ExprKind::Literal
        | ExprKind::Iota
        | ExprKind::Composite => None,
    }
}
