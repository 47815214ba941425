//! Package scope construction and the resolution checks run over
//! package-level constant declarations.

use std::collections::{HashMap, HashSet};

use super::syntax::{ConstGroup, DeclKind, Ident, Reference, SourceFile, TypeExpr};
use crate::common::is_blank;
use crate::error::{EnumstrError, EnumstrResult};

const UNIVERSE_TYPES: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
];

const UNIVERSE_VALUES: &[&str] = &["true", "false", "iota", "nil"];

const UNIVERSE_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// What a name in scope denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Type,
    Const,
    Var,
    Func,
}

impl From<DeclKind> for ObjectKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Type => ObjectKind::Type,
            DeclKind::Const => ObjectKind::Const,
            DeclKind::Var => ObjectKind::Var,
            DeclKind::Func => ObjectKind::Func,
        }
    }
}

/// Looks a name up in Go's predeclared universe.
pub fn universe_lookup(name: &str) -> Option<ObjectKind> {
    if UNIVERSE_TYPES.contains(&name) {
        Some(ObjectKind::Type)
    } else if UNIVERSE_VALUES.contains(&name) {
        Some(ObjectKind::Const)
    } else if UNIVERSE_FUNCS.contains(&name) {
        Some(ObjectKind::Func)
    } else {
        None
    }
}

/// Names declared at package level across every file of the package.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    objects: HashMap<String, ObjectKind>,
}

impl Scope {
    /// Builds the package scope, rejecting duplicate declarations.
    pub fn build(files: &[SourceFile]) -> EnumstrResult<Self> {
        let mut objects: HashMap<String, ObjectKind> = HashMap::new();
        for file in files {
            for decl in &file.decls {
                let name = decl.name.name.as_str();
                if is_blank(name) || (decl.kind == DeclKind::Func && name == "init") {
                    continue;
                }
                if objects.insert(name.to_string(), decl.kind.into()).is_some() {
                    return Err(EnumstrError::type_check_at(
                        &file.path,
                        format!("{} redeclared in this block", name),
                        decl.name.pos.line,
                        decl.name.pos.column,
                    ));
                }
            }
        }
        Ok(Self { objects })
    }

    /// Package-level lookup only.
    pub fn get(&self, name: &str) -> Option<ObjectKind> {
        self.objects.get(name).copied()
    }

    /// Package scope, then the universe.
    pub fn lookup(&self, name: &str) -> Option<ObjectKind> {
        self.get(name).or_else(|| universe_lookup(name))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Checks every package-level const group of `file` against the scope.
pub fn check_file(scope: &Scope, file: &SourceFile) -> EnumstrResult<()> {
    let checker = FileChecker::new(scope, file);
    for group in file.const_groups.iter().filter(|g| g.top_level) {
        checker.check_group(group)?;
    }
    Ok(())
}

struct FileChecker<'a> {
    scope: &'a Scope,
    file: &'a SourceFile,
    imports: HashSet<String>,
    has_dot_import: bool,
    /// An import whose package name is not known from its path.
    has_unknown_import: bool,
}

impl<'a> FileChecker<'a> {
    fn new(scope: &'a Scope, file: &'a SourceFile) -> Self {
        Self {
            scope,
            file,
            imports: file.imports.iter().filter_map(|i| i.local_name()).collect(),
            has_dot_import: file.imports.iter().any(|i| i.is_dot()),
            has_unknown_import: file.imports.iter().any(|i| i.has_unknown_name()),
        }
    }

    fn error(&self, at: &Ident, message: String) -> EnumstrError {
        EnumstrError::type_check_at(&self.file.path, message, at.pos.line, at.pos.column)
    }

    fn check_group(&self, group: &ConstGroup) -> EnumstrResult<()> {
        for (idx, spec) in group.specs.iter().enumerate() {
            if let Some(first) = spec.names.first() {
                if idx == 0 && spec.values.is_empty() {
                    return Err(self.error(first, "missing init expr for const declaration".to_string()));
                }
                if !spec.values.is_empty() && spec.values.len() < spec.names.len() {
                    return Err(self.error(first, "missing init expr for const declaration".to_string()));
                }
                if spec.values.len() > spec.names.len() {
                    return Err(self.error(first, "extra init expr".to_string()));
                }
            }
            if let Some(ty) = &spec.ty {
                self.check_type(ty)?;
            }
            for value in &spec.values {
                for reference in &value.refs {
                    self.check_reference(reference)?;
                }
            }
        }
        Ok(())
    }

    fn check_type(&self, ty: &TypeExpr) -> EnumstrResult<()> {
        for reference in ty.references() {
            self.check_reference(&reference)?;
        }
        Ok(())
    }

    fn check_reference(&self, reference: &Reference) -> EnumstrResult<()> {
        match reference {
            Reference::Value(id) => {
                if self.scope.lookup(&id.name).is_some()
                    || self.imports.contains(&id.name)
                    || self.has_dot_import
                    || self.has_unknown_import
                {
                    return Ok(());
                }
                Err(self.error(id, format!("undefined: {}", id.name)))
            }
            Reference::Type(id) => match self.scope.lookup(&id.name) {
                Some(ObjectKind::Type) => Ok(()),
                Some(_) => Err(self.error(id, format!("{} is not a type", id.name))),
                None if self.has_dot_import => Ok(()),
                None => Err(self.error(id, format!("undefined: {}", id.name))),
            },
            Reference::Package(id) => {
                if self.imports.contains(&id.name) || self.has_unknown_import {
                    Ok(())
                } else {
                    Err(self.error(id, format!("undefined: {}", id.name)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parser::GoParser;
    use std::path::PathBuf;

    fn lower(name: &str, source: &str) -> SourceFile {
        let path = PathBuf::from(name);
        let mut parser = GoParser::new().unwrap();
        let tree = parser.parse_file(&path, source).unwrap();
        SourceFile::lower(&path, tree.root_node(), source).unwrap()
    }

    fn check(source: &str) -> EnumstrResult<()> {
        let file = lower("a.go", source);
        let files = vec![file];
        let scope = Scope::build(&files)?;
        check_file(&scope, &files[0])
    }

    #[test]
    fn test_universe() {
        assert_eq!(universe_lookup("int"), Some(ObjectKind::Type));
        assert_eq!(universe_lookup("iota"), Some(ObjectKind::Const));
        assert_eq!(universe_lookup("len"), Some(ObjectKind::Func));
        assert_eq!(universe_lookup("Int"), None);
    }

    #[test]
    fn test_scope_across_files() {
        let files = vec![
            lower("a.go", "package p\n\ntype Color int\n"),
            lower("b.go", "package p\n\nconst Red Color = 1\n\nfunc init() {}\n"),
            lower("c.go", "package p\n\nfunc init() {}\n\nvar _ = 1\nvar _ = 2\n"),
        ];
        let scope = Scope::build(&files).unwrap();
        assert_eq!(scope.get("Color"), Some(ObjectKind::Type));
        assert_eq!(scope.get("Red"), Some(ObjectKind::Const));
        assert_eq!(scope.get("init"), None);
        assert_eq!(scope.len(), 2);
        assert!(check_file(&scope, &files[1]).is_ok());
    }

    #[test]
    fn test_redeclaration() {
        let files = vec![
            lower("a.go", "package p\n\ntype Color int\n"),
            lower("b.go", "package p\n\nvar Color = 1\n"),
        ];
        let err = Scope::build(&files).unwrap_err();
        match err {
            EnumstrError::TypeCheck { path, message, line, .. } => {
                assert_eq!(path, PathBuf::from("b.go"));
                assert_eq!(message, "Color redeclared in this block");
                assert_eq!(line, Some(3));
            }
            other => panic!("expected type check error, got {other:?}"),
        }
    }

    #[test]
    fn test_undefined_type() {
        let err = check("package p\n\nconst A Missing = 1\n").unwrap_err();
        assert!(err.to_string().contains("undefined: Missing"));
    }

    #[test]
    fn test_not_a_type() {
        let err = check("package p\n\nvar v = 1\n\nconst A v = 1\n").unwrap_err();
        assert!(err.to_string().contains("v is not a type"));
    }

    #[test]
    fn test_undefined_value() {
        let err = check("package p\n\ntype T int\n\nconst A = T(missing)\n").unwrap_err();
        assert!(matches!(err, EnumstrError::TypeCheck { line: Some(5), .. }));
    }

    #[test]
    fn test_imports_resolve() {
        assert!(check("package p\n\nimport \"math\"\n\nconst Big = math.MaxInt8\n").is_ok());
        let err = check("package p\n\nconst Big = math.MaxInt8\n").unwrap_err();
        assert!(err.to_string().contains("undefined: math"));
    }

    #[test]
    fn test_qualified_type() {
        assert!(check("package p\n\nimport \"time\"\n\nconst Tick time.Duration = 1\n").is_ok());
        assert!(check("package p\n\nconst Tick time.Duration = 1\n").is_err());
    }

    #[test]
    fn test_dot_import_skips_unqualified() {
        assert!(check("package p\n\nimport . \"math\"\n\nconst Big = MaxInt8\n").is_ok());
    }

    #[test]
    fn test_hyphenated_import_qualifier() {
        let src = "package p\n\nimport \"github.com/mattn/go-isatty\"\n\ntype Width int\n\nconst (\n\tNarrow Width = 1\n\tSize = isatty.Size\n)\n";
        assert!(check(src).is_ok());

        let typed = "package p\n\nimport \"example.com/go-units\"\n\nconst Limit units.Bytes = 1\n";
        assert!(check(typed).is_ok());

        let aliased = "package p\n\nimport tty \"github.com/mattn/go-isatty\"\n\nconst Size = isatty.Size\n";
        let err = check(aliased).unwrap_err();
        assert!(err.to_string().contains("undefined: isatty"));
    }

    #[test]
    fn test_init_expression_counts() {
        assert!(check("package p\n\nconst (\n\tA\n)\n").is_err());
        assert!(check("package p\n\nconst A, B = 1\n").is_err());
        assert!(check("package p\n\nconst A = 1, 2\n").is_err());
        assert!(check("package p\n\nconst (\n\tA = iota\n\tB\n)\n").is_ok());
    }

    #[test]
    fn test_function_local_groups_unchecked() {
        assert!(check("package p\n\nfunc f() {\n\tconst X = undefinedName\n\t_ = X\n}\n").is_ok());
    }
}
