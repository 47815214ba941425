//! Source analysis: parse the files of one Go package and resolve the names
//! their constant declarations use.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  parser.rs   │──▶│  syntax.rs   │──▶│   scope.rs   │
//! │  tree-sitter │   │  tagged      │   │  package     │
//! │  Go grammar  │   │  decl model  │   │  scope+check │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! The result is a [`Package`]: every file lowered into the tagged model plus
//! the package scope. tree-sitter nodes never leave this module.

pub mod parser;
pub mod scope;
pub mod syntax;

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EnumstrError, EnumstrResult};
use crate::scan::SourceUnit;

pub use parser::{GoParser, SyntaxError};
pub use scope::{universe_lookup, ObjectKind, Scope};
pub use syntax::{
    ConstGroup, ConstSpec, Decl, DeclKind, Expr, ExprKind, Ident, Import, Position, Reference,
    SourceFile, TypeExpr,
};

/// Package name of executables.
const MAIN_PACKAGE: &str = "main";

/// A type-resolved Go package.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
    pub scope: Scope,
}

impl Package {
    /// Reports whether `name`, seen from `file`, denotes a type.
    ///
    /// Function-local types of the same file count too, so conversions in
    /// function-local const groups resolve.
    pub fn is_type_name(&self, file: &SourceFile, name: &str) -> bool {
        match self.scope.lookup(name) {
            Some(ObjectKind::Type) => true,
            Some(_) => false,
            None => file.local_types.iter().any(|t| t.name == name),
        }
    }
}

/// Parses and checks the source units of the package in `dir`.
///
/// Fails with `Parse` on malformed syntax, `PackageName` for package `main`
/// and `TypeCheck` when the files disagree on the package name or the
/// constant declarations reference something that does not resolve.
pub fn analyze_package(dir: &Path, units: &[SourceUnit]) -> EnumstrResult<Package> {
    let mut parser = GoParser::new()?;
    let mut files = Vec::with_capacity(units.len());

    for unit in units {
        let tree = parser.parse_file(&unit.path, &unit.source)?;
        let file = SourceFile::lower(&unit.path, tree.root_node(), &unit.source)
            .ok_or_else(|| EnumstrError::parse(&unit.path, "expected package clause"))?;
        debug!(
            file = %unit.path.display(),
            const_groups = file.const_groups.len(),
            "parsed source unit"
        );
        files.push(file);
    }

    let Some(first) = files.first() else {
        return Err(EnumstrError::NoSourceFiles {
            dir: dir.to_path_buf(),
        });
    };
    let name = first.package.name.clone();

    if let Some(other) = files.iter().find(|f| f.package.name != name) {
        return Err(EnumstrError::type_check(
            dir,
            format!(
                "found packages {} ({}) and {} ({})",
                name,
                file_name(&first.path),
                other.package.name,
                file_name(&other.path)
            ),
        ));
    }

    if name == MAIN_PACKAGE {
        return Err(EnumstrError::PackageName {
            package: name,
            dir: dir.to_path_buf(),
        });
    }

    let scope = Scope::build(&files)?;
    for file in &files {
        scope::check_file(&scope, file)?;
    }

    Ok(Package {
        name,
        dir: dir.to_path_buf(),
        files,
        scope,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
