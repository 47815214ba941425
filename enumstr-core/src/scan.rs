//! Source unit selection for one Go package directory.
//!
//! Mirrors what `go build` would compile for the host:
//! - only `*.go` files directly inside the directory (no recursion)
//! - `_test.go` files and names starting with `_` or `.` are skipped
//! - `_GOOS` / `_GOARCH` file name suffixes must match the build context
//! - `//go:build` and `// +build` header constraints must hold
//!
//! Files are returned sorted by name so every later stage sees them in a
//! stable order.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::constraint::BuildContext;
use crate::error::{EnumstrError, EnumstrResult, IoResultExt};

/// One Go file selected for analysis, with its contents.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub source: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Checks the name-only exclusion rules.
fn is_candidate_name(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('_')
        && !name.starts_with('.')
}

/// Gathers the buildable Go files of `dir` under the given build context.
///
/// Fails with `NoSourceFiles` when nothing is left after filtering.
pub fn gather_go_files(dir: &Path, ctx: &BuildContext) -> EnumstrResult<Vec<SourceUnit>> {
    let mut units = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            match e.into_io_error() {
                Some(io) => EnumstrError::io(path, io),
                None => EnumstrError::Io {
                    path,
                    message: "directory walk failed".to_string(),
                    source: None,
                },
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_candidate_name(name) || !ctx.matches_file_name(name) {
            debug!(file = %name, "skipped by file name");
            continue;
        }

        let path = entry.path().to_path_buf();
        let source = fs::read_to_string(&path).with_path(&path)?;
        match ctx.matches_source(&source) {
            Ok(true) => units.push(SourceUnit::new(path, source)),
            Ok(false) => debug!(file = %name, "skipped by build constraint"),
            Err((line, message)) => return Err(EnumstrError::parse_at(path, message, line, 1)),
        }
    }

    if units.is_empty() {
        return Err(EnumstrError::NoSourceFiles {
            dir: dir.to_path_buf(),
        });
    }
    Ok(units)
}
