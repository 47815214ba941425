//! Output sink for generated source.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{EnumstrResult, IoResultExt};

/// Output name meaning standard output.
pub const STDOUT_NAME: &str = "-";

/// Where generated text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Resolves a user-supplied output name for the package in `dir`.
    ///
    /// `None` selects `<package>_string.go`, `-` selects standard output and
    /// relative paths are taken relative to `dir`.
    pub fn resolve(dir: &Path, package: &str, requested: Option<&str>) -> Self {
        match requested.map(str::trim) {
            Some(STDOUT_NAME) => Self::Stdout,
            Some(name) if !name.is_empty() => {
                let path = Path::new(name);
                if path.is_absolute() {
                    Self::File(path.to_path_buf())
                } else {
                    Self::File(dir.join(path))
                }
            }
            _ => Self::File(dir.join(default_file_name(package))),
        }
    }

    /// Writes the complete text in one go.
    pub fn write(&self, text: &str) -> EnumstrResult<()> {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(text.as_bytes()).with_path(STDOUT_NAME)?;
                lock.flush().with_path(STDOUT_NAME)
            }
            Self::File(path) => {
                fs::write(path, text).with_path(path)?;
                info!(event = "output_written", path = %path.display(), bytes = text.len());
                Ok(())
            }
        }
    }
}

/// Default output file name for a package.
pub fn default_file_name(package: &str) -> String {
    format!("{}_string.go", package)
}
