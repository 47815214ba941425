//! Typed error handling for enumstr.
//!
//! Every failure of a generation run is fatal and carries enough context
//! (path, position, stage) for the CLI to print a useful message.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyzing,
    Extracting,
    Selecting,
    Rendering,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Analyzing => "analyzing",
            Self::Extracting => "extracting",
            Self::Selecting => "selecting",
            Self::Rendering => "rendering",
            Self::Writing => "writing",
        };
        f.write_str(name)
    }
}

/// Main error type for enumstr operations.
#[derive(Error, Debug)]
pub enum EnumstrError {
    /// I/O error when reading sources or writing the output
    #[error("I/O error at {}: {message}", path.display())]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed Go syntax
    #[error("{}", located(path, *line, *column, message))]
    Parse {
        path: PathBuf,
        message: String,
        /// Line number (1-indexed) if available
        line: Option<usize>,
        /// Column number (1-indexed) if available
        column: Option<usize>,
    },

    /// Names or types that cannot be resolved across the package
    #[error("{}", located(path, *line, *column, message))]
    TypeCheck {
        path: PathBuf,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// The package is an executable entry point
    #[error("Refuse to process package \"{package}\" in {}", dir.display())]
    PackageName { package: String, dir: PathBuf },

    /// No buildable Go file in the directory
    #[error("no buildable Go source files in {}", dir.display())]
    NoSourceFiles { dir: PathBuf },

    /// Malformed enumstr.toml
    #[error("Config error at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Template registration or expansion failed
    #[error("render error: {message}")]
    Render { message: String },

    /// Rendered text is not valid Go
    #[error("format error at {line}:{column}: {message}")]
    Format {
        message: String,
        line: usize,
        column: usize,
    },
}

fn located(path: &std::path::Path, line: Option<usize>, column: Option<usize>, message: &str) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!("{}:{}:{}: {}", path.display(), l, c, message),
        (Some(l), None) => format!("{}:{}: {}", path.display(), l, message),
        _ => format!("{}: {}", path.display(), message),
    }
}

impl EnumstrError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error without position.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a parse error with line/column info.
    pub fn parse_at(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a type checking error without position.
    pub fn type_check(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TypeCheck {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a type checking error with line/column info.
    pub fn type_check_at(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::TypeCheck {
            path: path.into(),
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// The pipeline stage that produces this kind of error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Parse { .. }
            | Self::TypeCheck { .. }
            | Self::PackageName { .. }
            | Self::NoSourceFiles { .. }
            | Self::Config { .. } => Stage::Analyzing,
            Self::Render { .. } | Self::Format { .. } => Stage::Rendering,
            Self::Io { .. } => Stage::Writing,
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Parse { path, .. } => Some(path),
            Self::TypeCheck { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::PackageName { dir, .. } | Self::NoSourceFiles { dir } => Some(dir),
            Self::Render { .. } | Self::Format { .. } => None,
        }
    }
}

/// Convenience type alias for enumstr results.
pub type EnumstrResult<T> = Result<T, EnumstrError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> EnumstrResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> EnumstrResult<T> {
        self.map_err(|e| EnumstrError::io(path, e))
    }
}
