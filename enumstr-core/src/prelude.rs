//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use enumstr_core::prelude::*;
//! ```

// Errors
pub use crate::error::{EnumstrError, EnumstrResult};

// Builder API
pub use crate::builder::{Enumstr, Generation, RunState};

// Configuration
pub use crate::config::{load_config, EnumstrConfig};

// Pipeline stages
pub use crate::analysis::analyze_package;
pub use crate::constraint::BuildContext;
pub use crate::extract::{extract_constants, TypeRegistry};
pub use crate::generate::{generate_source, HandlebarsRenderer, Renderer};
pub use crate::output::OutputTarget;
pub use crate::scan::gather_go_files;
pub use crate::select::{select_types, InclusionFilter, Selection};
