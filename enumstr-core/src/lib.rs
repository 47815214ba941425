//! enumstr-core: `String()` method generation for Go constant types
//!
//! This library analyzes the constant declarations of one Go package, works
//! out which named type every constant belongs to and generates a Go file
//! with a `String() string` method per selected type.
//!
//! # Features
//!
//! - **Source selection**: `go build` file rules, including build constraints
//! - **Package analysis**: tree-sitter Go parsing plus package-level name checks
//! - **Constant extraction**: carried types (`A T = iota; B; C`) and
//!   conversion initializers (`X = T(1)`)
//! - **Type selection**: exported types by default, or an explicit list
//! - **Code generation**: handlebars template followed by canonical layout
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use enumstr_core::prelude::*;
//!
//! let generation = Enumstr::new("/path/to/package").run()?;
//! println!("wrote {:?}", generation.target);
//! ```
//!
//! # Module Organization
//!
//! - [`scan`] / [`constraint`]: which files take part in the build
//! - [`analysis`]: parsing, lowering and name resolution
//! - [`extract`]: type attribution of constants
//! - [`select`]: inclusion filter and diagnostics
//! - [`generate`]: template rendering and canonical layout
//! - [`output`]: file or standard output sink
//! - [`builder`]: fluent builder API tying the stages together
//! - [`error`]: typed error handling

pub mod analysis;
pub mod builder;
pub mod common;
pub mod config;
pub mod constraint;
pub mod error;
pub mod extract;
pub mod generate;
pub mod logging;
pub mod output;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod select;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{EnumstrError, EnumstrResult, IoResultExt, Stage};

// Builder API
pub use builder::{Analysis, Enumstr, Generation, RunState, Selected};

// Configuration
pub use config::{load_config, split_list, EnumstrConfig, CONFIG_FILE};

// Logging
pub use logging::{init_structured_logging, log_failure, log_unsatisfied};

// File selection
pub use constraint::BuildContext;
pub use scan::{gather_go_files, SourceUnit};

// Analysis
pub use analysis::{analyze_package, Package};

// Extraction and selection
pub use extract::{extract_constants, retain_package_types, ResolvedConstant, TypeRegistry};
pub use select::{select_types, InclusionFilter, Selection};

// Generation and output
pub use generate::{
    build_model, format_source, generate_source, receiver_name, HandlebarsRenderer, RenderModel,
    Renderer, TypeModel,
};
pub use output::{default_file_name, OutputTarget};

// Reporting
pub use report::selection_json;
