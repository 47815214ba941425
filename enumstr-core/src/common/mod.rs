//! Common utilities shared across the pipeline stages.

mod visibility;

pub use visibility::{is_blank, is_exported, BLANK};
