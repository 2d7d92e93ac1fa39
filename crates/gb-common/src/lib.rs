//! Grade-bias common types.
//!
//! This crate provides the error taxonomy shared by every pipeline stage
//! along with the schema version stamped into written artifacts.

pub mod error;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};

/// Schema version for artifacts written by the pipeline.
pub const SCHEMA_VERSION: &str = "1.0.0";
