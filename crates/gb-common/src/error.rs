//! Error types for the grade-bias pipeline.
//!
//! Every stage of the run (load, model, sample, summarize, plot) reports
//! through the single [`Error`] enum, which carries:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - A short headline and remediation hint for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Grade Conversion Failed
//!   Reason: cannot convert value "B+" in column grades (data row 17) to an integer
//!   Fix: Every retained row needs a whole-number grade. Clean the input table and rerun.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 11,
//!   "category": "data",
//!   "message": "cannot convert value \"B+\" in column grades (data row 17) to an integer",
//!   "context": { "row": 17, "column": "grades" }
//! }
//! ```
//!
//! Every error is fatal to the run; none of them is retried.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for grade-bias operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input table problems (missing columns, unconvertible values).
    Data,
    /// Model construction problems detected before sampling.
    Model,
    /// Sampler initialization, convergence and numerical errors.
    Inference,
    /// Invalid run configuration.
    Config,
    /// File I/O, serialization and rendering errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the grade-bias pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // Data errors (10-19)
    #[error("required column '{column}' missing from {path}")]
    MissingColumn { column: String, path: String },

    #[error("cannot convert value {value:?} in column {column} (data row {row}) to an integer")]
    TypeConversion {
        row: usize,
        column: String,
        value: String,
    },

    #[error("failed to read table: {0}")]
    DataRead(String),

    // Model-definition errors (20-29)
    #[error("model definition failed: {0}")]
    ModelDefinition(String),

    #[error("covariate '{name}' has {actual} entries, expected {expected}")]
    CovariateShape {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("unknown category {value:?} in column {column} (data row {row})")]
    UnknownCategory {
        row: usize,
        column: String,
        value: String,
    },

    #[error("grade {grade} (data row {row}) is outside the supported range {min}..={max}")]
    GradeOutOfRange {
        row: usize,
        grade: i64,
        min: i64,
        max: i64,
    },

    #[error("no observations left after dropping incomplete rows")]
    EmptyDataset,

    // Inference errors (30-39)
    #[error("sampler could not initialize chain {chain}: {reason}")]
    SamplerInit { chain: usize, reason: String },

    #[error("chains failed to mix: r_hat for {parameter} is {r_hat:.3} (limit {threshold})")]
    ConvergenceFailure {
        parameter: String,
        r_hat: f64,
        threshold: f64,
    },

    #[error("sampling failed: {0}")]
    Sampling(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    #[error("posterior predictive sampling requires a fitted posterior with at least one draw")]
    PosteriorMissing,

    #[error("posterior predictive group already present")]
    PredictiveAlreadySampled,

    // Configuration errors (40-49)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    CsvWrite(String),

    #[error("rendering {figure} failed: {message}")]
    Plot { figure: String, message: String },
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Data errors
    /// - 20-29: Model-definition errors
    /// - 30-39: Inference errors
    /// - 40-49: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingColumn { .. } => 10,
            Error::TypeConversion { .. } => 11,
            Error::DataRead(_) => 12,
            Error::ModelDefinition(_) => 20,
            Error::CovariateShape { .. } => 21,
            Error::UnknownCategory { .. } => 22,
            Error::GradeOutOfRange { .. } => 23,
            Error::EmptyDataset => 24,
            Error::SamplerInit { .. } => 30,
            Error::ConvergenceFailure { .. } => 31,
            Error::Sampling(_) => 32,
            Error::NumericalInstability(_) => 33,
            Error::PosteriorMissing => 34,
            Error::PredictiveAlreadySampled => 35,
            Error::Config(_) => 40,
            Error::Io(_) => 60,
            Error::CsvWrite(_) => 62,
            Error::Plot { .. } => 63,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingColumn { .. } | Error::TypeConversion { .. } | Error::DataRead(_) => {
                ErrorCategory::Data
            }

            Error::ModelDefinition(_)
            | Error::CovariateShape { .. }
            | Error::UnknownCategory { .. }
            | Error::GradeOutOfRange { .. }
            | Error::EmptyDataset => ErrorCategory::Model,

            Error::SamplerInit { .. }
            | Error::ConvergenceFailure { .. }
            | Error::Sampling(_)
            | Error::NumericalInstability(_)
            | Error::PosteriorMissing
            | Error::PredictiveAlreadySampled => ErrorCategory::Inference,

            Error::Config(_) => ErrorCategory::Config,

            Error::Io(_) | Error::CsvWrite(_) | Error::Plot { .. } => {
                ErrorCategory::Io
            }
        }
    }

    /// Whether this error belongs to the convergence-failure class
    /// (the sampler started but could not produce trustworthy draws).
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            Error::SamplerInit { .. } | Error::ConvergenceFailure { .. }
        )
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MissingColumn { .. } => {
                "The input table needs rev_gender_updated, author_gender and grades columns (tab-separated, with a header row)."
            }
            Error::TypeConversion { .. } => {
                "Every retained row needs a whole-number grade. Clean the input table and rerun."
            }
            Error::DataRead(_) => {
                "Check that the input exists, is tab-separated, and every row has the same number of fields."
            }

            Error::ModelDefinition(_) | Error::CovariateShape { .. } => {
                "Internal model construction problem. Report it together with the input table."
            }
            Error::UnknownCategory { .. } => {
                "Gender columns must contain 'male' or 'female'. Recode or blank out other values."
            }
            Error::GradeOutOfRange { .. } => {
                "Grades must lie on the 1..6 scale. Fix or remove out-of-range rows."
            }
            Error::EmptyDataset => {
                "Every row was dropped for missing gender information. Check the gender columns."
            }

            Error::SamplerInit { .. } => {
                "The starting point has zero model probability. Retry with another --seed or check the grade data."
            }
            Error::ConvergenceFailure { .. } => {
                "Chains disagree. Increase --tune/--draws, or inspect the data for separation."
            }
            Error::Sampling(_) | Error::NumericalInstability(_) => {
                "The sampler hit an invalid parameter region. Retry with another --seed."
            }
            Error::PosteriorMissing | Error::PredictiveAlreadySampled => {
                "Pipeline stages ran out of order. This is a bug; please report it."
            }

            Error::Config(_) => "Check the command-line overrides; all values must be positive.",

            Error::Io(_) | Error::CsvWrite(_) => {
                "Check disk space and write permissions for the results and figures directories."
            }
            Error::Plot { .. } => {
                "Rendering needs a sans-serif system font. Install one (e.g. DejaVu) and rerun."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::MissingColumn { .. } => "Missing Column",
            Error::TypeConversion { .. } => "Grade Conversion Failed",
            Error::DataRead(_) => "Input Table Unreadable",

            Error::ModelDefinition(_) => "Model Definition Error",
            Error::CovariateShape { .. } => "Malformed Covariates",
            Error::UnknownCategory { .. } => "Unknown Category",
            Error::GradeOutOfRange { .. } => "Grade Out Of Range",
            Error::EmptyDataset => "Empty Dataset",

            Error::SamplerInit { .. } => "Sampler Initialization Failed",
            Error::ConvergenceFailure { .. } => "Convergence Failure",
            Error::Sampling(_) => "Sampling Error",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::PosteriorMissing => "Posterior Not Fitted",
            Error::PredictiveAlreadySampled => "Posterior Predictive Already Sampled",

            Error::Config(_) => "Configuration Error",

            Error::Io(_) => "I/O Error",
            Error::CsvWrite(_) => "Summary Write Failed",
            Error::Plot { .. } => "Figure Rendering Failed",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Additional structured context (e.g., row, column).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MissingColumn { column, path } => {
                context.insert("column".to_string(), serde_json::json!(column));
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::TypeConversion { row, column, .. } | Error::UnknownCategory { row, column, .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::GradeOutOfRange { row, grade, .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
                context.insert("grade".to_string(), serde_json::json!(grade));
            }
            Error::SamplerInit { chain, .. } => {
                context.insert("chain".to_string(), serde_json::json!(chain));
            }
            Error::ConvergenceFailure {
                parameter, r_hat, ..
            } => {
                context.insert("parameter".to_string(), serde_json::json!(parameter));
                context.insert("r_hat".to_string(), serde_json::json!(r_hat));
            }
            Error::Plot { figure, .. } => {
                context.insert("figure".to_string(), serde_json::json!(figure));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
