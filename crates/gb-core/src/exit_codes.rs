//! Exit codes for the gb-core CLI.
//!
//! Exit code ranges:
//! - 0: Success (summary and figures written)
//! - 2: Invalid arguments (clap's own code)
//! - 10-19: Input/model/inference errors (recoverable by fixing data or settings)
//! - 20-29: I/O and internal errors

use gb_common::{Error, ErrorCategory};

/// Process exit codes for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Pipeline ran to completion.
    Success = 0,

    /// Invalid arguments
    ArgsError = 2,

    // ========================================================================
    // User / Data Errors (10-19)
    // ========================================================================
    /// Input table missing, unreadable or unconvertible
    DataError = 10,

    /// Data rejected at model construction
    ModelError = 11,

    /// Sampler failed to initialize or chains did not converge
    ConvergenceFailure = 12,

    /// Other sampling or predictive failures
    InferenceError = 13,

    /// Invalid configuration file or overrides
    ConfigError = 14,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Writing results or figures failed
    IoError = 20,

    /// Internal error (bug - please report)
    InternalError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }

    /// Check if this exit code is a user/data error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Success => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::DataError => "ERR_DATA",
            ExitCode::ModelError => "ERR_MODEL",
            ExitCode::ConvergenceFailure => "ERR_CONVERGENCE",
            ExitCode::InferenceError => "ERR_INFERENCE",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::IoError => "ERR_IO",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }

    /// Exit code for a pipeline error.
    pub fn for_error(err: &Error) -> Self {
        if err.is_convergence_failure() {
            return ExitCode::ConvergenceFailure;
        }
        match err {
            // Out-of-order stages are bugs.
            Error::PosteriorMissing | Error::PredictiveAlreadySampled => ExitCode::InternalError,
            Error::ModelDefinition(_) | Error::CovariateShape { .. } => ExitCode::InternalError,
            _ => match err.category() {
                ErrorCategory::Data => ExitCode::DataError,
                ErrorCategory::Model => ExitCode::ModelError,
                ErrorCategory::Inference => ExitCode::InferenceError,
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        ExitCode::for_error(err)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::ArgsError.as_i32(), 2);
        assert_eq!(ExitCode::DataError.as_i32(), 10);
        assert_eq!(ExitCode::ConvergenceFailure.as_i32(), 12);
        assert_eq!(ExitCode::IoError.as_i32(), 20);
    }

    #[test]
    fn test_user_error_range() {
        assert!(ExitCode::DataError.is_user_error());
        assert!(ExitCode::ConfigError.is_user_error());
        assert!(!ExitCode::IoError.is_user_error());
        assert!(!ExitCode::Success.is_user_error());
        assert!(ExitCode::Success.is_success());
    }

    #[test]
    fn errors_map_to_categories() {
        let conversion = Error::TypeConversion {
            row: 3,
            column: "grades".into(),
            value: "x".into(),
        };
        assert_eq!(ExitCode::for_error(&conversion), ExitCode::DataError);
        assert_eq!(ExitCode::for_error(&Error::EmptyDataset), ExitCode::ModelError);
        assert_eq!(
            ExitCode::for_error(&Error::SamplerInit {
                chain: 0,
                reason: "x".into()
            }),
            ExitCode::ConvergenceFailure
        );
        assert_eq!(
            ExitCode::for_error(&Error::Sampling("x".into())),
            ExitCode::InferenceError
        );
        assert_eq!(
            ExitCode::for_error(&Error::PosteriorMissing),
            ExitCode::InternalError
        );
        assert_eq!(
            ExitCode::for_error(&Error::Config("x".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::for_error(&Error::CsvWrite("x".into())),
            ExitCode::IoError
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::ModelError.to_string(), "ERR_MODEL (11)");
    }
}
