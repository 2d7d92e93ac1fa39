use thiserror::Error;

pub type SamplerResult<T> = Result<T, SamplerError>;

/// Errors raised while configuring or running the sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    #[error("invalid sampler setting {field}: {message}")]
    InvalidSettings { field: &'static str, message: String },

    #[error("initial point has {actual} coordinates, density expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("chain {chain}: no finite log density after {attempts} jittered start points")]
    Initialization { chain: usize, attempts: usize },

    /// The engine gave up (unrecoverable log-density failure, bad initial gradient).
    #[error("chain {chain}: {message}")]
    Engine { chain: usize, message: String },

    #[error("chain {chain}: non-finite draw at iteration {iteration}")]
    NonFiniteDraw { chain: usize, iteration: usize },
}

impl SamplerError {
    pub(crate) fn engine(chain: usize, err: impl std::fmt::Display) -> Self {
        SamplerError::Engine {
            chain,
            message: err.to_string(),
        }
    }
}
