//! Grade-bias run configuration.
//!
//! This crate provides:
//! - Typed serde structs for the model priors and every pipeline stage
//! - Semantic validation before any data is read
//! - Config snapshots written next to the results for reproducibility

pub mod model;
pub mod run;
pub mod snapshot;
pub mod validate;

pub use model::{ModelConfig, NormalPrior, RegressionPriors, MAX_TRIALS, PARAMETER_NAMES};
pub use run::{OutputConfig, PlotConfig, RunConfig, SamplingConfig, SummaryConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_run_config, ValidationError, ValidationResult};

/// Schema version for serialized configuration.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
