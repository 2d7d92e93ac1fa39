//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::model::{ModelConfig, NormalPrior, MAX_TRIALS};
use crate::run::{PlotConfig, RunConfig, SamplingConfig, SummaryConfig};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 40,
            ValidationError::ParseError(_) => 41,
            ValidationError::SemanticError(_) => 42,
            ValidationError::InvalidValue { .. } => 43,
        }
    }
}

fn invalid(field: impl Into<String>, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message,
    }
}

/// Validate a complete run configuration before the pipeline starts.
pub fn validate_run_config(config: &RunConfig) -> ValidationResult<()> {
    validate_model(&config.model)?;
    validate_sampling(&config.sampling)?;
    validate_summary(&config.summary)?;
    validate_plot(&config.plot)?;
    Ok(())
}

fn validate_model(model: &ModelConfig) -> ValidationResult<()> {
    if !(1..=MAX_TRIALS).contains(&model.trials) {
        return Err(invalid(
            "model.trials",
            format!("Must be in [1, {MAX_TRIALS}], got {}", model.trials),
        ));
    }
    if model.max_grade().is_none() {
        return Err(invalid(
            "model.grade_offset",
            format!(
                "grade_offset + trials overflows ({} + {})",
                model.grade_offset, model.trials
            ),
        ));
    }
    for (name, prior) in model.priors.in_order() {
        validate_normal_prior(&format!("model.priors.{name}"), &prior)?;
    }
    Ok(())
}

/// Validate Normal prior parameters.
fn validate_normal_prior(field: &str, prior: &NormalPrior) -> ValidationResult<()> {
    if !prior.mu.is_finite() {
        return Err(invalid(
            format!("{field}.mu"),
            format!("Must be finite, got {}", prior.mu),
        ));
    }
    if !(prior.sigma.is_finite() && prior.sigma > 0.0) {
        return Err(invalid(
            format!("{field}.sigma"),
            format!("Must be positive, got {}", prior.sigma),
        ));
    }
    Ok(())
}

fn validate_sampling(sampling: &SamplingConfig) -> ValidationResult<()> {
    if sampling.chains == 0 {
        return Err(invalid("sampling.chains", "Must be at least 1".to_string()));
    }
    if sampling.draws < 4 {
        return Err(invalid(
            "sampling.draws",
            format!("Need at least 4 draws per chain for split diagnostics, got {}", sampling.draws),
        ));
    }
    if !(sampling.target_accept > 0.0 && sampling.target_accept < 1.0) {
        return Err(invalid(
            "sampling.target_accept",
            format!("Must be in (0, 1), got {}", sampling.target_accept),
        ));
    }
    if !(1..=20).contains(&sampling.max_tree_depth) {
        return Err(invalid(
            "sampling.max_tree_depth",
            format!("Must be in [1, 20], got {}", sampling.max_tree_depth),
        ));
    }
    if !(sampling.max_energy_error > 0.0) {
        return Err(invalid(
            "sampling.max_energy_error",
            format!("Must be positive, got {}", sampling.max_energy_error),
        ));
    }
    if !(sampling.init_jitter.is_finite() && sampling.init_jitter >= 0.0) {
        return Err(invalid(
            "sampling.init_jitter",
            format!("Must be non-negative, got {}", sampling.init_jitter),
        ));
    }
    if sampling.jitter_max_retries == 0 {
        return Err(invalid(
            "sampling.jitter_max_retries",
            "Must be at least 1".to_string(),
        ));
    }
    if !(sampling.rhat_warn_threshold >= 1.0) {
        return Err(invalid(
            "sampling.rhat_warn_threshold",
            format!("Must be at least 1, got {}", sampling.rhat_warn_threshold),
        ));
    }
    if sampling.rhat_fail_threshold < sampling.rhat_warn_threshold {
        return Err(ValidationError::SemanticError(format!(
            "rhat_fail_threshold ({}) is below rhat_warn_threshold ({})",
            sampling.rhat_fail_threshold, sampling.rhat_warn_threshold
        )));
    }
    Ok(())
}

fn validate_summary(summary: &SummaryConfig) -> ValidationResult<()> {
    if !(summary.hdi_prob > 0.0 && summary.hdi_prob < 1.0) {
        return Err(invalid(
            "summary.hdi_prob",
            format!("Must be in (0, 1), got {}", summary.hdi_prob),
        ));
    }
    if summary.round_to > 12 {
        return Err(invalid(
            "summary.round_to",
            format!("Must be at most 12, got {}", summary.round_to),
        ));
    }
    Ok(())
}

fn validate_plot(plot: &PlotConfig) -> ValidationResult<()> {
    if !(72..=1200).contains(&plot.dpi) {
        return Err(invalid(
            "plot.dpi",
            format!("Must be in [72, 1200], got {}", plot.dpi),
        ));
    }
    if !(plot.width_in.is_finite() && plot.width_in > 0.0) {
        return Err(invalid(
            "plot.width_in",
            format!("Must be positive, got {}", plot.width_in),
        ));
    }
    if !(plot.font_pt.is_finite() && plot.font_pt > 0.0) {
        return Err(invalid(
            "plot.font_pt",
            format!("Must be positive, got {}", plot.font_pt),
        ));
    }
    Ok(())
}
