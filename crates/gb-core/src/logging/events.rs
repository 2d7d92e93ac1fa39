//! Structured event vocabulary for logging.
//!
//! Every event carries the run correlation ID and the pipeline stage it
//! belongs to; the event name is the tracing target.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of the regression pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading and filtering the input table.
    Load,
    /// Covariate encoding and model construction.
    Model,
    /// Posterior sampling.
    Sample,
    /// Posterior-predictive sampling.
    Predict,
    /// Diagnostics and the summary table.
    Summarize,
    /// Figure rendering.
    Plot,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Model => "model",
            Stage::Sample => "sample",
            Stage::Predict => "predict",
            Stage::Summarize => "summarize",
            Stage::Plot => "plot",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Configuration
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_SNAPSHOT_WRITTEN: &str = "config.snapshot_written";

    // Loading
    pub const LOAD_FINISHED: &str = "load.finished";
    pub const LOAD_ROWS_DROPPED: &str = "load.rows_dropped";

    // Model
    pub const MODEL_BUILT: &str = "model.built";

    // Sampling
    pub const SAMPLE_STARTED: &str = "sample.started";
    pub const SAMPLE_SEED_DRAWN: &str = "sample.seed_drawn";
    pub const SAMPLE_CHAIN_FINISHED: &str = "sample.chain_finished";
    pub const SAMPLE_DIVERGENCES: &str = "sample.divergences";
    pub const SAMPLE_RHAT_WARNING: &str = "sample.rhat_warning";
    pub const SAMPLE_FINISHED: &str = "sample.finished";

    // Posterior predictive
    pub const PREDICT_FINISHED: &str = "predict.finished";

    // Outputs
    pub const SUMMARY_WRITTEN: &str = "summarize.written";
    pub const PLOT_WRITTEN: &str = "plot.written";
}

/// Correlation IDs attached to every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
    /// Host identifier.
    pub host_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            host_id: host_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in [
            Stage::Init,
            Stage::Load,
            Stage::Model,
            Stage::Sample,
            Stage::Predict,
            Stage::Summarize,
            Stage::Plot,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn test_event_names_are_stage_prefixed() {
        assert!(event_names::LOAD_FINISHED.starts_with("load."));
        assert!(event_names::SAMPLE_CHAIN_FINISHED.starts_with("sample."));
        assert!(event_names::SUMMARY_WRITTEN.starts_with("summarize."));
        assert_eq!(event_names::RUN_STARTED, "run.started");
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(Level::from(tracing::Level::INFO), Level::Info);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
    }
}
