//! Grade-bias core library
//!
//! Hierarchical Beta-Binomial regression of review grades on reviewer and
//! author gender:
//! - Loading and filtering the tab-separated review table
//! - The regression model and its log density
//! - Posterior and posterior-predictive sampling
//! - Summary statistics, convergence diagnostics and figures
//!
//! The binary entry point is in `main.rs`.

pub mod data;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod plot;
pub mod summary;

pub use pipeline::{run_pipeline, RunOutcome};
