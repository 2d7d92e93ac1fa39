//! Posterior and posterior-predictive sampling for the regression model.

pub mod posterior;
pub mod predictive;
pub mod trace;

pub use posterior::{check_convergence, nuts_settings, resolve_seed, sample_posterior};
pub use predictive::sample_posterior_predictive;
pub use trace::{InferenceData, PosteriorGroup, PredictiveGroup};
