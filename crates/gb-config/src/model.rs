//! Model hyperparameters: trial count, grade offset and coefficient priors.

use serde::{Deserialize, Serialize};

/// Declared scalar parameters, in the order used by every table and plot.
pub const PARAMETER_NAMES: [&str; 8] = [
    "mu_0",
    "p_0",
    "author_mu",
    "author_p",
    "reviewer_mu",
    "reviewer_p",
    "interaction_mu",
    "interaction_p",
];

/// Largest accepted trial count; outcome tables are sized `trials + 1`.
pub const MAX_TRIALS: u64 = 1000;

/// Normal distribution parameters: N(mu, sigma²), sigma is the standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPrior {
    pub mu: f64,
    pub sigma: f64,
}

impl NormalPrior {
    pub const fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }
}

/// Independent Normal priors for the regression coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionPriors {
    pub mu_0: NormalPrior,
    pub p_0: NormalPrior,
    pub author_mu: NormalPrior,
    pub author_p: NormalPrior,
    pub reviewer_mu: NormalPrior,
    pub reviewer_p: NormalPrior,
    pub interaction_mu: NormalPrior,
    pub interaction_p: NormalPrior,
}

impl Default for RegressionPriors {
    fn default() -> Self {
        let effect = NormalPrior::new(0.0, 0.2);
        Self {
            mu_0: NormalPrior::new(2.5, 0.2),
            p_0: effect,
            author_mu: effect,
            author_p: effect,
            reviewer_mu: effect,
            reviewer_p: effect,
            interaction_mu: effect,
            interaction_p: effect,
        }
    }
}

impl RegressionPriors {
    /// Priors paired with their parameter names, in declaration order.
    pub fn in_order(&self) -> [(&'static str, NormalPrior); 8] {
        [
            (PARAMETER_NAMES[0], self.mu_0),
            (PARAMETER_NAMES[1], self.p_0),
            (PARAMETER_NAMES[2], self.author_mu),
            (PARAMETER_NAMES[3], self.author_p),
            (PARAMETER_NAMES[4], self.reviewer_mu),
            (PARAMETER_NAMES[5], self.reviewer_p),
            (PARAMETER_NAMES[6], self.interaction_mu),
            (PARAMETER_NAMES[7], self.interaction_p),
        ]
    }
}

/// Likelihood and prior settings for the Beta-Binomial regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Binomial trials; outcomes live in `0..=trials`.
    pub trials: u64,

    /// Subtracted from raw grades to obtain zero-based outcomes.
    pub grade_offset: i64,

    pub priors: RegressionPriors,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            trials: 5,
            grade_offset: 1,
            priors: RegressionPriors::default(),
        }
    }
}

impl ModelConfig {
    /// Highest raw grade, or `None` when `grade_offset + trials` overflows.
    pub fn max_grade(&self) -> Option<i64> {
        i64::try_from(self.trials)
            .ok()
            .and_then(|trials| self.grade_offset.checked_add(trials))
    }

    /// Inclusive raw-grade range accepted by the model. Saturates at
    /// `i64::MAX` for configurations validation would reject.
    pub fn grade_range(&self) -> (i64, i64) {
        (self.grade_offset, self.max_grade().unwrap_or(i64::MAX))
    }
}
