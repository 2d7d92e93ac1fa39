//! Mean/log-concentration reparameterization of the Beta distribution.
//!
//! With `n` trials, `mu` is the expected outcome on the `0..=n` scale and
//! `p` is half the log of the total concentration:
//!
//! ```text
//! alpha = mu · e^{2p} / n
//! beta  = e^{2p} − alpha
//! ```
//!
//! so `alpha + beta = e^{2p}` and `n · alpha / (alpha + beta) = mu`.
//! Nothing here clips: `mu ≤ 0` or `mu ≥ n` yields a non-positive shape.

use super::covariates::DESIGN_WIDTH;

/// Regression coefficients split by target, each `[intercept, author, reviewer, interaction]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub mu: [f64; DESIGN_WIDTH],
    pub p: [f64; DESIGN_WIDTH],
}

impl Coefficients {
    /// Split θ, stored interleaved as `mu_0, p_0, author_mu, author_p, ...`.
    pub fn from_theta(theta: &[f64]) -> Self {
        let mut mu = [0.0; DESIGN_WIDTH];
        let mut p = [0.0; DESIGN_WIDTH];
        for j in 0..DESIGN_WIDTH {
            mu[j] = theta[2 * j];
            p[j] = theta[2 * j + 1];
        }
        Self { mu, p }
    }

    /// `(mu, p)` for one design row.
    pub fn predict(&self, design: &[f64; DESIGN_WIDTH]) -> (f64, f64) {
        (dot(&self.mu, design), dot(&self.p, design))
    }
}

/// Index in θ of the `mu` coefficient for design column `j`.
pub fn mu_index(j: usize) -> usize {
    2 * j
}

/// Index in θ of the `p` coefficient for design column `j`.
pub fn p_index(j: usize) -> usize {
    2 * j + 1
}

fn dot(a: &[f64; DESIGN_WIDTH], b: &[f64; DESIGN_WIDTH]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Shape parameters from (mu, p).
pub fn to_alpha_beta(mu: f64, p: f64, trials: u64) -> (f64, f64) {
    let concentration = (2.0 * p).exp();
    let alpha = mu * concentration / trials as f64;
    (alpha, concentration - alpha)
}

/// Inverse of [`to_alpha_beta`] for positive shapes.
pub fn from_alpha_beta(alpha: f64, beta: f64, trials: u64) -> (f64, f64) {
    let concentration = alpha + beta;
    (trials as f64 * alpha / concentration, 0.5 * concentration.ln())
}

/// Both shapes finite and strictly positive.
pub fn is_valid_shape(alpha: f64, beta: f64) -> bool {
    alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0
}
