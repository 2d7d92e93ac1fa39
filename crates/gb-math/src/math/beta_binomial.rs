//! Beta-Binomial distribution for bounded ordinal outcomes.
//!
//! An outcome `k ∈ {0..n}` is drawn as:
//! - `q ~ Beta(α, β)`
//! - `k | q ~ Binomial(n, q)`
//!
//! Marginally:
//!
//! P(k | n, α, β) = C(n, k) · B(α + k, β + n - k) / B(α, β)
//!
//! For an integer trial count the Beta-function ratio reduces to rising
//! factorials, which is exact and cheap:
//!
//! B(α + k, β + n - k) / B(α, β) = α^(k) · β^(n-k) / (α+β)^(n)
//!
//! The gradient with respect to (α, β) follows from the same form via
//! digamma differences, so likelihood gradients need no special functions.

use super::stable::{digamma_rising_diff, log_beta, log_binomial, log_gamma, log_rising_factorial};

fn valid_shape(alpha: f64, beta: f64) -> bool {
    alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0
}

/// Log probability mass of `k` successes out of `n` trials.
///
/// Returns NAN for invalid shape parameters (α ≤ 0, β ≤ 0, non-finite) and
/// NEG_INFINITY for `k > n`.
pub fn log_pmf(k: u64, n: u64, alpha: f64, beta: f64) -> f64 {
    if !valid_shape(alpha, beta) {
        return f64::NAN;
    }
    if k > n {
        return f64::NEG_INFINITY;
    }
    log_binomial(n, k) + log_rising_factorial(alpha, k) + log_rising_factorial(beta, n - k)
        - log_rising_factorial(alpha + beta, n)
}

/// Log probability mass supporting fractional counts.
///
/// Evaluated through log Beta functions; agrees with [`log_pmf`] for integer
/// arguments.
pub fn log_pmf_real(k: f64, n: f64, alpha: f64, beta: f64) -> f64 {
    if k.is_nan() || n.is_nan() || !valid_shape(alpha, beta) {
        return f64::NAN;
    }
    if k < 0.0 || n < 0.0 || k > n {
        return f64::NEG_INFINITY;
    }
    let log_binom = log_gamma(n + 1.0) - log_gamma(k + 1.0) - log_gamma(n - k + 1.0);
    log_binom + log_beta(alpha + k, beta + n - k) - log_beta(alpha, beta)
}

/// Gradient of [`log_pmf`] with respect to (α, β).
///
/// ∂/∂α = ψ(α+k) − ψ(α) − [ψ(α+β+n) − ψ(α+β)]
/// ∂/∂β = ψ(β+n−k) − ψ(β) − [ψ(α+β+n) − ψ(α+β)]
pub fn grad_log_pmf(k: u64, n: u64, alpha: f64, beta: f64) -> (f64, f64) {
    if !valid_shape(alpha, beta) || k > n {
        return (f64::NAN, f64::NAN);
    }
    let total = digamma_rising_diff(alpha + beta, n);
    let d_alpha = digamma_rising_diff(alpha, k) - total;
    let d_beta = digamma_rising_diff(beta, n - k) - total;
    (d_alpha, d_beta)
}

/// Probability mass for every outcome `0..=n`.
pub fn pmf_table(n: u64, alpha: f64, beta: f64) -> Vec<f64> {
    (0..=n).map(|k| log_pmf(k, n, alpha, beta).exp()).collect()
}

/// Mean: n · α / (α + β).
pub fn mean(n: u64, alpha: f64, beta: f64) -> f64 {
    if !valid_shape(alpha, beta) {
        return f64::NAN;
    }
    n as f64 * alpha / (alpha + beta)
}

/// Variance: n · αβ (α+β+n) / ((α+β)² (α+β+1)).
pub fn variance(n: u64, alpha: f64, beta: f64) -> f64 {
    if !valid_shape(alpha, beta) {
        return f64::NAN;
    }
    let sum = alpha + beta;
    let n = n as f64;
    n * alpha * beta * (sum + n) / (sum * sum * (sum + 1.0))
}
