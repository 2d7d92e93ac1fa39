//! Numerically stable primitives for log-domain Bayesian math.

use std::f64::consts::PI;

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)
const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)] // These are published numerical constants
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the Gamma function (log |Gamma(z)|).
///
/// Uses a Lanczos approximation with reflection for z < 0.5.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }
    if z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z <= 0.0 {
        let z_round = z.round();
        if (z - z_round).abs() < 1e-15 {
            return f64::NAN;
        }
    }
    if z < 0.5 {
        let sin_pi = (PI * z).sin();
        if sin_pi == 0.0 {
            return f64::NAN;
        }
        return PI.ln() - sin_pi.abs().ln() - log_gamma(1.0 - z);
    }

    let z_minus = z - 1.0;
    let mut x = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        x += coeff / (z_minus + i as f64);
    }
    let t = z_minus + LANCZOS_G + 0.5;
    LOG_SQRT_2PI + (z_minus + 0.5) * t.ln() - t + x.ln()
}

/// log Beta(a, b) = log Gamma(a) + log Gamma(b) - log Gamma(a+b).
pub fn log_beta(a: f64, b: f64) -> f64 {
    log_gamma(a) + log_gamma(b) - log_gamma(a + b)
}

/// log(n!) using the Gamma function.
pub fn log_factorial(n: u64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    log_gamma((n as f64) + 1.0)
}

/// log binomial coefficient: log(n choose k).
pub fn log_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    log_factorial(n) - log_factorial(k) - log_factorial(n - k)
}

/// log of the rising factorial x^(k) = x (x+1) ... (x+k-1) = Gamma(x+k) / Gamma(x).
///
/// Exact for integer `k`; requires x > 0. Returns NAN otherwise.
pub fn log_rising_factorial(x: f64, k: u64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    (0..k).map(|j| (x + j as f64).ln()).sum()
}

/// digamma(x + k) - digamma(x) = sum_{j<k} 1/(x+j).
///
/// The derivative of [`log_rising_factorial`] with respect to x.
pub fn digamma_rising_diff(x: f64, k: u64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    (0..k).map(|j| 1.0 / (x + j as f64)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn log_gamma_known_values() {
        assert!(approx_eq(log_gamma(1.0), 0.0, 1e-12));
        assert!(approx_eq(log_gamma(0.5), 0.5 * PI.ln(), 1e-10));
        assert!(approx_eq(log_gamma(5.0), 24.0f64.ln(), 1e-10));
    }

    #[test]
    fn log_gamma_negative_integer_is_nan() {
        assert!(log_gamma(-2.0).is_nan());
    }

    #[test]
    fn log_beta_factorial_binomial() {
        assert!(approx_eq(log_beta(1.0, 1.0), 0.0, 1e-12));
        assert!(approx_eq(log_factorial(5), 120.0f64.ln(), 1e-12));
        assert!(approx_eq(log_binomial(5, 2), 10.0f64.ln(), 1e-12));
        assert!(log_binomial(2, 5).is_infinite());
    }

    #[test]
    fn rising_factorial_matches_gamma_ratio() {
        for &x in &[0.3, 1.0, 2.5, 17.0] {
            for k in 0..6u64 {
                let direct = log_rising_factorial(x, k);
                let via_gamma = log_gamma(x + k as f64) - log_gamma(x);
                assert!(approx_eq(direct, via_gamma, 1e-9), "x={x} k={k}");
            }
        }
    }

    #[test]
    fn rising_factorial_rejects_nonpositive() {
        assert!(log_rising_factorial(0.0, 2).is_nan());
        assert!(digamma_rising_diff(-1.0, 2).is_nan());
    }

    #[test]
    fn digamma_diff_is_derivative_of_rising_factorial() {
        let x = 1.7;
        let k = 4;
        let h = 1e-6;
        let numeric = (log_rising_factorial(x + h, k) - log_rising_factorial(x - h, k)) / (2.0 * h);
        assert!(approx_eq(digamma_rising_diff(x, k), numeric, 1e-6));
    }
}
