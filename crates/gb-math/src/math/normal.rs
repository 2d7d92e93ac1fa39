//! Normal distribution helpers for regression-coefficient priors and
//! rank-normalized diagnostics.

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

// Acklam's rational approximation to the standard normal quantile.
const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const ACKLAM_P_LOW: f64 = 0.024_25;

/// Log density of N(mu, sigma²) at x. `sigma` is the standard deviation.
pub fn log_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if x.is_nan() || mu.is_nan() || sigma.is_nan() || sigma <= 0.0 {
        return f64::NAN;
    }
    let z = (x - mu) / sigma;
    -0.5 * z * z - sigma.ln() - LOG_SQRT_2PI
}

/// d/dx of [`log_pdf`]: -(x - mu) / sigma².
pub fn grad_log_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return f64::NAN;
    }
    -(x - mu) / (sigma * sigma)
}

/// Standard normal quantile function (probit).
///
/// Relative error below 1.2e-9 over (0, 1). Returns ±inf at the endpoints
/// and NAN outside [0, 1].
pub fn inv_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let a = &ACKLAM_A;
    let b = &ACKLAM_B;
    let c = &ACKLAM_C;
    let d = &ACKLAM_D;

    if p < ACKLAM_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= 1.0 - ACKLAM_P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
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
    fn log_pdf_at_mode() {
        let lp = log_pdf(2.5, 2.5, 0.2);
        assert!(approx_eq(lp, -(0.2f64.ln()) - LOG_SQRT_2PI, 1e-12));
    }

    #[test]
    fn log_pdf_rejects_bad_scale() {
        assert!(log_pdf(0.0, 0.0, 0.0).is_nan());
        assert!(log_pdf(0.0, 0.0, -1.0).is_nan());
    }

    #[test]
    fn grad_matches_finite_difference() {
        let h = 1e-6;
        let numeric = (log_pdf(0.31 + h, 0.0, 0.2) - log_pdf(0.31 - h, 0.0, 0.2)) / (2.0 * h);
        assert!(approx_eq(grad_log_pdf(0.31, 0.0, 0.2), numeric, 1e-5));
    }

    #[test]
    fn inv_cdf_known_quantiles() {
        assert!(approx_eq(inv_cdf(0.5), 0.0, 1e-9));
        assert!(approx_eq(inv_cdf(0.975), 1.959_963_984_540_054, 1e-8));
        assert!(approx_eq(inv_cdf(0.025), -1.959_963_984_540_054, 1e-8));
        assert!(approx_eq(inv_cdf(0.001), -3.090_232_306_167_813_5, 1e-7));
    }

    #[test]
    fn inv_cdf_edges() {
        assert!(inv_cdf(0.0).is_infinite() && inv_cdf(0.0).is_sign_negative());
        assert!(inv_cdf(1.0).is_infinite() && inv_cdf(1.0).is_sign_positive());
        assert!(inv_cdf(1.5).is_nan());
    }
}
