//! MCMC diagnostics over multi-chain traces.
//!
//! Inputs are `&[Vec<f64>]`, one trace per chain, all the same length.
//!
//! - Split chains: each chain halves into two (an odd middle draw is dropped)
//! - Rank normalization: pooled average ranks `r`, mapped through
//!   `Φ⁻¹((r − 3/8) / (N + 1/4))`
//! - ESS: Geyer's initial positive sequence on the multi-chain
//!   autocorrelation, then the initial monotone sequence
//! - R-hat: max of rank-normalized bulk and folded (tail) split R-hat
//!
//! Anything undefined (fewer than 4 draws, zero variance) is NAN.

use gb_math::describe::{average_ranks, mean, median, quantile, std_dev, variance};
use gb_math::normal;

const MIN_DRAWS: usize = 4;

fn n_draws(chains: &[Vec<f64>]) -> usize {
    chains.first().map_or(0, |c| c.len())
}

fn well_formed(chains: &[Vec<f64>]) -> bool {
    let n = n_draws(chains);
    !chains.is_empty()
        && n >= MIN_DRAWS
        && chains.iter().all(|c| c.len() == n)
        && chains.iter().flatten().all(|x| x.is_finite())
}

/// Each chain cut into two halves of `floor(n / 2)` draws.
pub fn split_chains(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(chains.len() * 2);
    for chain in chains {
        let half = chain.len() / 2;
        out.push(chain[..half].to_vec());
        out.push(chain[chain.len() - half..].to_vec());
    }
    out
}

/// Rank-normalize pooled draws, keeping the chain layout.
pub fn z_scale(chains: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let size = pooled.len() as f64;
    let ranks = average_ranks(&pooled);
    let mut z = ranks
        .into_iter()
        .map(|r| normal::inv_cdf((r - 0.375) / (size + 0.25)));
    chains
        .iter()
        .map(|c| c.iter().map(|_| z.next().unwrap_or(f64::NAN)).collect())
        .collect()
}

/// Biased autocovariance of one chain at every lag.
fn autocovariance(chain: &[f64]) -> Vec<f64> {
    let n = chain.len();
    let m = mean(chain);
    let centered: Vec<f64> = chain.iter().map(|x| x - m).collect();
    (0..n)
        .map(|lag| {
            centered[..n - lag]
                .iter()
                .zip(&centered[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

/// Effective sample size of the given chains (no splitting or ranking).
pub fn ess_raw(chains: &[Vec<f64>]) -> f64 {
    if !well_formed(chains) {
        return f64::NAN;
    }
    let n_chain = chains.len() as f64;
    let n = n_draws(chains);
    let n_f = n as f64;

    let acov: Vec<Vec<f64>> = chains.iter().map(|c| autocovariance(c)).collect();
    let mean_acov = |lag: usize| acov.iter().map(|a| a[lag]).sum::<f64>() / n_chain;
    let chain_means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();

    let mean_var = mean_acov(0) * n_f / (n_f - 1.0);
    let mut var_plus = mean_var * (n_f - 1.0) / n_f;
    if chains.len() > 1 {
        var_plus += variance(&chain_means, 1);
    }
    if !(var_plus > 0.0) {
        return f64::NAN;
    }

    let mut rho = vec![0.0; n];
    let mut rho_even = 1.0;
    rho[0] = rho_even;
    let mut rho_odd = 1.0 - (mean_var - mean_acov(1)) / var_plus;
    rho[1] = rho_odd;

    // Initial positive sequence
    let mut t = 1;
    while t < n - 3 && rho_even + rho_odd > 0.0 {
        rho_even = 1.0 - (mean_var - mean_acov(t + 1)) / var_plus;
        rho_odd = 1.0 - (mean_var - mean_acov(t + 2)) / var_plus;
        if rho_even + rho_odd >= 0.0 {
            rho[t + 1] = rho_even;
            rho[t + 2] = rho_odd;
        }
        t += 2;
    }
    let total = n_chain * n_f;
    // The sequence stopped before its first pair: only rho[0] counts.
    let tau = if t < 3 {
        0.0
    } else {
        let max_t = t - 2;
        if rho_even > 0.0 {
            rho[max_t + 1] = rho_even;
        }

        // Initial monotone sequence
        let mut t = 1;
        while t + 2 <= max_t {
            if rho[t + 1] + rho[t + 2] > rho[t - 1] + rho[t] {
                rho[t + 1] = (rho[t - 1] + rho[t]) / 2.0;
                rho[t + 2] = rho[t + 1];
            }
            t += 2;
        }
        -1.0 + 2.0 * rho[..=max_t].iter().sum::<f64>() + rho[max_t + 1]
    };
    let tau = tau.max(1.0 / total.log10());
    total / tau
}

/// ESS of the mean: split chains, no ranking.
pub fn ess_mean(chains: &[Vec<f64>]) -> f64 {
    ess_raw(&split_chains(chains))
}

/// Bulk ESS: rank-normalized split chains.
pub fn ess_bulk(chains: &[Vec<f64>]) -> f64 {
    if !well_formed(chains) {
        return f64::NAN;
    }
    ess_raw(&z_scale(&split_chains(chains)))
}

/// ESS of the indicator `x ≤ quantile(prob)`.
pub fn ess_quantile(chains: &[Vec<f64>], prob: f64) -> f64 {
    if !well_formed(chains) {
        return f64::NAN;
    }
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let q = quantile(&pooled, prob);
    let indicator: Vec<Vec<f64>> = chains
        .iter()
        .map(|c| c.iter().map(|x| if *x <= q { 1.0 } else { 0.0 }).collect())
        .collect();
    ess_raw(&split_chains(&indicator))
}

/// Tail ESS: the smaller of the 5% and 95% quantile ESS.
pub fn ess_tail(chains: &[Vec<f64>]) -> f64 {
    let low = ess_quantile(chains, 0.05);
    let high = ess_quantile(chains, 0.95);
    if low.is_nan() || high.is_nan() {
        return f64::NAN;
    }
    low.min(high)
}

/// Classic potential scale reduction over the given chains.
fn rhat_basic(chains: &[Vec<f64>]) -> f64 {
    let n = n_draws(chains) as f64;
    let chain_means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();
    let between = n * variance(&chain_means, 1);
    let within = chains.iter().map(|c| variance(c, 1)).sum::<f64>() / chains.len() as f64;
    if !(within > 0.0) {
        return f64::NAN;
    }
    ((between / within + n - 1.0) / n).sqrt()
}

/// Rank-normalized split R-hat: max of bulk and folded.
pub fn rhat(chains: &[Vec<f64>]) -> f64 {
    if !well_formed(chains) {
        return f64::NAN;
    }
    let split = split_chains(chains);
    let bulk = rhat_basic(&z_scale(&split));

    let pooled: Vec<f64> = split.iter().flatten().copied().collect();
    let med = median(&pooled);
    let folded: Vec<Vec<f64>> = split
        .iter()
        .map(|c| c.iter().map(|x| (x - med).abs()).collect())
        .collect();
    let tail = rhat_basic(&z_scale(&folded));

    if bulk.is_nan() || tail.is_nan() {
        return f64::NAN;
    }
    bulk.max(tail)
}

/// Monte Carlo standard error of the posterior mean.
pub fn mcse_mean(chains: &[Vec<f64>]) -> f64 {
    if !well_formed(chains) {
        return f64::NAN;
    }
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    std_dev(&pooled, 1) / ess_mean(chains).sqrt()
}

/// Monte Carlo standard error of the posterior standard deviation.
///
/// Delta method on the squared deviations: `Var(sd) ≈ Var(s²) / (4 s²)`.
pub fn mcse_sd(chains: &[Vec<f64>]) -> f64 {
    if !well_formed(chains) {
        return f64::NAN;
    }
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let m = mean(&pooled);
    let squared: Vec<Vec<f64>> = chains
        .iter()
        .map(|c| c.iter().map(|x| (x - m) * (x - m)).collect())
        .collect();
    let ess = ess_mean(&squared);
    let sq_pooled: Vec<f64> = squared.iter().flatten().copied().collect();
    let evar = mean(&sq_pooled);
    if !(evar > 0.0) {
        return f64::NAN;
    }
    let fourth = sq_pooled.iter().map(|v| v * v).sum::<f64>() / sq_pooled.len() as f64;
    let varvar = (fourth - evar * evar) / ess;
    (varvar / evar / 4.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_distr::{Distribution, StandardNormal};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn iid_chains(n_chains: usize, n: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        (0..n_chains)
            .map(|_| (0..n).map(|_| StandardNormal.sample(&mut rng)).collect())
            .collect()
    }

    /// AR(1) chains with coefficient `phi`.
    fn ar1_chains(n_chains: usize, n: usize, phi: f64, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        (0..n_chains)
            .map(|_| {
                let mut x = 0.0;
                (0..n)
                    .map(|_| {
                        let e: f64 = StandardNormal.sample(&mut rng);
                        x = phi * x + e;
                        x
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn split_drops_odd_middle() {
        let split = split_chains(&[vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        assert_eq!(split, vec![vec![1.0, 2.0], vec![4.0, 5.0]]);
    }

    #[test]
    fn z_scale_is_centered() {
        let z = z_scale(&[vec![3.0, 1.0], vec![2.0, 4.0]]);
        let pooled: Vec<f64> = z.iter().flatten().copied().collect();
        assert!(mean(&pooled).abs() < 1e-12);
        assert!(z[0][1] < z[1][0] && z[1][0] < z[0][0] && z[0][0] < z[1][1]);
    }

    #[test]
    fn iid_draws_have_ess_near_total() {
        let chains = iid_chains(4, 1000, 1);
        let bulk = ess_bulk(&chains);
        let tail = ess_tail(&chains);
        assert!(bulk > 3000.0 && bulk < 5500.0, "bulk {bulk}");
        assert!(tail > 2500.0 && tail < 5500.0, "tail {tail}");
        let r = rhat(&chains);
        assert!(r < 1.01, "rhat {r}");
    }

    #[test]
    fn autocorrelation_reduces_ess() {
        let chains = ar1_chains(4, 1000, 0.9, 2);
        let ess = ess_bulk(&chains);
        // Theory: N (1 − φ) / (1 + φ) ≈ 210.
        assert!(ess > 100.0 && ess < 450.0, "ess {ess}");
    }

    #[test]
    fn shifted_chain_inflates_rhat() {
        let mut chains = iid_chains(4, 500, 3);
        chains[3].iter_mut().for_each(|x| *x += 3.0);
        assert!(rhat(&chains) > 1.1);
    }

    #[test]
    fn scale_only_difference_caught_by_folding() {
        let mut chains = iid_chains(4, 500, 4);
        chains[0].iter_mut().for_each(|x| *x *= 4.0);
        chains[1].iter_mut().for_each(|x| *x *= 4.0);
        assert!(rhat(&chains) > 1.05);
    }

    #[test]
    fn mcse_tracks_sd_over_root_ess() {
        let chains = iid_chains(4, 1000, 5);
        let se = mcse_mean(&chains);
        // sd ≈ 1, ESS ≈ 4000.
        assert!(se > 0.01 && se < 0.025, "mcse_mean {se}");
        let se_sd = mcse_sd(&chains);
        // sqrt(2 σ⁴ / (4 σ² N)) ≈ 0.011
        assert!(se_sd > 0.005 && se_sd < 0.02, "mcse_sd {se_sd}");
    }

    #[test]
    fn degenerate_inputs_are_nan() {
        assert!(rhat(&[vec![1.0, 2.0]]).is_nan());
        assert!(ess_bulk(&[]).is_nan());
        assert!(ess_raw(&[vec![2.0; 10], vec![2.0; 10]]).is_nan());
        assert!(rhat(&[vec![1.0; 10], vec![1.0; 10]]).is_nan());
        assert!(mcse_mean(&[vec![f64::NAN; 8]]).is_nan());
    }
}
