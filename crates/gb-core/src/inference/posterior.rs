//! Posterior sampling and convergence gating.

use std::time::Instant;

use gb_common::{Error, Result};
use gb_config::SamplingConfig;
use gb_sampler::{NutsSettings, SamplerError};
use rand::Rng;
use tracing::{debug, info, warn};

use super::trace::{InferenceData, PosteriorGroup};
use crate::logging::event_names;
use crate::model::BetaBinomialModel;
use crate::summary::diagnostics::rhat;

/// Seed from the config, or fresh OS entropy (logged so the run can be repeated).
pub fn resolve_seed(configured: Option<u64>) -> u64 {
    match configured {
        Some(seed) => seed,
        None => {
            let seed: u64 = rand::rng().random();
            info!(
                target: event_names::SAMPLE_SEED_DRAWN,
                seed,
                "no seed configured; drew one from OS entropy"
            );
            seed
        }
    }
}

pub fn nuts_settings(config: &SamplingConfig, seed: u64) -> NutsSettings {
    NutsSettings {
        chains: config.chains,
        tune: config.tune,
        draws: config.draws,
        target_accept: config.target_accept,
        max_tree_depth: config.max_tree_depth,
        max_energy_error: config.max_energy_error,
        init_jitter: config.init_jitter,
        init_retries: config.jitter_max_retries,
        seed,
    }
}

fn sampler_error(err: SamplerError) -> Error {
    match err {
        SamplerError::Initialization { chain, .. } => Error::SamplerInit {
            chain,
            reason: err.to_string(),
        },
        SamplerError::InvalidSettings { .. } => Error::Config(err.to_string()),
        SamplerError::DimensionMismatch { .. } => Error::ModelDefinition(err.to_string()),
        SamplerError::Engine { .. } => Error::Sampling(err.to_string()),
        SamplerError::NonFiniteDraw { .. } => Error::NumericalInstability(err.to_string()),
    }
}

/// Draw the posterior with NUTS, then gate on split R-hat.
pub fn sample_posterior(
    model: &BetaBinomialModel,
    config: &SamplingConfig,
) -> Result<InferenceData> {
    let seed = resolve_seed(config.seed);
    let settings = nuts_settings(config, seed);

    info!(
        target: event_names::SAMPLE_STARTED,
        chains = settings.chains,
        tune = settings.tune,
        draws = settings.draws,
        seed,
        "sampling posterior"
    );
    let started = Instant::now();
    let chains =
        gb_sampler::sample(model, &settings, &model.initial_point()).map_err(sampler_error)?;

    for chain in &chains {
        debug!(
            target: event_names::SAMPLE_CHAIN_FINISHED,
            chain = chain.index,
            step_size = chain.tuning.step_size,
            divergences = chain.divergences() as u64,
            mean_leapfrog = chain.mean_leapfrog(),
            init_attempts = chain.tuning.init_attempts as u64,
            "chain finished"
        );
    }

    let posterior = PosteriorGroup::from_chains(model.param_names(), chains);
    let divergences = posterior.divergences();
    if divergences > 0 {
        warn!(
            target: event_names::SAMPLE_DIVERGENCES,
            divergences = divergences as u64,
            "divergent transitions after tuning"
        );
    }

    check_convergence(
        &posterior,
        config.rhat_warn_threshold,
        config.rhat_fail_threshold,
    )?;

    info!(
        target: event_names::SAMPLE_FINISHED,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "posterior sampling finished"
    );
    Ok(InferenceData::new(model.outcomes().to_vec(), model.trials(), seed).with_posterior(posterior))
}

/// Split R-hat per parameter; warns above `warn_at`, fails above `fail_at`.
///
/// Undefined values (too few draws, constant traces) are neither.
pub fn check_convergence(
    posterior: &PosteriorGroup,
    warn_at: f64,
    fail_at: f64,
) -> Result<Vec<f64>> {
    let values: Vec<f64> = (0..posterior.n_params())
        .map(|i| rhat(&posterior.chains_of(i)))
        .collect();

    let mut worst: Option<(usize, f64)> = None;
    for (i, &r_hat) in values.iter().enumerate() {
        if r_hat > warn_at {
            warn!(
                target: event_names::SAMPLE_RHAT_WARNING,
                parameter = posterior.param_names[i].as_str(),
                r_hat,
                "split r_hat above warning threshold"
            );
        }
        if r_hat > fail_at && worst.map_or(true, |(_, w)| r_hat > w) {
            worst = Some((i, r_hat));
        }
    }

    if let Some((i, r_hat)) = worst {
        return Err(Error::ConvergenceFailure {
            parameter: posterior.param_names[i].clone(),
            r_hat,
            threshold: fail_at,
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(chains: Vec<Vec<f64>>) -> PosteriorGroup {
        PosteriorGroup {
            param_names: vec!["x".into()],
            draws: chains
                .into_iter()
                .map(|c| c.into_iter().map(|v| vec![v]).collect())
                .collect(),
            stats: Vec::new(),
            tuning: Vec::new(),
        }
    }

    fn wiggle(offset: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| offset + ((i * 7919) % 101) as f64 / 101.0)
            .collect()
    }

    #[test]
    fn configured_seed_is_used() {
        assert_eq!(resolve_seed(Some(42)), 42);
    }

    #[test]
    fn settings_carry_config() {
        let config = SamplingConfig {
            chains: 2,
            jitter_max_retries: 3,
            ..Default::default()
        };
        let s = nuts_settings(&config, 9);
        assert_eq!(s.chains, 2);
        assert_eq!(s.init_retries, 3);
        assert_eq!(s.seed, 9);
    }

    #[test]
    fn mixed_chains_pass() {
        let g = group(vec![wiggle(0.0, 200), wiggle(0.0, 200)]);
        let values = check_convergence(&g, 1.01, 1.1).unwrap();
        assert!(values[0] < 1.05, "{}", values[0]);
    }

    #[test]
    fn separated_chains_fail() {
        let g = group(vec![wiggle(0.0, 200), wiggle(50.0, 200)]);
        let err = check_convergence(&g, 1.01, 1.1).unwrap_err();
        match err {
            Error::ConvergenceFailure {
                parameter,
                r_hat,
                threshold,
            } => {
                assert_eq!(parameter, "x");
                assert!(r_hat > 1.1);
                assert_eq!(threshold, 1.1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn initialization_maps_to_convergence_class() {
        let err = sampler_error(SamplerError::Initialization {
            chain: 1,
            attempts: 10,
        });
        assert!(err.is_convergence_failure());
        assert!(matches!(err, Error::SamplerInit { chain: 1, .. }));
    }

    #[test]
    fn engine_failures_are_sampling_errors() {
        let err = sampler_error(SamplerError::Engine {
            chain: 0,
            message: "bad initial gradient".into(),
        });
        assert!(matches!(err, Error::Sampling(ref m) if m.contains("bad initial gradient")));
    }
}
