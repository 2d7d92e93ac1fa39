//! Posterior-predictive simulation.
//!
//! For every retained (chain, draw) and every observation:
//! `q ~ Beta(alpha, beta)`, then `y ~ Binomial(n, q)`.

use gb_common::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Binomial, Distribution};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use tracing::info;

use super::trace::{InferenceData, PredictiveGroup};
use crate::logging::event_names;
use crate::model::{is_valid_shape, BetaBinomialModel};

/// Stream for predictive chain `chain`.
///
/// A long jump keeps these streams disjoint from the posterior chains, which
/// use plain jumps off the same seed.
fn predictive_rng(seed: u64, chain: usize) -> Xoshiro256PlusPlus {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    rng.long_jump();
    for _ in 0..chain {
        rng.jump();
    }
    rng
}

/// One simulated data set at parameter vector `theta`.
fn simulate<R: Rng>(model: &BetaBinomialModel, theta: &[f64], rng: &mut R) -> Result<Vec<u64>> {
    let mut mixing = Vec::with_capacity(model.n_cells());
    for (alpha, beta) in model.cell_shapes(theta) {
        if !is_valid_shape(alpha, beta) {
            return Err(Error::NumericalInstability(format!(
                "predictive shapes alpha={alpha}, beta={beta} are not positive"
            )));
        }
        let dist = Beta::new(alpha, beta)
            .map_err(|e| Error::NumericalInstability(format!("Beta({alpha}, {beta}): {e}")))?;
        mixing.push(dist);
    }

    model
        .cell_of()
        .iter()
        .map(|&cell| {
            let q: f64 = mixing[cell].sample(rng);
            let binomial = Binomial::new(model.trials(), q)
                .map_err(|e| Error::NumericalInstability(format!("Binomial(q={q}): {e}")))?;
            Ok(binomial.sample(rng))
        })
        .collect()
}

/// Attach the posterior-predictive group to `idata`.
///
/// Requires a non-empty posterior; fails if a predictive group is present.
pub fn sample_posterior_predictive(
    model: &BetaBinomialModel,
    idata: &mut InferenceData,
    seed: u64,
) -> Result<()> {
    if idata.posterior_predictive().is_some() {
        return Err(Error::PredictiveAlreadySampled);
    }
    let posterior = idata.posterior()?;
    if posterior.n_params() != model.n_params() {
        return Err(Error::ModelDefinition(format!(
            "posterior has {} parameters, model declares {}",
            posterior.n_params(),
            model.n_params()
        )));
    }
    if idata.observed.len() != model.n_obs() {
        return Err(Error::CovariateShape {
            name: "observed".to_string(),
            expected: model.n_obs(),
            actual: idata.observed.len(),
        });
    }

    let draws = (0..posterior.n_chains())
        .into_par_iter()
        .map(|c| {
            let mut rng = predictive_rng(seed, c);
            posterior.draws[c]
                .iter()
                .map(|theta| simulate(model, theta, &mut rng))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let group = PredictiveGroup { draws };
    info!(
        target: event_names::PREDICT_FINISHED,
        chains = group.n_chains() as u64,
        draws = group.n_draws() as u64,
        "posterior predictive sampled"
    );
    idata.attach_predictive(group)
}
