//! Inference data: posterior draws plus the posterior-predictive group.
//!
//! Groups are append-only. The posterior is set once by
//! [`crate::inference::sample_posterior`]; the predictive group can be
//! attached exactly once afterwards.

use gb_common::{Error, Result};
use gb_sampler::{Chain, DrawStats, TuningSummary};

/// Posterior draws indexed by (chain, draw, parameter).
#[derive(Debug, Clone)]
pub struct PosteriorGroup {
    pub param_names: Vec<String>,
    /// `draws[c][d][i]`: parameter `i` of draw `d` in chain `c`.
    pub draws: Vec<Vec<Vec<f64>>>,
    pub stats: Vec<Vec<DrawStats>>,
    pub tuning: Vec<TuningSummary>,
}

impl PosteriorGroup {
    pub fn from_chains(param_names: &[&str], chains: Vec<Chain>) -> Self {
        let mut draws = Vec::with_capacity(chains.len());
        let mut stats = Vec::with_capacity(chains.len());
        let mut tuning = Vec::with_capacity(chains.len());
        for chain in chains {
            draws.push(chain.draws);
            stats.push(chain.stats);
            tuning.push(chain.tuning);
        }
        Self {
            param_names: param_names.iter().map(|s| s.to_string()).collect(),
            draws,
            stats,
            tuning,
        }
    }

    pub fn n_chains(&self) -> usize {
        self.draws.len()
    }

    /// Retained draws per chain (all chains have the same length).
    pub fn n_draws(&self) -> usize {
        self.draws.first().map_or(0, |c| c.len())
    }

    pub fn n_params(&self) -> usize {
        self.param_names.len()
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.param_names.iter().position(|n| n == name)
    }

    /// Per-chain traces of parameter `param`.
    pub fn chains_of(&self, param: usize) -> Vec<Vec<f64>> {
        self.draws
            .iter()
            .map(|chain| chain.iter().map(|d| d[param]).collect())
            .collect()
    }

    /// All draws of parameter `param`, chains concatenated.
    pub fn pooled(&self, param: usize) -> Vec<f64> {
        self.draws
            .iter()
            .flat_map(|chain| chain.iter().map(move |d| d[param]))
            .collect()
    }

    pub fn divergences(&self) -> usize {
        self.stats.iter().flatten().filter(|s| s.divergent).count()
    }
}

/// Simulated outcomes indexed by (chain, draw, observation).
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveGroup {
    pub draws: Vec<Vec<Vec<u64>>>,
}

impl PredictiveGroup {
    pub fn n_chains(&self) -> usize {
        self.draws.len()
    }

    pub fn n_draws(&self) -> usize {
        self.draws.first().map_or(0, |c| c.len())
    }
}

/// Combined sample set handed to the summarizer and plotter.
#[derive(Debug, Clone)]
pub struct InferenceData {
    posterior: Option<PosteriorGroup>,
    posterior_predictive: Option<PredictiveGroup>,
    /// Zero-based observed outcomes.
    pub observed: Vec<u64>,
    pub trials: u64,
    /// Master seed the posterior was drawn with.
    pub seed: u64,
}

impl InferenceData {
    /// Observed data only; no groups yet.
    pub fn new(observed: Vec<u64>, trials: u64, seed: u64) -> Self {
        Self {
            posterior: None,
            posterior_predictive: None,
            observed,
            trials,
            seed,
        }
    }

    pub fn with_posterior(mut self, posterior: PosteriorGroup) -> Self {
        self.posterior = Some(posterior);
        self
    }

    /// The posterior group, if it holds at least one draw.
    pub fn posterior(&self) -> Result<&PosteriorGroup> {
        match &self.posterior {
            Some(group) if group.n_draws() > 0 => Ok(group),
            _ => Err(Error::PosteriorMissing),
        }
    }

    pub fn has_posterior(&self) -> bool {
        self.posterior().is_ok()
    }

    pub fn posterior_predictive(&self) -> Option<&PredictiveGroup> {
        self.posterior_predictive.as_ref()
    }

    /// Attach the predictive group; a second attachment fails.
    pub fn attach_predictive(&mut self, group: PredictiveGroup) -> Result<()> {
        if self.posterior_predictive.is_some() {
            return Err(Error::PredictiveAlreadySampled);
        }
        self.posterior_predictive = Some(group);
        Ok(())
    }
}
