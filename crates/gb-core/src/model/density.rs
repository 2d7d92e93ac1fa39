//! Hierarchical Beta-Binomial regression density.
//!
//! ```text
//! mu  = mu_0 + author_mu·a + reviewer_mu·r + interaction_mu·a·r
//! p   = p_0  + author_p·a  + reviewer_p·r  + interaction_p·a·r
//! y   ~ BetaBinomial(n, alpha(mu, p), beta(mu, p))
//! θ_i ~ Normal(prior_i)
//! ```
//!
//! Observations sharing a design cell and outcome contribute identical
//! likelihood terms, so the density is evaluated once per (cell, outcome)
//! and weighted by the count.

use std::collections::BTreeMap;

use gb_common::{Error, Result};
use gb_config::{ModelConfig, NormalPrior, MAX_TRIALS, PARAMETER_NAMES};
use gb_math::{beta_binomial, normal};
use gb_sampler::LogDensity;

use super::covariates::{Covariates, DESIGN_WIDTH};
use super::transform::{is_valid_shape, mu_index, p_index, to_alpha_beta, Coefficients};
use crate::data::DataTable;

/// Observations with one design row, tallied by outcome.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    design: [f64; DESIGN_WIDTH],
    /// `counts[k]` observations with outcome `k`.
    counts: Vec<u64>,
}

/// The fitted model: immutable data plus priors.
#[derive(Debug, Clone)]
pub struct BetaBinomialModel {
    covariates: Covariates,
    outcomes: Vec<u64>,
    trials: u64,
    priors: [(&'static str, NormalPrior); 8],
    cells: Vec<Cell>,
    /// Cell index of each observation.
    cell_of: Vec<usize>,
}

impl BetaBinomialModel {
    /// Encode a loaded table and build the model.
    pub fn new(table: &DataTable, config: &ModelConfig) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let covariates = Covariates::from_table(table)?;
        let (min, max) = config.grade_range();
        let mut outcomes = Vec::with_capacity(table.len());
        for obs in &table.observations {
            if obs.grade < min || obs.grade > max {
                return Err(Error::GradeOutOfRange {
                    row: obs.row,
                    grade: obs.grade,
                    min,
                    max,
                });
            }
            outcomes.push((obs.grade - config.grade_offset) as u64);
        }
        Self::assemble(covariates, outcomes, config)
    }

    /// Build from explicit covariates and zero-based outcomes.
    pub fn from_covariates(
        covariates: Covariates,
        outcomes: &[i64],
        config: &ModelConfig,
    ) -> Result<Self> {
        if outcomes.len() != covariates.len() {
            return Err(Error::CovariateShape {
                name: "outcome".to_string(),
                expected: covariates.len(),
                actual: outcomes.len(),
            });
        }
        if outcomes.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let (min, max) = config.grade_range();
        let mut checked = Vec::with_capacity(outcomes.len());
        for (i, &y) in outcomes.iter().enumerate() {
            if y < 0 || y as u64 > config.trials {
                return Err(Error::GradeOutOfRange {
                    row: i + 1,
                    grade: y.saturating_add(config.grade_offset),
                    min,
                    max,
                });
            }
            checked.push(y as u64);
        }
        Self::assemble(covariates, checked, config)
    }

    fn assemble(covariates: Covariates, outcomes: Vec<u64>, config: &ModelConfig) -> Result<Self> {
        if !(1..=MAX_TRIALS).contains(&config.trials) {
            return Err(Error::ModelDefinition(format!(
                "Beta-Binomial needs between 1 and {MAX_TRIALS} trials, got {}",
                config.trials
            )));
        }

        // Keyed by bit patterns so cell order is deterministic.
        let mut index: BTreeMap<(u64, u64), usize> = BTreeMap::new();
        let mut cells: Vec<Cell> = Vec::new();
        let mut cell_of = Vec::with_capacity(outcomes.len());
        for (i, &y) in outcomes.iter().enumerate() {
            let key = (covariates.author()[i].to_bits(), covariates.reviewer()[i].to_bits());
            let c = *index.entry(key).or_insert_with(|| {
                cells.push(Cell {
                    design: covariates.design_row(i),
                    counts: vec![0; config.trials as usize + 1],
                });
                cells.len() - 1
            });
            cells[c].counts[y as usize] += 1;
            cell_of.push(c);
        }

        Ok(Self {
            covariates,
            outcomes,
            trials: config.trials,
            priors: config.priors.in_order(),
            cells,
            cell_of,
        })
    }

    pub fn param_names(&self) -> &'static [&'static str] {
        &PARAMETER_NAMES
    }

    pub fn n_params(&self) -> usize {
        PARAMETER_NAMES.len()
    }

    pub fn n_obs(&self) -> usize {
        self.outcomes.len()
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Zero-based observed outcomes.
    pub fn outcomes(&self) -> &[u64] {
        &self.outcomes
    }

    pub fn covariates(&self) -> &Covariates {
        &self.covariates
    }

    /// Number of distinct design cells in the data.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Prior means; the sampler's jitter center.
    pub fn initial_point(&self) -> Vec<f64> {
        self.priors.iter().map(|(_, prior)| prior.mu).collect()
    }

    /// Observed share of each outcome `0..=n`.
    pub fn observed_frequencies(&self) -> Vec<f64> {
        outcome_frequencies(&self.outcomes, self.trials)
    }

    fn check_theta(&self, theta: &[f64]) -> Result<()> {
        if theta.len() != self.n_params() {
            return Err(Error::ModelDefinition(format!(
                "parameter vector has {} entries, model declares {}",
                theta.len(),
                self.n_params()
            )));
        }
        Ok(())
    }

    /// Per-observation `(mu, p)`.
    pub fn linear_predictors(&self, theta: &[f64]) -> Result<Vec<(f64, f64)>> {
        self.check_theta(theta)?;
        let coef = Coefficients::from_theta(theta);
        Ok((0..self.n_obs())
            .map(|i| coef.predict(&self.covariates.design_row(i)))
            .collect())
    }

    /// Per-observation `(alpha, beta)` arrays, unclipped.
    pub fn alpha_beta(&self, theta: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let shapes = self.cell_shapes_checked(theta)?;
        Ok(self.cell_of.iter().map(|&c| shapes[c]).unzip())
    }

    /// `(alpha, beta)` for every design cell.
    pub(crate) fn cell_shapes(&self, theta: &[f64]) -> Vec<(f64, f64)> {
        let coef = Coefficients::from_theta(theta);
        self.cells
            .iter()
            .map(|cell| {
                let (mu, p) = coef.predict(&cell.design);
                to_alpha_beta(mu, p, self.trials)
            })
            .collect()
    }

    fn cell_shapes_checked(&self, theta: &[f64]) -> Result<Vec<(f64, f64)>> {
        self.check_theta(theta)?;
        Ok(self.cell_shapes(theta))
    }

    /// Cell index of every observation, aligned with [`Self::outcomes`].
    pub(crate) fn cell_of(&self) -> &[usize] {
        &self.cell_of
    }

    /// Unnormalized log posterior; `-inf` outside the valid shape region.
    pub fn log_density(&self, theta: &[f64]) -> Result<f64> {
        self.check_theta(theta)?;
        Ok(self.evaluate(theta, None))
    }

    /// Log posterior with its gradient written into `grad`.
    pub fn log_density_and_grad(&self, theta: &[f64], grad: &mut [f64]) -> Result<f64> {
        self.check_theta(theta)?;
        if grad.len() != theta.len() {
            return Err(Error::ModelDefinition(format!(
                "gradient buffer has {} entries, expected {}",
                grad.len(),
                theta.len()
            )));
        }
        Ok(self.evaluate(theta, Some(grad)))
    }

    fn evaluate(&self, theta: &[f64], mut grad: Option<&mut [f64]>) -> f64 {
        if let Some(g) = grad.as_deref_mut() {
            g.iter_mut().for_each(|x| *x = 0.0);
        }

        let mut logp = 0.0;
        for (i, (_, prior)) in self.priors.iter().enumerate() {
            logp += normal::log_pdf(theta[i], prior.mu, prior.sigma);
            if let Some(g) = grad.as_deref_mut() {
                g[i] += normal::grad_log_pdf(theta[i], prior.mu, prior.sigma);
            }
        }

        let n = self.trials;
        let shapes = self.cell_shapes(theta);
        for (cell, &(alpha, beta)) in self.cells.iter().zip(&shapes) {
            if !is_valid_shape(alpha, beta) {
                if let Some(g) = grad.as_deref_mut() {
                    g.iter_mut().for_each(|x| *x = 0.0);
                }
                return f64::NEG_INFINITY;
            }
            let concentration = alpha + beta;
            let mut d_mu = 0.0;
            let mut d_p = 0.0;
            for (k, &count) in cell.counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let w = count as f64;
                logp += w * beta_binomial::log_pmf(k as u64, n, alpha, beta);
                if grad.is_some() {
                    let (ga, gb) = beta_binomial::grad_log_pmf(k as u64, n, alpha, beta);
                    // dα/dμ = s/n, dβ/dμ = −s/n, dα/dp = 2α, dβ/dp = 2β
                    d_mu += w * (ga - gb) * concentration / n as f64;
                    d_p += w * 2.0 * (alpha * ga + beta * gb);
                }
            }
            if let Some(g) = grad.as_deref_mut() {
                for j in 0..DESIGN_WIDTH {
                    g[mu_index(j)] += d_mu * cell.design[j];
                    g[p_index(j)] += d_p * cell.design[j];
                }
            }
        }
        logp
    }
}

impl LogDensity for BetaBinomialModel {
    fn dim(&self) -> usize {
        self.n_params()
    }

    fn logp_and_grad(&self, position: &[f64], grad: &mut [f64]) -> f64 {
        self.evaluate(position, Some(grad))
    }

    fn logp(&self, position: &[f64]) -> f64 {
        self.evaluate(position, None)
    }
}

/// Share of each outcome `0..=trials` in `outcomes`.
pub fn outcome_frequencies(outcomes: &[u64], trials: u64) -> Vec<f64> {
    let mut counts = vec![0.0; trials as usize + 1];
    for &y in outcomes {
        if let Some(c) = counts.get_mut(y as usize) {
            *c += 1.0;
        }
    }
    let total = outcomes.len().max(1) as f64;
    counts.iter().map(|c| c / total).collect()
}
