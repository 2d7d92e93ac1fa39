//! Chain driver: start points, seeding and retained draws around the engine.

use nuts_rs::{Chain as _, CpuMath, Settings as _};
use rand::{Rng, SeedableRng};
use rand08::SeedableRng as _;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::density::{EngineDensity, LogDensity};
use crate::error::{SamplerError, SamplerResult};
use crate::settings::NutsSettings;

/// Per-draw sampler statistics, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStats {
    pub step_size: f64,
    /// Leapfrog steps in the trajectory.
    pub n_leapfrog: u64,
    pub divergent: bool,
}

/// State at the end of warm-up.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningSummary {
    /// Step size of the first retained draw.
    pub step_size: f64,
    pub warmup_divergences: usize,
    /// Start-point attempts used before the first finite evaluation.
    pub init_attempts: usize,
}

/// Retained draws of one chain.
#[derive(Debug, Clone)]
pub struct Chain {
    pub index: usize,
    /// `draws[i]` is the position after retained iteration `i`.
    pub draws: Vec<Vec<f64>>,
    pub stats: Vec<DrawStats>,
    pub tuning: TuningSummary,
}

impl Chain {
    pub fn divergences(&self) -> usize {
        self.stats.iter().filter(|s| s.divergent).count()
    }

    /// Mean leapfrog steps per retained draw.
    pub fn mean_leapfrog(&self) -> f64 {
        if self.stats.is_empty() {
            return f64::NAN;
        }
        self.stats.iter().map(|s| s.n_leapfrog as f64).sum::<f64>() / self.stats.len() as f64
    }

    /// Draws of coordinate `param`.
    pub fn trace(&self, param: usize) -> Vec<f64> {
        self.draws.iter().map(|d| d[param]).collect()
    }
}

/// Run `settings.chains` independent chains in parallel.
///
/// Chain `c` draws from the master-seeded xoshiro stream advanced by `c`
/// jumps: first its jittered start point, then the seed of its engine chain.
/// The result is a pure function of (density, settings, initial point).
pub fn sample<D: LogDensity>(
    density: &D,
    settings: &NutsSettings,
    initial_point: &[f64],
) -> SamplerResult<Vec<Chain>> {
    settings.validate()?;
    if initial_point.len() != density.dim() {
        return Err(SamplerError::DimensionMismatch {
            expected: density.dim(),
            actual: initial_point.len(),
        });
    }

    (0..settings.chains)
        .into_par_iter()
        .map(|index| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(settings.seed);
            for _ in 0..index {
                rng.jump();
            }
            run_chain(density, settings, initial_point, index, &mut rng)
        })
        .collect()
}

fn initialize<D: LogDensity, R: Rng>(
    density: &D,
    settings: &NutsSettings,
    initial_point: &[f64],
    chain: usize,
    rng: &mut R,
) -> SamplerResult<(Vec<f64>, usize)> {
    let mut grad = vec![0.0; initial_point.len()];
    for attempt in 1..=settings.init_retries {
        let q: Vec<f64> = initial_point
            .iter()
            .map(|x| {
                if settings.init_jitter > 0.0 {
                    x + rng.random_range(-settings.init_jitter..settings.init_jitter)
                } else {
                    *x
                }
            })
            .collect();
        let logp = density.logp_and_grad(&q, &mut grad);
        if logp.is_finite() && grad.iter().all(|g| g.is_finite()) {
            return Ok((q, attempt));
        }
        debug!(chain, attempt, logp, "rejected start point");
    }
    Err(SamplerError::Initialization {
        chain,
        attempts: settings.init_retries,
    })
}

fn run_chain<D: LogDensity, R: Rng>(
    density: &D,
    settings: &NutsSettings,
    initial_point: &[f64],
    index: usize,
    rng: &mut R,
) -> SamplerResult<Chain> {
    let (start, init_attempts) = initialize(density, settings, initial_point, index, rng)?;

    let mut engine_rng = rand08::rngs::StdRng::seed_from_u64(rng.random());
    let math = CpuMath::new(EngineDensity::new(density));
    let engine_settings = settings.engine_settings();
    let mut engine = engine_settings.new_chain(index as u64, math, &mut engine_rng);
    engine
        .set_position(&start)
        .map_err(|e| SamplerError::engine(index, e))?;

    let mut warmup_divergences = 0;
    for _ in 0..settings.tune {
        let (_, progress) = engine.draw().map_err(|e| SamplerError::engine(index, e))?;
        let progress = engine_settings.sample_stats::<CpuMath<EngineDensity<D>>>(&progress);
        warmup_divergences += usize::from(progress.diverging);
    }
    if warmup_divergences > 0 {
        warn!(chain = index, warmup_divergences, "divergences during warm-up");
    }

    let mut draws = Vec::with_capacity(settings.draws);
    let mut stats = Vec::with_capacity(settings.draws);
    for iteration in 0..settings.draws {
        let (position, progress) = engine.draw().map_err(|e| SamplerError::engine(index, e))?;
        let progress = engine_settings.sample_stats::<CpuMath<EngineDensity<D>>>(&progress);
        if !position.iter().all(|x| x.is_finite()) {
            return Err(SamplerError::NonFiniteDraw {
                chain: index,
                iteration,
            });
        }
        stats.push(DrawStats {
            step_size: progress.step_size,
            n_leapfrog: progress.num_steps as u64,
            divergent: progress.diverging,
        });
        draws.push(position.into_vec());
    }

    let chain = Chain {
        index,
        draws,
        tuning: TuningSummary {
            step_size: stats.first().map_or(f64::NAN, |s| s.step_size),
            warmup_divergences,
            init_attempts,
        },
        stats,
    };
    debug!(
        chain = index,
        step_size = chain.tuning.step_size,
        divergences = chain.divergences(),
        mean_leapfrog = chain.mean_leapfrog(),
        "chain finished"
    );
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(n_leapfrog: u64, divergent: bool) -> DrawStats {
        DrawStats {
            step_size: 0.5,
            n_leapfrog,
            divergent,
        }
    }

    #[test]
    fn chain_bookkeeping() {
        let chain = Chain {
            index: 0,
            draws: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            stats: vec![stats(3, false), stats(7, true)],
            tuning: TuningSummary {
                step_size: 0.5,
                warmup_divergences: 0,
                init_attempts: 1,
            },
        };
        assert_eq!(chain.trace(1), vec![2.0, 4.0]);
        assert_eq!(chain.divergences(), 1);
        assert_eq!(chain.mean_leapfrog(), 5.0);
    }
}
