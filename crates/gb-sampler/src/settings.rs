use nuts_rs::DiagGradNutsSettings;

use crate::error::{SamplerError, SamplerResult};

/// Sampler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NutsSettings {
    pub chains: usize,

    /// Warm-up iterations per chain. The engine adapts only here.
    pub tune: usize,

    /// Retained draws per chain.
    pub draws: usize,

    /// Mean acceptance statistic targeted by the engine's dual averaging.
    pub target_accept: f64,

    pub max_tree_depth: u32,

    /// A trajectory whose energy exceeds the start by more than this is divergent.
    pub max_energy_error: f64,

    /// Start points are drawn uniformly within ±`init_jitter` of the initial point.
    pub init_jitter: f64,

    /// Start-point attempts per chain.
    pub init_retries: usize,

    pub seed: u64,
}

impl Default for NutsSettings {
    fn default() -> Self {
        Self {
            chains: 4,
            tune: 1000,
            draws: 1000,
            target_accept: 0.8,
            max_tree_depth: 10,
            max_energy_error: 1000.0,
            init_jitter: 1.0,
            init_retries: 10,
            seed: 0,
        }
    }
}

impl NutsSettings {
    pub fn validate(&self) -> SamplerResult<()> {
        let invalid = |field: &'static str, message: String| {
            Err(SamplerError::InvalidSettings { field, message })
        };

        if self.chains == 0 {
            return invalid("chains", "need at least one chain".into());
        }
        if self.draws == 0 {
            return invalid("draws", "need at least one retained draw".into());
        }
        if !(self.target_accept > 0.0 && self.target_accept < 1.0) {
            return invalid("target_accept", format!("{} not in (0, 1)", self.target_accept));
        }
        if self.max_tree_depth == 0 {
            return invalid("max_tree_depth", "must be at least 1".into());
        }
        if !(self.max_energy_error > 0.0) {
            return invalid(
                "max_energy_error",
                format!("{} is not positive", self.max_energy_error),
            );
        }
        if !(self.init_jitter >= 0.0 && self.init_jitter.is_finite()) {
            return invalid("init_jitter", format!("{} is not a finite width", self.init_jitter));
        }
        if self.init_retries == 0 {
            return invalid("init_retries", "must be at least 1".into());
        }
        Ok(())
    }

    /// Engine settings for one chain: diagonal mass matrix adapted from
    /// gradients, everything not listed here at the engine's defaults.
    pub(crate) fn engine_settings(&self) -> DiagGradNutsSettings {
        let mut engine = DiagGradNutsSettings::default();
        engine.num_tune = self.tune as u64;
        engine.num_draws = self.draws as u64;
        engine.maxdepth = u64::from(self.max_tree_depth);
        engine.max_energy_error = self.max_energy_error;
        engine.adapt_options.dual_average_options.target_accept = self.target_accept;
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(NutsSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_settings() {
        let cases = [
            NutsSettings {
                chains: 0,
                ..Default::default()
            },
            NutsSettings {
                target_accept: 1.0,
                ..Default::default()
            },
            NutsSettings {
                max_tree_depth: 0,
                ..Default::default()
            },
            NutsSettings {
                init_jitter: f64::NAN,
                ..Default::default()
            },
        ];
        for settings in cases {
            assert!(settings.validate().is_err(), "{settings:?}");
        }
    }

    #[test]
    fn engine_settings_carry_run_lengths() {
        let settings = NutsSettings {
            tune: 300,
            draws: 200,
            max_tree_depth: 8,
            target_accept: 0.9,
            ..Default::default()
        };
        let engine = settings.engine_settings();
        assert_eq!(engine.num_tune, 300);
        assert_eq!(engine.num_draws, 200);
        assert_eq!(engine.maxdepth, 8);
        assert_eq!(engine.adapt_options.dual_average_options.target_accept, 0.9);
    }
}
