//! Pipeline stage settings and the top-level [`RunConfig`].
//!
//! `RunConfig::default()` reproduces the fixed analysis: 4 chains of 1000
//! tuning plus 1000 retained draws, 94% HDIs, 300 dpi figures under
//! `figures/` and the summary table under `results/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::ModelConfig;
use crate::validate::ValidationError;

/// Posterior sampler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub chains: usize,

    /// Warm-up iterations per chain, discarded after adaptation.
    pub tune: usize,

    /// Retained draws per chain.
    pub draws: usize,

    /// Dual-averaging acceptance target.
    pub target_accept: f64,

    pub max_tree_depth: u32,

    /// Energy error above which a transition counts as divergent.
    pub max_energy_error: f64,

    /// Half-width of the uniform jitter added to the prior-mean start point.
    pub init_jitter: f64,

    /// Start-point attempts before initialization fails.
    pub jitter_max_retries: usize,

    /// Split R-hat above this only warns.
    pub rhat_warn_threshold: f64,

    /// Split R-hat above this fails the run.
    pub rhat_fail_threshold: f64,

    /// Master seed; drawn from OS entropy and logged when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            chains: 4,
            tune: 1000,
            draws: 1000,
            target_accept: 0.8,
            max_tree_depth: 10,
            max_energy_error: 1000.0,
            init_jitter: 1.0,
            jitter_max_retries: 10,
            rhat_warn_threshold: 1.01,
            rhat_fail_threshold: 1.1,
            seed: None,
        }
    }
}

/// Summary-table settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Mass of the highest-density interval.
    pub hdi_prob: f64,

    /// Decimals kept for point estimates and MCSEs.
    pub round_to: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            hdi_prob: 0.94,
            round_to: 3,
        }
    }
}

impl SummaryConfig {
    /// Column labels of the interval bounds, e.g. `hdi_3%` / `hdi_97%`.
    pub fn hdi_labels(&self) -> (String, String) {
        let tail = (1.0 - self.hdi_prob) / 2.0 * 100.0;
        (
            format!("hdi_{}%", format_percent(tail)),
            format!("hdi_{}%", format_percent(100.0 - tail)),
        )
    }
}

fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub summary_file: String,
    pub snapshot_file: String,
    pub p_forest_file: String,
    pub mu_forest_file: String,
    pub ppc_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            figures_dir: PathBuf::from("figures"),
            summary_file: "summary.csv".to_string(),
            snapshot_file: "config_snapshot.json".to_string(),
            p_forest_file: "p_effects_forest.png".to_string(),
            mu_forest_file: "mu_effects_forest.png".to_string(),
            ppc_file: "posterior_predictive.png".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn summary_path(&self) -> PathBuf {
        self.results_dir.join(&self.summary_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.results_dir.join(&self.snapshot_file)
    }

    pub fn p_forest_path(&self) -> PathBuf {
        self.figures_dir.join(&self.p_forest_file)
    }

    pub fn mu_forest_path(&self) -> PathBuf {
        self.figures_dir.join(&self.mu_forest_file)
    }

    pub fn ppc_path(&self) -> PathBuf {
        self.figures_dir.join(&self.ppc_file)
    }
}

/// Figure rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub dpi: u32,

    /// Figure width in inches; heights follow from the content.
    pub width_in: f64,

    /// Base font size in points.
    pub font_pt: f64,

    pub font_family: String,

    /// Predictive draws overlaid on the posterior-predictive check.
    pub ppc_draws: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            width_in: 6.4,
            font_pt: 10.0,
            font_family: "sans-serif".to_string(),
            ppc_draws: 100,
        }
    }
}

impl PlotConfig {
    /// Convert a length in points to pixels at the configured resolution.
    pub fn pt_to_px(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }

    /// Convert a length in inches to whole pixels.
    pub fn in_to_px(&self, inches: f64) -> u32 {
        (inches * self.dpi as f64).round() as u32
    }
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Tab-separated input table.
    pub data_path: PathBuf,
    pub model: ModelConfig,
    pub sampling: SamplingConfig,
    pub summary: SummaryConfig,
    pub output: OutputConfig,
    pub plot: PlotConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dat/data_w_themes.csv"),
            model: ModelConfig::default(),
            sampling: SamplingConfig::default(),
            summary: SummaryConfig::default(),
            output: OutputConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a run configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse a run configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_analysis() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.sampling.chains, 4);
        assert_eq!(cfg.sampling.tune, 1000);
        assert_eq!(cfg.sampling.draws, 1000);
        assert_eq!(cfg.sampling.max_tree_depth, 10);
        assert_eq!(cfg.summary.hdi_prob, 0.94);
        assert_eq!(cfg.plot.dpi, 300);
        assert_eq!(cfg.output.summary_path(), PathBuf::from("results/summary.csv"));
        assert_eq!(
            cfg.output.ppc_path(),
            PathBuf::from("figures/posterior_predictive.png")
        );
    }

    #[test]
    fn hdi_labels_for_default_and_odd_mass() {
        let (lo, hi) = SummaryConfig::default().hdi_labels();
        assert_eq!(lo, "hdi_3%");
        assert_eq!(hi, "hdi_97%");

        let odd = SummaryConfig {
            hdi_prob: 0.89,
            round_to: 3,
        };
        assert_eq!(odd.hdi_labels(), ("hdi_5.5%".into(), "hdi_94.5%".into()));
    }

    #[test]
    fn pixel_conversions() {
        let plot = PlotConfig::default();
        assert_eq!(plot.in_to_px(6.4), 1920);
        assert!((plot.pt_to_px(72.0) - 300.0).abs() < 1e-12);
    }

    #[test]
    fn from_json_overrides_only_given_keys() {
        let cfg = RunConfig::from_json(r#"{"sampling": {"draws": 200, "seed": 7}}"#).unwrap();
        assert_eq!(cfg.sampling.draws, 200);
        assert_eq!(cfg.sampling.seed, Some(7));
        assert_eq!(cfg.sampling.tune, 1000);
        assert_eq!(cfg.data_path, PathBuf::from("dat/data_w_themes.csv"));
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        let err = RunConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
