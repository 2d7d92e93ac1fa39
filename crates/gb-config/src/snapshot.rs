//! Configuration snapshots for reproducibility.
//!
//! A snapshot captures the exact configuration of a run, including the seed
//! that was actually used, so the summary table next to it can be reproduced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::run::RunConfig;
use crate::validate::ValidationError;

/// A frozen snapshot of run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Run identifier shared with the log stream.
    #[serde(default)]
    pub run_id: Option<String>,

    /// Master seed the sampler actually used.
    pub seed: u64,

    /// SHA-256 of the canonical configuration JSON (seed included).
    pub config_hash: String,

    pub config: RunConfig,
}

impl ConfigSnapshot {
    /// Create a snapshot of `config` with the resolved `seed`.
    pub fn new(config: &RunConfig, seed: u64, run_id: Option<&str>) -> Self {
        let mut resolved = config.clone();
        resolved.sampling.seed = Some(seed);

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            run_id: run_id.map(str::to_string),
            seed,
            config_hash: hash_config(&resolved),
            config: resolved,
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write the snapshot as pretty JSON, overwriting any previous file.
    pub fn write_to(&self, path: &Path) -> Result<(), ValidationError> {
        let json = self
            .to_json()
            .map_err(|e| ValidationError::ParseError(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            ValidationError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Check if this snapshot matches another (same config and seed).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

fn hash_config(config: &RunConfig) -> String {
    // Struct field order is fixed, so the compact encoding is canonical.
    let canonical = serde_json::to_string(config).unwrap_or_default();
    hash_content(&canonical)
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
