// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/rgrgr_r94"
//! model = "rgrgr_r94"
//! min_prob = 1e-5
//! return_log = true
//! parallel_scans = true
//! num_threads = 4
//! enable_profiling = true
//! ```

use crate::graphs::{PosteriorOptions, DEFAULT_MIN_PROB};
use crate::RuntimeError;
use std::path::{Path, PathBuf};

/// Configuration for the inference runtime.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Path to the model directory.
    pub model_path: PathBuf,
    /// Expected model name. Loading fails if the manifest names another.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Probability floor for log-space output.
    #[serde(default = "default_min_prob")]
    pub min_prob: f32,
    /// Return log probabilities rather than probabilities.
    #[serde(default = "default_true")]
    pub return_log: bool,
    /// Run forward and backward scans of bidirectional layers concurrently.
    #[serde(default = "default_true")]
    pub parallel_scans: bool,
    /// Number of worker threads (defaults to rayon's global pool).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
    /// Whether to collect per-call metrics.
    #[serde(default = "default_true")]
    pub enable_profiling: bool,
}

fn default_true() -> bool {
    true
}

fn default_min_prob() -> f32 {
    DEFAULT_MIN_PROB
}

impl RuntimeConfig {
    /// Configuration for the model stored in `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if !(0.0..=1.0).contains(&self.min_prob) {
            return Err(RuntimeError::ConfigError(format!(
                "min_prob {} outside [0, 1]",
                self.min_prob
            )));
        }
        if self.num_threads == Some(0) {
            return Err(RuntimeError::ConfigError(
                "num_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Per-call options derived from this configuration.
    pub fn posterior_options(&self) -> PosteriorOptions {
        PosteriorOptions {
            min_prob: self.min_prob,
            return_log: self.return_log,
            parallel_scans: self.parallel_scans,
        }
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, |n| n.get()))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/rgrgr_r94"),
            model: None,
            min_prob: DEFAULT_MIN_PROB,
            return_log: true,
            parallel_scans: true,
            num_threads: None,
            enable_profiling: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.min_prob, 1e-5);
        assert!(c.return_log);
        assert!(c.parallel_scans);
        assert!(c.enable_profiling);
        assert_eq!(c.posterior_options(), PosteriorOptions::default());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
model_path = "/tmp/model"
model = "raw_r94"
min_prob = 0.001
return_log = false
num_threads = 2
enable_profiling = false
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.model_path, PathBuf::from("/tmp/model"));
        assert_eq!(c.model.as_deref(), Some("raw_r94"));
        assert_eq!(c.min_prob, 0.001);
        assert!(!c.return_log);
        assert!(c.parallel_scans);
        assert_eq!(c.num_threads, Some(2));
        assert!(!c.enable_profiling);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let c = RuntimeConfig::from_toml(r#"model_path = "m""#).unwrap();
        assert_eq!(c, RuntimeConfig::new("m"));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig {
            model: Some("rnnrf_r94".into()),
            num_threads: Some(3),
            ..Default::default()
        };
        let back = RuntimeConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(RuntimeConfig::from_toml("model_path = \"m\"\nmin_prob = 2.0").is_err());
        assert!(RuntimeConfig::from_toml("model_path = \"m\"\nnum_threads = 0").is_err());
        assert!(RuntimeConfig::from_toml("min_prob = 0.1").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.toml");
        std::fs::write(&path, "model_path = \"x\"\nparallel_scans = false\n").unwrap();
        let c = RuntimeConfig::from_file(&path).unwrap();
        assert!(!c.parallel_scans);
        assert!(RuntimeConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_resolve_threads() {
        let c = RuntimeConfig {
            num_threads: Some(8),
            ..Default::default()
        };
        assert_eq!(c.resolve_threads(), 8);
        assert!(RuntimeConfig::default().resolve_threads() >= 1);
    }
}
