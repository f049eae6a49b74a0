//! Serializable experiment configuration.
//!
//! One TOML file can drive every pipeline stage:
//!
//! ```toml
//! [simulation]
//! threshold = 0.37
//! runs = 1000
//! seed = 42
//!
//! [histogram]
//! bins = 20
//! range_min = 0.0
//! range_max = 100.0
//!
//! [generator]
//! count = 100
//! seed = 7
//!
//! [generator.distribution]
//! type = "normal"
//! mean = 50.0
//! std_dev = 15.0
//! ```
//!
//! Every section and key is optional; missing values take the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stoplab_core::{GeneratorError, PayoffDistribution, SimulationConfig};
use thiserror::Error;

/// Default histogram bin count.
pub const DEFAULT_BINS: usize = 20;

/// Default number of generated payoffs.
pub const DEFAULT_PAYOFF_COUNT: usize = 100;

/// Errors from loading or validating an [`ExperimentConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("threshold must lie strictly between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("runs must be at least 1")]
    ZeroRuns,

    #[error("histogram bins must be at least 1")]
    ZeroBins,

    #[error("histogram range_min {min} must be below range_max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("invalid generator settings: {0}")]
    Generator(#[from] GeneratorError),
}

/// Histogram rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub bins: usize,
    /// Fixed lower edge; derived from the data when absent.
    pub range_min: Option<f64>,
    /// Fixed upper edge; derived from the data when absent.
    pub range_max: Option<f64>,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            range_min: None,
            range_max: None,
        }
    }
}

/// Payoff generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: Option<u64>,
    pub distribution: PayoffDistribution,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PAYOFF_COUNT,
            seed: None,
            distribution: PayoffDistribution::default(),
        }
    }
}

/// Complete configuration for an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub simulation: SimulationConfig,
    pub histogram: HistogramConfig,
    pub generator: GeneratorConfig,
}

impl ExperimentConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the parameter ranges the simulation core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_simulation(&self.simulation)?;
        validate_histogram(&self.histogram)?;
        if self.generator.count == 0 {
            return Err(GeneratorError::ZeroCount.into());
        }
        self.generator.distribution.validate()?;
        Ok(())
    }
}

pub fn validate_simulation(sim: &SimulationConfig) -> Result<(), ConfigError> {
    if !(sim.threshold > 0.0 && sim.threshold < 1.0) {
        return Err(ConfigError::InvalidThreshold(sim.threshold));
    }
    if sim.runs == 0 {
        return Err(ConfigError::ZeroRuns);
    }
    Ok(())
}

pub fn validate_histogram(hist: &HistogramConfig) -> Result<(), ConfigError> {
    if hist.bins == 0 {
        return Err(ConfigError::ZeroBins);
    }
    if let (Some(min), Some(max)) = (hist.range_min, hist.range_max) {
        if !(min < max) {
            return Err(ConfigError::InvalidRange { min, max });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ExperimentConfig::from_toml("").unwrap();
        assert_eq!(config, ExperimentConfig::default());
        assert_eq!(config.simulation.threshold, 0.37);
        assert_eq!(config.simulation.runs, 1000);
        assert_eq!(config.histogram.bins, 20);
        assert_eq!(config.generator.count, 100);
    }

    #[test]
    fn parses_full_config() {
        let toml_str = r#"
[simulation]
threshold = 0.5
runs = 250
seed = 42

[histogram]
bins = 10
range_min = 0.0
range_max = 100.0

[generator]
count = 30
seed = 7

[generator.distribution]
type = "normal"
mean = 50.0
std_dev = 15.0
"#;
        let config = ExperimentConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.simulation.threshold, 0.5);
        assert_eq!(config.simulation.runs, 250);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.histogram.range_max, Some(100.0));
        assert_eq!(
            config.generator.distribution,
            PayoffDistribution::Normal {
                mean: 50.0,
                std_dev: 15.0
            }
        );
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ExperimentConfig::default();
        config.simulation.seed = Some(9);
        config.histogram.range_min = Some(-5.0);
        config.histogram.range_max = Some(5.0);
        let text = config.to_toml().unwrap();
        assert_eq!(ExperimentConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn threshold_bounds_are_exclusive() {
        for bad in ["0.0", "1.0", "-0.2", "1.5"] {
            let toml_str = format!("[simulation]\nthreshold = {bad}\n");
            assert!(
                matches!(
                    ExperimentConfig::from_toml(&toml_str),
                    Err(ConfigError::InvalidThreshold(_))
                ),
                "threshold {bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_zero_runs_and_bins() {
        assert!(matches!(
            ExperimentConfig::from_toml("[simulation]\nruns = 0\n"),
            Err(ConfigError::ZeroRuns)
        ));
        assert!(matches!(
            ExperimentConfig::from_toml("[histogram]\nbins = 0\n"),
            Err(ConfigError::ZeroBins)
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let toml_str = "[histogram]\nrange_min = 10.0\nrange_max = 1.0\n";
        assert!(matches!(
            ExperimentConfig::from_toml(toml_str),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn rejects_bad_generator() {
        let toml_str = "[generator.distribution]\ntype = \"uniform\"\nlow = 3.0\nhigh = 1.0\n";
        assert!(matches!(
            ExperimentConfig::from_toml(toml_str),
            Err(ConfigError::Generator(GeneratorError::EmptyRange { .. }))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ExperimentConfig::from_file(Path::new("/nonexistent/stoplab.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stoplab.toml"));
    }
}
