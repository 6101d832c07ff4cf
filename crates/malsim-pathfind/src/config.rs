//! Configuration for the malsim simulation engine.

use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::estimate::{DEFAULT_MISS_PENALTY, DEFAULT_SAMPLES};

/// Top-level simulation configuration.
///
/// Loaded from `malsim.toml` `[simulation]` section or
/// `MALSIM_SIMULATION__` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Monte Carlo draws per TTC estimate (default: 100).
    #[serde(default = "default_ttc_samples")]
    pub ttc_samples: usize,

    /// Cost of the miss branch of a Bernoulli TTC (default: 500).
    #[serde(default = "default_miss_penalty")]
    pub miss_penalty: f64,

    /// Seed for every random source. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Lower bound of uniformly generated costs (default: 1).
    #[serde(default = "default_random_cost_min")]
    pub random_cost_min: u32,

    /// Upper bound of uniformly generated costs (default: 10).
    #[serde(default = "default_random_cost_max")]
    pub random_cost_max: u32,
}

fn default_ttc_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_miss_penalty() -> f64 {
    DEFAULT_MISS_PENALTY
}

fn default_random_cost_min() -> u32 {
    1
}

fn default_random_cost_max() -> u32 {
    10
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ttc_samples: default_ttc_samples(),
            miss_penalty: default_miss_penalty(),
            seed: None,
            random_cost_min: default_random_cost_min(),
            random_cost_max: default_random_cost_max(),
        }
    }
}

impl SimulationConfig {
    /// Load `<file_prefix>.toml` (optional) overlaid with environment variables.
    ///
    /// A missing file or `[simulation]` section yields the defaults.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("MALSIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SimError::Config(e.to_string()))?;

        let loaded = match cfg.get::<SimulationConfig>("simulation") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => SimulationConfig::default(),
            Err(e) => return Err(SimError::Config(e.to_string())),
        };
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttc_samples == 0 {
            return Err(SimError::Config("ttc_samples must be at least 1".to_string()));
        }
        if !(self.miss_penalty.is_finite() && self.miss_penalty >= 0.0) {
            return Err(SimError::Config(format!(
                "miss_penalty must be a non-negative number, got {}",
                self.miss_penalty
            )));
        }
        if self.random_cost_min > self.random_cost_max {
            return Err(SimError::Config(format!(
                "random_cost_min ({}) exceeds random_cost_max ({})",
                self.random_cost_min, self.random_cost_max
            )));
        }
        Ok(())
    }
}
