use serde::{Deserialize, Serialize};
use thiserror::Error;
use tsify_next::Tsify;

use crate::types::Price;

// ============================================================================
// Run configuration
// ============================================================================

/// Rejected configuration, raised before the first tick runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("agent_count must be positive")]
    AgentCount,
    #[error("tick_count must be positive")]
    TickCount,
    #[error("initial_cash must be positive, got {0}")]
    InitialCash(f64),
    #[error("initial_assets must be positive, got {0}")]
    InitialAssets(i64),
    #[error("std_dev must be positive, got {0}")]
    StdDev(f64),
    #[error("invalid config json: {0}")]
    Json(String),
}

/// Super parameters for one run. `avg_drift` is the only field allowed to
/// be zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct SimConfig {
    pub agent_count: u32,
    pub initial_cash: f64,
    pub initial_assets: i64,
    /// Mean of the Gaussian drift added to buy limits (negated for sells).
    pub avg_drift: f64,
    /// Spread of the limit-price drift around its mean.
    pub std_dev: f64,
    pub tick_count: u64,
    pub seed: u64,
    /// Progress sink cadence, in ticks.
    pub progress_every: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agent_count: 1000,
            initial_cash: 10_000.0,
            initial_assets: 100,
            avg_drift: 0.03,
            std_dev: 1.0,
            tick_count: 10_000,
            seed: 10,
            progress_every: 1000,
        }
    }
}

impl SimConfig {
    /// Fail fast on parameters that cannot seed a meaningful run.
    /// The `!(x > 0.0)` form also rejects NaN.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 {
            return Err(ConfigError::AgentCount);
        }
        if self.tick_count == 0 {
            return Err(ConfigError::TickCount);
        }
        if !(self.initial_cash > 0.0) {
            return Err(ConfigError::InitialCash(self.initial_cash));
        }
        if self.initial_assets <= 0 {
            return Err(ConfigError::InitialAssets(self.initial_assets));
        }
        if !(self.std_dev > 0.0) {
            return Err(ConfigError::StdDev(self.std_dev));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields fall back to
    /// the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Seed price for the first tick's bracket and drift terms: the price
    /// at which initial cash exactly buys initial assets.
    pub fn initial_price(&self) -> Price {
        self.initial_cash / self.initial_assets as f64
    }

    /// Stable label describing this run's parameters, used to name output
    /// directories and chart files.
    pub fn param_id(&self) -> String {
        format!(
            "agCount{}-avg{:.3}-std{:.3}-initCash{:.3}-initAss{}-tickCount{}-initPrice{:.3}",
            self.agent_count,
            self.avg_drift,
            self.std_dev,
            self.initial_cash,
            self.initial_assets,
            self.tick_count,
            self.initial_price(),
        )
    }
}
