//! Configuration for the market tick engine
//!
//! All tunables are enumerated here; nothing is read from free-form maps.
//! A JSON file may override any subset of fields, the rest keep their defaults:
//!
//! ```json
//! {
//!   "drift": -0.004,
//!   "tiers": { "micro": { "max_swing": 0.2, "rug_probability": 0.03 } },
//!   "seed": 7
//! }
//! ```

use crate::domain::ModelParams;
use crate::error::ConfigError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use ticker_core::VolatilityTier;

/// Per-tier volatility bound and delisting probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierParams {
    /// Maximum absolute random move per tick (0.15 = 15%)
    pub max_swing: f64,
    /// Chance of a rug pull per tick
    pub rug_probability: f64,
}

impl TierParams {
    pub const fn new(max_swing: f64, rug_probability: f64) -> Self {
        Self {
            max_swing,
            rug_probability,
        }
    }
}

/// Parameters for every tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub micro: TierParams,
    pub mid: TierParams,
    pub large: TierParams,
    pub blue_chip: TierParams,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            micro: TierParams::new(0.15, 0.02),
            mid: TierParams::new(0.08, 0.005),
            large: TierParams::new(0.04, 0.0),
            blue_chip: TierParams::new(0.02, 0.0),
        }
    }
}

impl TierTable {
    pub fn params(&self, tier: VolatilityTier) -> TierParams {
        match tier {
            VolatilityTier::Micro => self.micro,
            VolatilityTier::Mid => self.mid,
            VolatilityTier::Large => self.large,
            VolatilityTier::BlueChip => self.blue_chip,
        }
    }

    pub fn params_mut(&mut self, tier: VolatilityTier) -> &mut TierParams {
        match tier {
            VolatilityTier::Micro => &mut self.micro,
            VolatilityTier::Mid => &mut self.mid,
            VolatilityTier::Large => &mut self.large,
            VolatilityTier::BlueChip => &mut self.blue_chip,
        }
    }
}

/// Root configuration for the tick engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub tiers: TierTable,
    /// Constant per-tick bias; negative values model long-run economy decay
    pub drift: f64,
    /// Fraction of the previous momentum carried into the next tick
    pub momentum_decay: f64,
    /// Scale of the momentum term relative to the tier's max swing
    pub momentum_weight: f64,
    /// Bound on |net pressure / market cap|
    pub pressure_clamp: f64,
    /// Maximum price samples kept per token
    pub history_capacity: usize,
    /// Trailing window of player trades that feed pressure
    pub trade_window_secs: i64,
    /// Lowest price an active token can reach
    pub price_floor: f64,
    /// How strongly large moves inflate simulated volume
    pub volume_sensitivity: f64,
    /// Tier used when a stored token has a missing or unknown tier
    pub fallback_tier: VolatilityTier,
    /// Master RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Tokens processed concurrently within one tick
    pub max_concurrency: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tiers: TierTable::default(),
            drift: -0.005,
            momentum_decay: 0.7,
            momentum_weight: 0.3,
            pressure_clamp: 0.05,
            history_capacity: 100,
            trade_window_secs: 600,
            price_floor: 0.000_001,
            volume_sensitivity: 10.0,
            fallback_tier: VolatilityTier::Mid,
            seed: None,
            max_concurrency: 16,
        }
    }
}

impl MarketConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Constants consumed by the price model
    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            drift: self.drift,
            momentum_decay: self.momentum_decay,
            momentum_weight: self.momentum_weight,
            pressure_clamp: self.pressure_clamp,
            price_floor: self.price_floor,
            volume_sensitivity: self.volume_sensitivity,
        }
    }

    pub fn trade_window(&self) -> Duration {
        Duration::seconds(self.trade_window_secs)
    }

    /// Check ranges and the tier risk ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tier in VolatilityTier::ALL {
            let params = self.tiers.params(tier);
            if !(0.0..1.0).contains(&params.max_swing) {
                return Err(ConfigError::Invalid(format!(
                    "{} max_swing must be in [0, 1), got {}",
                    tier, params.max_swing
                )));
            }
            if !(0.0..=1.0).contains(&params.rug_probability) {
                return Err(ConfigError::Invalid(format!(
                    "{} rug_probability must be in [0, 1], got {}",
                    tier, params.rug_probability
                )));
            }
            if let Some(safer) = tier.safer() {
                let safer_params = self.tiers.params(safer);
                if params.max_swing < safer_params.max_swing
                    || params.rug_probability < safer_params.rug_probability
                {
                    return Err(ConfigError::Invalid(format!(
                        "{} must be at least as risky as {}",
                        tier, safer
                    )));
                }
            }
        }

        if self.tiers.blue_chip.rug_probability != 0.0 {
            return Err(ConfigError::Invalid(
                "blue_chip rug_probability must be 0".to_string(),
            ));
        }
        if !self.drift.is_finite() || self.drift <= -1.0 {
            return Err(ConfigError::Invalid(format!(
                "drift must be finite and greater than -1, got {}",
                self.drift
            )));
        }
        if !(0.0..=1.0).contains(&self.momentum_decay) {
            return Err(ConfigError::Invalid(format!(
                "momentum_decay must be in [0, 1], got {}",
                self.momentum_decay
            )));
        }
        if !(self.momentum_weight >= 0.0 && self.momentum_weight.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "momentum_weight must be non-negative, got {}",
                self.momentum_weight
            )));
        }
        if !(self.pressure_clamp >= 0.0 && self.pressure_clamp.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "pressure_clamp must be non-negative, got {}",
                self.pressure_clamp
            )));
        }
        if !(self.price_floor > 0.0 && self.price_floor.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "price_floor must be positive, got {}",
                self.price_floor
            )));
        }
        if !(self.volume_sensitivity >= 0.0 && self.volume_sensitivity.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "volume_sensitivity must be non-negative, got {}",
                self.volume_sensitivity
            )));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.trade_window_secs <= 0 {
            return Err(ConfigError::Invalid(format!(
                "trade_window_secs must be positive, got {}",
                self.trade_window_secs
            )));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(MarketConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MarketConfig::from_json(
            r#"{ "drift": -0.004, "tiers": { "micro": { "max_swing": 0.2, "rug_probability": 0.03 } }, "seed": 7 }"#,
        )
        .unwrap();

        assert_eq!(config.drift, -0.004);
        assert_eq!(config.tiers.micro, TierParams::new(0.2, 0.03));
        assert_eq!(config.tiers.mid, TierTable::default().mid);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn test_fallback_tier_parses_from_tag() {
        let config = MarketConfig::from_json(r#"{ "fallback_tier": "large" }"#).unwrap();
        assert_eq!(config.fallback_tier, VolatilityTier::Large);
    }

    #[test]
    fn test_rejects_inverted_tier_risk() {
        let mut config = MarketConfig::default();
        config.tiers.mid.max_swing = 0.5;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("micro")));
    }

    #[test]
    fn test_rejects_blue_chip_rug_probability() {
        let mut config = MarketConfig::default();
        for tier in VolatilityTier::ALL {
            config.tiers.params_mut(tier).rug_probability = 0.01;
        }

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_history_capacity() {
        let config = MarketConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = MarketConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MarketConfig::from_file("/nonexistent/market.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
