//! Configuration structures for the marketsim backtester.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the backtester.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Order replay configuration.
    pub simulation: SimulationConfig,
    /// Fund vs benchmark analysis configuration.
    pub analysis: AnalysisConfig,
    /// Allocation search configuration.
    pub optimizer: OptimizerConfig,
    /// Trading calendar selection.
    pub calendar: CalendarConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections and fields
    /// take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.simulation.initial_cash.is_finite() {
            return Err(Error::config("simulation.initial_cash must be finite"));
        }
        if self.analysis.trading_days_per_year == 0 {
            return Err(Error::config("analysis.trading_days_per_year must be positive"));
        }
        if self.optimizer.granularity == 0 {
            return Err(Error::config("optimizer.granularity must be positive"));
        }
        Ok(())
    }
}

/// Order replay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Starting cash balance.
    pub initial_cash: f64,
    /// Allow cash to go below zero (unmodelled margin).
    pub allow_negative_cash: bool,
    /// Allow sells that leave a negative share count.
    pub allow_short_positions: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: 1_000_000.0,
            allow_negative_cash: true,
            allow_short_positions: true,
        }
    }
}

/// Fund vs benchmark analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Periods per year used to annualize the Sharpe ratio.
    pub trading_days_per_year: u32,
    /// Benchmark symbol.
    pub benchmark: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            benchmark: "$SPX".to_string(),
        }
    }
}

/// Allocation search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Number of allocation steps per unit (10 = 10% increments).
    pub granularity: u32,
    /// Number of parallel workers (0 = auto).
    pub workers: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            granularity: 10,
            workers: 0,
        }
    }
}

/// Which trading calendar drives the session list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// Rule-based NYSE session calendar.
    #[default]
    Nyse,
    /// Sessions are the dates present in the price table.
    PriceTable,
}

/// Trading calendar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Calendar implementation.
    pub kind: CalendarKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.simulation.initial_cash, 1_000_000.0);
        assert!(config.simulation.allow_negative_cash);
        assert!(config.simulation.allow_short_positions);
        assert_eq!(config.analysis.trading_days_per_year, 252);
        assert_eq!(config.optimizer.granularity, 10);
        assert_eq!(config.calendar.kind, CalendarKind::Nyse);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"simulation": {"allow_short_positions": false}, "calendar": {"kind": "price_table"}}"#,
        )
        .unwrap();
        assert!(!config.simulation.allow_short_positions);
        assert!(config.simulation.allow_negative_cash);
        assert_eq!(config.simulation.initial_cash, 1_000_000.0);
        assert_eq!(config.calendar.kind, CalendarKind::PriceTable);
    }

    #[test]
    fn test_zero_granularity_rejected() {
        let mut config = Config::default();
        config.optimizer.granularity = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
