//! Backtest configuration — the TOML surface and its conversion to `OrbParams`.
//!
//! Every field has a default, so an empty file describes the reference
//! setup. Gate thresholds keep the "zero disables" convention here; the
//! conversion to `OrbParams` turns zero into `None`.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orblab_core::exit::ExitRuleKind;
use orblab_core::params::{threshold_from_surface, threshold_to_surface};
use orblab_core::{OrbParams, ParamsError, TimeWindow};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid time for {field}: '{value}' (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },
    #[error("start_date {start} is after end_date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub windows: WindowsSection,
    pub indicators: IndicatorsSection,
    pub gates: GatesSection,
    pub risk: RiskSection,
    pub exit: ExitSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    pub symbol: String,
    /// First calendar date to evaluate (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last calendar date to evaluate (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Evaluate sessions on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            start_date: None,
            end_date: None,
            parallel: false,
        }
    }
}

/// Wall-clock windows as `"HH:MM"` strings, inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsSection {
    pub or_start: String,
    pub or_end: String,
    pub base_start: String,
    pub base_end: String,
    pub trade_start: String,
    pub trade_end: String,
    pub flatten: String,
}

impl Default for WindowsSection {
    fn default() -> Self {
        Self {
            or_start: "09:30".into(),
            or_end: "09:35".into(),
            base_start: "09:35".into(),
            base_end: "09:45".into(),
            trade_start: "09:45".into(),
            trade_end: "15:30".into(),
            flatten: "15:55".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorsSection {
    pub atr_length: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
}

impl Default for IndicatorsSection {
    fn default() -> Self {
        Self {
            atr_length: 14,
            ema_fast: 9,
            ema_slow: 20,
        }
    }
}

/// Gate thresholds. Zero disables the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatesSection {
    pub or_width_min_atr: f64,
    pub or_width_max_atr: f64,
    pub base_tight_frac: f64,
    pub base_near_vwap_atr: f64,
    pub breakout_vol_mult: f64,
}

impl Default for GatesSection {
    fn default() -> Self {
        let p = OrbParams::default();
        Self {
            or_width_min_atr: threshold_to_surface(p.or_width_min_atr),
            or_width_max_atr: threshold_to_surface(p.or_width_max_atr),
            base_tight_frac: threshold_to_surface(p.base_tight_frac),
            base_near_vwap_atr: threshold_to_surface(p.base_near_vwap_atr),
            breakout_vol_mult: threshold_to_surface(p.breakout_vol_mult),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    /// Dollar risk per trade.
    pub risk_dollars: f64,
    pub target_r1: f64,
    pub target_r2: f64,
    /// Stop distance beyond VWAP, in ATR.
    pub stop_buffer_atr: f64,
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            risk_dollars: 250.0,
            target_r1: 2.0,
            target_r2: 3.0,
            stop_buffer_atr: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitSection {
    pub rule: ExitRuleKind,
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value.trim(), "%H:%M:%S"))
        .map_err(|_| ConfigError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

impl BacktestConfig {
    /// Read and parse a TOML file. Does not validate; see `to_params`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Render as TOML (used by `orblab config`).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Surface view of an internal parameter set.
    pub fn from_params(symbol: &str, params: &OrbParams, rule: ExitRuleKind) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.to_string(),
                ..BacktestSection::default()
            },
            windows: WindowsSection {
                or_start: format_time(params.or_window.start),
                or_end: format_time(params.or_window.end),
                base_start: format_time(params.base_window.start),
                base_end: format_time(params.base_window.end),
                trade_start: format_time(params.trade_window.start),
                trade_end: format_time(params.trade_window.end),
                flatten: format_time(params.flatten),
            },
            indicators: IndicatorsSection {
                atr_length: params.atr_length,
                ema_fast: params.ema_fast,
                ema_slow: params.ema_slow,
            },
            gates: GatesSection {
                or_width_min_atr: threshold_to_surface(params.or_width_min_atr),
                or_width_max_atr: threshold_to_surface(params.or_width_max_atr),
                base_tight_frac: threshold_to_surface(params.base_tight_frac),
                base_near_vwap_atr: threshold_to_surface(params.base_near_vwap_atr),
                breakout_vol_mult: threshold_to_surface(params.breakout_vol_mult),
            },
            risk: RiskSection {
                risk_dollars: params.risk_dollars,
                target_r1: params.target_r1,
                target_r2: params.target_r2,
                stop_buffer_atr: params.stop_buffer_atr,
            },
            exit: ExitSection { rule },
        }
    }

    /// Parse and validate into the engine's parameter set.
    ///
    /// Any problem here is a hard failure: nothing is silently defaulted.
    pub fn to_params(&self) -> Result<OrbParams, ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if let (Some(start), Some(end)) = (self.backtest.start_date, self.backtest.end_date) {
            if start > end {
                return Err(ConfigError::DateRange { start, end });
            }
        }

        let w = &self.windows;
        let params = OrbParams {
            or_window: TimeWindow::new(
                parse_time("or_start", &w.or_start)?,
                parse_time("or_end", &w.or_end)?,
            ),
            base_window: TimeWindow::new(
                parse_time("base_start", &w.base_start)?,
                parse_time("base_end", &w.base_end)?,
            ),
            trade_window: TimeWindow::new(
                parse_time("trade_start", &w.trade_start)?,
                parse_time("trade_end", &w.trade_end)?,
            ),
            flatten: parse_time("flatten", &w.flatten)?,
            atr_length: self.indicators.atr_length,
            ema_fast: self.indicators.ema_fast,
            ema_slow: self.indicators.ema_slow,
            or_width_min_atr: threshold_from_surface(self.gates.or_width_min_atr),
            or_width_max_atr: threshold_from_surface(self.gates.or_width_max_atr),
            base_tight_frac: threshold_from_surface(self.gates.base_tight_frac),
            base_near_vwap_atr: threshold_from_surface(self.gates.base_near_vwap_atr),
            breakout_vol_mult: threshold_from_surface(self.gates.breakout_vol_mult),
            risk_dollars: self.risk.risk_dollars,
            target_r1: self.risk.target_r1,
            target_r2: self.risk.target_r2,
            stop_buffer_atr: self.risk.stop_buffer_atr,
        };
        params.validate()?;
        Ok(params)
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Plain strings and numbers: JSON serialization cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_reference_defaults() {
        let config = BacktestConfig::from_toml_str("").unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.to_params().unwrap(), OrbParams::default());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = BacktestConfig::from_toml_str(
            r#"
            [backtest]
            symbol = "QQQ"
            start_date = "2024-01-02"

            [gates]
            base_tight_frac = 0
            or_width_max_atr = 4.0

            [exit]
            rule = "ema_trail"
            "#,
        )
        .unwrap();
        assert_eq!(config.backtest.symbol, "QQQ");
        assert_eq!(
            config.backtest.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(config.exit.rule, ExitRuleKind::EmaTrail);
        assert_eq!(config.indicators.atr_length, 14);

        let params = config.to_params().unwrap();
        assert_eq!(params.base_tight_frac, None);
        assert_eq!(params.or_width_max_atr, Some(4.0));
        assert_eq!(params.base_near_vwap_atr, Some(2.0));
    }

    #[test]
    fn integer_zero_threshold_parses() {
        // TOML integer where a float is expected must still mean "disabled".
        let config = BacktestConfig::from_toml_str("[gates]\nbase_near_vwap_atr = 0\n").unwrap();
        assert_eq!(config.to_params().unwrap().base_near_vwap_atr, None);
    }

    #[test]
    fn unparseable_time_is_hard_failure() {
        let mut config = BacktestConfig::default();
        config.windows.or_end = "9h35".into();
        assert!(matches!(
            config.to_params(),
            Err(ConfigError::InvalidTime { field: "or_end", .. })
        ));
    }

    #[test]
    fn seconds_are_accepted() {
        let mut config = BacktestConfig::default();
        config.windows.flatten = "15:55:00".into();
        assert!(config.to_params().is_ok());
    }

    #[test]
    fn invalid_params_surface_as_config_error() {
        let mut config = BacktestConfig::default();
        config.risk.target_r2 = 1.0;
        assert!(matches!(
            config.to_params(),
            Err(ConfigError::Params(ParamsError::TargetsInverted { .. }))
        ));

        let mut config = BacktestConfig::default();
        config.gates.base_tight_frac = -1.0;
        assert!(matches!(
            config.to_params(),
            Err(ConfigError::Params(ParamsError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn inverted_date_range_rejected() {
        let mut config = BacktestConfig::default();
        config.backtest.start_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        config.backtest.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(matches!(
            config.to_params(),
            Err(ConfigError::DateRange { .. })
        ));
    }

    #[test]
    fn unknown_exit_rule_rejected() {
        assert!(matches!(
            BacktestConfig::from_toml_str("[exit]\nrule = \"martingale\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = BacktestConfig::default();
        config.backtest.end_date = NaiveDate::from_ymd_opt(2024, 6, 28);
        config.exit.rule = ExitRuleKind::EmaTrail;
        let text = config.to_toml_string().unwrap();
        assert_eq!(BacktestConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn from_params_inverts_to_params() {
        let params = OrbParams::default();
        let config = BacktestConfig::from_params("SPY", &params, ExitRuleKind::ScaleOut);
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.to_params().unwrap(), params);
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = BacktestConfig::default();
        let mut b = a.clone();
        assert_eq!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 64);
        b.risk.risk_dollars = 500.0;
        assert_ne!(a.run_id(), b.run_id());
    }
}
