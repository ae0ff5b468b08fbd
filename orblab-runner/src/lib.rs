//! OrbLab Runner — backtest orchestration on top of `orblab-core`.
//!
//! This crate provides:
//! - TOML configuration with reference defaults and hard validation
//! - CSV bar loading and deterministic synthetic sessions
//! - Sequential or rayon-parallel backtest runs with rejection tallies
//! - Performance summary metrics
//! - Artifact export (CSV and JSON) keyed by run fingerprint

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_csv, load_synthetic, LoadError, LoadOptions, LoadedData};
pub use export::{load_artifacts, save_artifacts, RunSummary};
pub use metrics::{PerformanceSummary, SessionFunnel};
pub use runner::{run_backtest, BacktestResult, RunError, SCHEMA_VERSION};
