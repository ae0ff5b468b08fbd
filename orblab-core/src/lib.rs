//! OrbLab Core — opening range breakout signal detection and trade simulation.
//!
//! This crate contains the engine and nothing that touches the filesystem:
//! - Domain types (bars, sessions, ranges, entry plans, trades, rejections)
//! - Indicators (ATR, session VWAP, EMA) behind a common trait
//! - Session windowing by wall-clock time
//! - Setup gates composed into a fixed-order chain
//! - Entry planning and pluggable exit rules
//! - Per-session evaluation and a sequential session runner

pub mod domain;
pub mod engine;
pub mod entry;
pub mod exit;
pub mod gates;
pub mod indicators;
pub mod params;
pub mod session;

pub use engine::{DayOutcome, OrbEngine, SessionOutcome, SessionRunner};
pub use params::{OrbParams, ParamsError, TimeWindow};
