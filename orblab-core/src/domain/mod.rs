//! Domain types for the ORB engine.

pub mod bar;
pub mod plan;
pub mod range;
pub mod rejection;
pub mod session;
pub mod trade;

pub use bar::{validate_history, Bar, BarError};
pub use plan::{EntryPlan, Side};
pub use range::{ConsolidationBase, OpeningRange};
pub use rejection::Rejection;
pub use session::{split_sessions, Session};
pub use trade::{ExitReason, TradeRecord, TradeResult};
