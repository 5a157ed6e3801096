//! Scoreboard — Poller
//!
//! Drives repeated cycles: page refresh (feed URL + palette) on its own
//! schedule, feed fetch every interval, reconstruct, publish.

pub mod driver;
pub mod source;

pub use driver::{CycleOutcome, Poller, PollerConfig, SharedState, StopReason};
pub use source::MatchSource;
