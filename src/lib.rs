//! Scoreboard — live volleyball scoreboard overlay.
//!
//! Shared pieces of the `scoreboard-live` and `scoreboard-replay` binaries.

pub mod config;
pub mod status;
