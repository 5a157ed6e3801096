//! Scoreboard — Overlay
//!
//! `MatchState` → overlay document (pure), plus the atomic file publish that is
//! the only side effect of a poll cycle.

pub mod color;
pub mod document;
pub mod summary;
pub mod writer;

pub use color::{is_transparent, Rgb, NEUTRAL_GRAY};
pub use document::{escape_text, render_overlay, OverlayBuilder, OverlayDocument};
pub use summary::render_summary;
pub use writer::{temporary_path, write_atomically, OverlayWriter};
