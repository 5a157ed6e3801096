//! Scoreboard — Match Engine
//!
//! Turns one raw live-feed document into a `MatchState` snapshot:
//!   feed + palette → identity → chronology → state machine
//!
//! Pure and synchronous. No I/O, no state kept between calls.

pub mod chronology;
pub mod feed;
pub mod identity;
pub mod roster;
pub mod state;

pub use chronology::{parse_event_timestamp, Chronology};
pub use feed::{ExternalId, GameState, LineupRow, LiveFeed, RawEvent, SetScore, TeamId};
pub use identity::{resolve_identity, IdentityStrategy, TeamColorEntry, TeamIdentity, TeamPalette, TeamRef};
pub use roster::{Roster, RosterBuilder, RosterEntry};
pub use state::{reconstruct, resolve_serving_team, roster_visible, Highlight, MatchState, SideState};

use serde_json::Value;

impl LiveFeed {
    /// Full pipeline over an already parsed feed.
    pub fn match_state(&self, palette: Option<&TeamPalette>, force_roster: bool) -> MatchState {
        let identity = resolve_identity(palette, &self.events);
        let chronology = Chronology::new(&self.events);
        reconstruct(
            &self.game,
            &self.events,
            &chronology,
            &identity,
            self.lineup.as_deref(),
            force_roster,
        )
    }
}

/// `None` means the document is structurally unusable; skip this cycle.
pub fn extract_match_state(
    doc: &Value,
    palette: Option<&TeamPalette>,
    force_roster: bool,
) -> Option<MatchState> {
    let feed = LiveFeed::from_value(doc)?;
    Some(feed.match_state(palette, force_roster))
}
