//! Match state machine — one snapshot per poll.
//!
//! Inputs are the authoritative `gamestate`, the chronologically normalized
//! event log, the resolved identity and (optionally) the lineup. Nothing is
//! carried between polls.

use serde::Serialize;

use crate::chronology::Chronology;
use crate::feed::{GameState, LineupRow, RawEvent, SetScore, TeamId};
use crate::identity::{TeamIdentity, TeamRef};
use crate::roster::{Roster, RosterBuilder};

pub const EVENT_ATTACK: i64 = 468;
pub const EVENT_BLOCK: i64 = 469;
pub const EVENT_SERVICE_ACE: i64 = 470;

pub const HIGHLIGHT_EVENT_TYPES: [i64; 3] = [EVENT_ATTACK, EVENT_BLOCK, EVENT_SERVICE_ACE];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideState {
    pub id: Option<TeamId>,
    pub name: String,
    pub color: Option<String>,
    pub sets_won: i64,
    pub current_points: i64,
    pub is_serving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub description: String,
    pub player_name: String,
    pub player_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub home: SideState,
    pub away: SideState,
    pub match_started: bool,
    pub in_set: bool,
    pub match_ended: bool,
    /// Present only while the lineup should be on screen.
    pub roster: Option<Roster>,
    pub highlight: Option<Highlight>,
    pub set_scores: Vec<SetScore>,
}

/// Lineup goes on screen before the match, between sets, or on demand.
pub fn roster_visible(force_roster: bool, match_started: bool, in_set: bool) -> bool {
    force_roster || !match_started || !in_set
}

/// Serving team: `teamIdServing`, then legacy `servingTeamId`, then the team
/// of the last single-point event in *feed* order (not chronological order).
pub fn resolve_serving_team(game: &GameState, raw_events: &[RawEvent]) -> Option<TeamId> {
    game.serving_team_id
        .clone()
        .or_else(|| game.legacy_serving_team_id.clone())
        .or_else(|| {
            raw_events
                .iter()
                .rev()
                .find(|ev| ev.goals == Some(1) && ev.team_id.is_some())
                .and_then(|ev| ev.team_id.clone())
        })
}

fn match_started(game: &GameState, chronology: &Chronology<'_>) -> bool {
    chronology.earliest().is_some_and(|ev| ev.starts_match) || game.home_sets > 0 || game.away_sets > 0
}

/// Most recent period boundary decides.
fn in_set(chronology: &Chronology<'_>) -> bool {
    for ev in chronology.iter().rev() {
        if ev.starts_period {
            return true;
        }
        if ev.stops_period {
            return false;
        }
    }
    false
}

fn highlight(latest: Option<&RawEvent>) -> Option<Highlight> {
    let ev = latest?;
    if !ev.event_type_id.is_some_and(|t| HIGHLIGHT_EVENT_TYPES.contains(&t)) {
        return None;
    }
    let person = ev.person.as_ref()?;
    Some(Highlight {
        description: ev.description.clone(),
        player_name: person.name.clone(),
        player_number: person.number.clone(),
    })
}

fn side(
    team: &TeamRef,
    identity: &TeamIdentity,
    sets_won: i64,
    current_points: i64,
    serving: Option<&TeamId>,
) -> SideState {
    SideState {
        id: team.id.clone(),
        name: team.name.clone(),
        color: identity.color_of(team).map(str::to_string),
        sets_won,
        current_points,
        is_serving: serving.is_some() && serving == team.id.as_ref(),
    }
}

/// Reconstruct the snapshot. `raw_events` is the feed in its original order
/// and `chronology` its normalized view.
pub fn reconstruct(
    game: &GameState,
    raw_events: &[RawEvent],
    chronology: &Chronology<'_>,
    identity: &TeamIdentity,
    lineup: Option<&[LineupRow]>,
    force_roster: bool,
) -> MatchState {
    let match_started = match_started(game, chronology);
    let in_set = in_set(chronology);
    let match_ended = raw_events.iter().any(|ev| ev.stops_match);
    let latest = chronology.latest();
    let (home_points, away_points) = latest.map(RawEvent::points).unwrap_or((0, 0));
    let serving = resolve_serving_team(game, raw_events);

    let roster = lineup
        .filter(|_| roster_visible(force_roster, match_started, in_set))
        .map(|rows| {
            let mut builder = RosterBuilder::new(identity.home.id.clone(), identity.away.id.clone());
            builder.extend(rows);
            builder.build()
        });

    MatchState {
        home: side(&identity.home, identity, game.home_sets, home_points, serving.as_ref()),
        away: side(&identity.away, identity, game.away_sets, away_points, serving.as_ref()),
        match_started,
        in_set,
        match_ended,
        roster,
        highlight: highlight(latest),
        set_scores: game.set_scores.clone(),
    }
}
