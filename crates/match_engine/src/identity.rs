//! Team identity resolution — who is home, who is away.
//!
//! Signals, strongest first:
//!   1. the page palette (two team anchors, home first)
//!   2. the opening rally point (a 1–0 / 0–1 score tells which side scored)
//!   3. the first two distinct teams seen in the feed
//!
//! Each strategy either names both sides or yields nothing; the first one that
//! names both wins.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::feed::{RawEvent, TeamId};

pub const DEFAULT_HOME_NAME: &str = "Home";
pub const DEFAULT_AWAY_NAME: &str = "Away";

// ── Palette ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamColorEntry {
    /// `#RRGGBB`, `#RGB` or `transparent`
    pub color: String,
    pub name: String,
}

/// Ordered team-id → color/name map scraped from the match page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPalette {
    entries: Vec<(String, TeamColorEntry)>,
}

impl TeamPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A repeated id keeps its original position.
    pub fn insert(&mut self, team_id: impl Into<String>, entry: TeamColorEntry) {
        let team_id = team_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == team_id) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((team_id, entry)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TeamColorEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// `{"<id>": {"color": "...", "name": "..."}, ...}` in document order.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut palette = Self::new();
        for (id, entry) in obj {
            let Some(entry) = entry.as_object() else {
                continue;
            };
            let text = |key: &str| {
                entry
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            palette.insert(
                id.clone(),
                TeamColorEntry {
                    color: text("color"),
                    name: text("name"),
                },
            );
        }
        Some(palette)
    }
}

// ── Resolved identity ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: Option<TeamId>,
    pub name: String,
}

impl TeamRef {
    fn named(id: TeamId, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStrategy {
    Palette,
    OpeningPoint,
    FirstTwoDistinct,
}

pub const RESOLUTION_ORDER: [IdentityStrategy; 3] = [
    IdentityStrategy::Palette,
    IdentityStrategy::OpeningPoint,
    IdentityStrategy::FirstTwoDistinct,
];

impl IdentityStrategy {
    /// `(home, away)` when this strategy can name both sides.
    pub fn resolve(
        self,
        palette: Option<&TeamPalette>,
        events: &[RawEvent],
    ) -> Option<(TeamRef, TeamRef)> {
        let sides = match self {
            Self::Palette => palette.and_then(sides_from_palette),
            Self::OpeningPoint => sides_from_opening_point(events),
            Self::FirstTwoDistinct => sides_from_first_two(events),
        }?;
        // same team on both sides is no answer
        (sides.0.id != sides.1.id).then_some(sides)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamIdentity {
    pub home: TeamRef,
    pub away: TeamRef,
    /// Strategy that named the sides; `None` means placeholders.
    pub strategy: Option<IdentityStrategy>,
    colors: HashMap<String, String>,
}

impl TeamIdentity {
    pub fn color_of(&self, team: &TeamRef) -> Option<&str> {
        let id = team.id.as_ref()?;
        self.colors.get(&id.to_string()).map(String::as_str)
    }

    pub fn home_color(&self) -> Option<&str> {
        self.color_of(&self.home)
    }

    pub fn away_color(&self) -> Option<&str> {
        self.color_of(&self.away)
    }
}

pub fn resolve_identity(palette: Option<&TeamPalette>, events: &[RawEvent]) -> TeamIdentity {
    let colors = palette
        .map(|p| {
            p.iter()
                .filter(|(_, entry)| !entry.color.is_empty())
                .map(|(id, entry)| (id.to_string(), entry.color.clone()))
                .collect()
        })
        .unwrap_or_default();

    for strategy in RESOLUTION_ORDER {
        if let Some((home, away)) = strategy.resolve(palette, events) {
            debug!(?strategy, home = %home.name, away = %away.name, "team identity resolved");
            return TeamIdentity {
                home,
                away,
                strategy: Some(strategy),
                colors,
            };
        }
    }

    debug!("team identity unresolved, using placeholders");
    TeamIdentity {
        home: TeamRef {
            id: None,
            name: DEFAULT_HOME_NAME.to_string(),
        },
        away: TeamRef {
            id: None,
            name: DEFAULT_AWAY_NAME.to_string(),
        },
        strategy: None,
        colors,
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

fn sides_from_palette(palette: &TeamPalette) -> Option<(TeamRef, TeamRef)> {
    if palette.len() != 2 {
        return None;
    }
    let mut entries = palette.iter();
    let (home_id, home) = entries.next()?;
    let (away_id, away) = entries.next()?;

    let side = |id: &str, entry: &TeamColorEntry, fallback: &str| TeamRef {
        id: Some(TeamId::parse(id).unwrap_or_else(|| TeamId::Token(id.to_string()))),
        name: if entry.name.is_empty() {
            fallback.to_string()
        } else {
            entry.name.clone()
        },
    };
    Some((
        side(home_id, home, DEFAULT_HOME_NAME),
        side(away_id, away, DEFAULT_AWAY_NAME),
    ))
}

/// Latest (by feed position) point that opened a set decides the scorer's
/// side; the opponent is the first other named team in the feed.
fn sides_from_opening_point(events: &[RawEvent]) -> Option<(TeamRef, TeamRef)> {
    for event in events.iter().rev() {
        if !event.is_named_point() {
            continue;
        }
        let Some(score) = event.current_score else {
            continue;
        };
        let scorer_is_home = match (score.home, score.away) {
            (Some(1), Some(0)) => true,
            (Some(0), Some(1)) => false,
            _ => continue,
        };
        let scorer_id = event.team_id.clone()?;
        let opponent = events.iter().find(|e| {
            !e.team_name.is_empty() && e.team_id.as_ref().is_some_and(|id| *id != scorer_id)
        })?;
        let scorer = TeamRef::named(scorer_id, &event.team_name);
        let opponent = TeamRef::named(opponent.team_id.clone()?, &opponent.team_name);

        return Some(if scorer_is_home {
            (scorer, opponent)
        } else {
            (opponent, scorer)
        });
    }
    None
}

fn sides_from_first_two(events: &[RawEvent]) -> Option<(TeamRef, TeamRef)> {
    let mut seen: Vec<TeamRef> = Vec::with_capacity(2);
    for event in events {
        let Some(id) = event.team_id.as_ref() else {
            continue;
        };
        if event.team_name.is_empty() || seen.iter().any(|t| t.id.as_ref() == Some(id)) {
            continue;
        }
        seen.push(TeamRef::named(id.clone(), &event.team_name));
        if seen.len() == 2 {
            let away = seen.pop()?;
            let home = seen.pop()?;
            return Some((home, away));
        }
    }
    None
}
