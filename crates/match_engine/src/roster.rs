//! Roster builder.
//!
//! Lineup rows repeat (the feed lists a player once per appearance). Rows are
//! merged per person: the first non-empty jersey number sticks, the libero flag
//! follows the most recent row.

use serde::Serialize;
use std::collections::HashMap;

use crate::feed::{LineupRow, PersonId, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub number: String,
    pub name: String,
    pub libero: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub home: Vec<RosterEntry>,
    pub away: Vec<RosterEntry>,
}

#[derive(Debug, Default)]
struct SideRoster {
    index: HashMap<PersonId, usize>,
    entries: Vec<RosterEntry>,
}

impl SideRoster {
    fn merge(&mut self, person_id: PersonId, row: &LineupRow) {
        match self.index.get(&person_id) {
            Some(&slot) => {
                let existing = &mut self.entries[slot];
                if existing.number.is_empty() && !row.number.is_empty() {
                    existing.number = row.number.clone();
                }
                existing.libero = row.libero;
            }
            None => {
                self.index.insert(person_id, self.entries.len());
                self.entries.push(RosterEntry {
                    number: row.number.clone(),
                    name: row.name.clone(),
                    libero: row.libero,
                });
            }
        }
    }

    /// Jersey order; stable, so equal ranks keep first-seen order.
    fn finish(mut self) -> Vec<RosterEntry> {
        self.entries.sort_by_key(|entry| jersey_rank(&entry.number));
        self.entries
    }
}

/// Numeric jerseys first, ascending; anything unparsable after them.
fn jersey_rank(number: &str) -> (bool, i64) {
    match number.trim().parse::<i64>() {
        Ok(n) => (false, n),
        Err(_) => (true, 0),
    }
}

pub struct RosterBuilder {
    home_id: Option<TeamId>,
    away_id: Option<TeamId>,
    home: SideRoster,
    away: SideRoster,
}

impl RosterBuilder {
    pub fn new(home_id: Option<TeamId>, away_id: Option<TeamId>) -> Self {
        Self {
            home_id,
            away_id,
            home: SideRoster::default(),
            away: SideRoster::default(),
        }
    }

    /// Rows that are not named players, lack a person id, or belong to neither
    /// resolved team are ignored.
    pub fn add(&mut self, row: &LineupRow) {
        if !row.is_player() || row.name.is_empty() {
            return;
        }
        let Some(person_id) = row.person_id.clone() else {
            return;
        };
        let Some(team) = row.web_team_id.as_ref() else {
            return;
        };

        if self.home_id.as_ref() == Some(team) {
            self.home.merge(person_id, row);
        } else if self.away_id.as_ref() == Some(team) {
            self.away.merge(person_id, row);
        }
    }

    pub fn extend<'r>(&mut self, rows: impl IntoIterator<Item = &'r LineupRow>) {
        for row in rows {
            self.add(row);
        }
    }

    pub fn build(self) -> Roster {
        Roster {
            home: self.home.finish(),
            away: self.away.finish(),
        }
    }
}
