//! Raw live-feed shapes.
//!
//! The upstream API is loosely typed: ids arrive as numbers or strings, jersey
//! numbers as either, whole keys go missing between polls. Everything here is
//! read through `serde_json::Value` accessors so one odd field never sinks the
//! whole document. Only a missing `gamestate` object or `events` array makes a
//! feed unusable.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

// ── Identifiers ───────────────────────────────────────────────────────────────

/// External identifier as used by the feed for teams and persons.
///
/// All-digit strings are folded into `Num`, so `5` and `"5"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ExternalId {
    Num(i64),
    Token(String),
}

pub type TeamId = ExternalId;
pub type PersonId = ExternalId;

impl ExternalId {
    /// Parse a textual id. Empty text is no id at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return Some(Self::Num(n));
            }
        }
        Some(Self::Token(raw.to_string()))
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            {
                Some(n) => Some(Self::Num(n)),
                None => Some(Self::Token(n.to_string())),
            },
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Token(t) => f.write_str(t),
        }
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

pub(crate) fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text field; numbers are stringified (jersey numbers come both ways).
pub(crate) fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn flag_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Running rally-point score carried on every event (`{"home", "away"}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointScore {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

impl PointScore {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            home: int_field(obj, "home"),
            away: int_field(obj, "away"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub person_id: Option<PersonId>,
    pub name: String,
    pub number: String,
}

impl Person {
    /// An object with no id, name or number is no person.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let person = Self {
            person_id: obj.get("personId").and_then(ExternalId::from_value),
            name: text_field(obj, "name"),
            number: text_field(obj, "number"),
        };
        if person.person_id.is_none() && person.name.is_empty() && person.number.is_empty() {
            return None;
        }
        Some(person)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub team_id: Option<TeamId>,
    pub team_name: String,
    pub event_type_id: Option<i64>,
    pub goals: Option<i64>,
    pub current_score: Option<PointScore>,
    /// `created_at`, or `createdAt` when the former is absent or empty.
    pub timestamp: Option<String>,
    pub starts_match: bool,
    pub starts_period: bool,
    pub stops_period: bool,
    pub stops_match: bool,
    pub person: Option<Person>,
    pub description: String,
    pub period: Option<i64>,
}

impl RawEvent {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let timestamp = ["created_at", "createdAt"]
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .find(|ts| !ts.is_empty())
            .map(str::to_string);

        Some(Self {
            team_id: obj.get("teamId").and_then(ExternalId::from_value),
            team_name: text_field(obj, "teamName"),
            event_type_id: int_field(obj, "eventTypeId"),
            goals: int_field(obj, "goals"),
            current_score: obj.get("currentScore").and_then(PointScore::from_value),
            timestamp,
            starts_match: flag_field(obj, "startsMatch"),
            starts_period: flag_field(obj, "startsPeriod"),
            stops_period: flag_field(obj, "stopsPeriod"),
            stops_match: flag_field(obj, "stopsMatch"),
            person: obj.get("person").and_then(Person::from_value),
            description: text_field(obj, "description"),
            period: int_field(obj, "period"),
        })
    }

    /// A single rally point credited to a known, named team.
    pub fn is_named_point(&self) -> bool {
        self.goals == Some(1) && self.team_id.is_some() && !self.team_name.is_empty()
    }

    pub fn points(&self) -> (i64, i64) {
        let score = self.current_score.unwrap_or_default();
        (score.home.unwrap_or(0), score.away.unwrap_or(0))
    }
}

// ── Game state ────────────────────────────────────────────────────────────────

/// One entry of `currentSetScores`. Either side may be missing upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SetScore {
    #[serde(rename = "homeGoals")]
    pub home: Option<i64>,
    #[serde(rename = "awayGoals")]
    pub away: Option<i64>,
}

impl SetScore {
    fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(obj) => Self {
                home: int_field(obj, "homeGoals"),
                away: int_field(obj, "awayGoals"),
            },
            None => Self::default(),
        }
    }

    /// Both sides present.
    pub fn complete(&self) -> Option<(i64, i64)> {
        Some((self.home?, self.away?))
    }
}

/// Authoritative block of the feed. `currentScore` counts sets, not points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub home_sets: i64,
    pub away_sets: i64,
    pub set_scores: Vec<SetScore>,
    /// `teamIdServing`
    pub serving_team_id: Option<TeamId>,
    /// legacy `servingTeamId`
    pub legacy_serving_team_id: Option<TeamId>,
}

impl GameState {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let (home_sets, away_sets) = match obj.get("currentScore").and_then(Value::as_object) {
            Some(score) => (
                int_field(score, "homeGoals").unwrap_or(0),
                int_field(score, "awayGoals").unwrap_or(0),
            ),
            None => (0, 0),
        };
        let set_scores = obj
            .get("currentSetScores")
            .and_then(Value::as_array)
            .map(|sets| sets.iter().map(SetScore::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            home_sets,
            away_sets,
            set_scores,
            serving_team_id: obj.get("teamIdServing").and_then(ExternalId::from_value),
            legacy_serving_team_id: obj.get("servingTeamId").and_then(ExternalId::from_value),
        })
    }
}

// ── Lineup ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineupRow {
    pub web_team_id: Option<TeamId>,
    pub person_id: Option<PersonId>,
    pub kind: String,
    pub number: String,
    pub name: String,
    pub libero: bool,
}

impl LineupRow {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            web_team_id: obj.get("webTeamId").and_then(ExternalId::from_value),
            person_id: obj.get("personId").and_then(ExternalId::from_value),
            kind: text_field(obj, "type"),
            number: text_field(obj, "number"),
            name: text_field(obj, "name"),
            libero: flag_field(obj, "libero"),
        })
    }

    pub fn is_player(&self) -> bool {
        self.kind == "player"
    }
}

// ── Document ──────────────────────────────────────────────────────────────────

/// One poll worth of feed data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveFeed {
    pub game: GameState,
    /// Feed order, untouched.
    pub events: Vec<RawEvent>,
    /// `None` when the document carries no usable `lineup` array.
    pub lineup: Option<Vec<LineupRow>>,
}

impl LiveFeed {
    /// `None` when `gamestate` is not an object, `events` is not an array, or
    /// an event entry is not an object.
    pub fn from_value(doc: &Value) -> Option<Self> {
        let game = GameState::from_value(doc.get("gamestate")?)?;
        let events = doc
            .get("events")?
            .as_array()?
            .iter()
            .map(RawEvent::from_value)
            .collect::<Option<Vec<_>>>()?;
        let lineup = doc
            .get("lineup")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(LineupRow::from_value).collect());

        Some(Self { game, events, lineup })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_and_numbers_are_the_same_id() {
        assert_eq!(ExternalId::from_value(&json!(5)), ExternalId::from_value(&json!("5")));
        assert_eq!(ExternalId::parse("team-a"), Some(ExternalId::Token("team-a".into())));
        assert_eq!(ExternalId::parse("  "), None);
        assert_eq!(ExternalId::from_value(&Value::Null), None);
        assert_eq!(ExternalId::from_value(&json!(5.0)), Some(ExternalId::Num(5)));
        assert_eq!(ExternalId::from_value(&json!(5.5)), Some(ExternalId::Token("5.5".into())));
    }

    #[test]
    fn empty_person_is_absent() {
        let ev = RawEvent::from_value(&json!({"person": {}})).expect("object");
        assert_eq!(ev.person, None);
        let ev = RawEvent::from_value(&json!({"person": {"number": 4}})).expect("object");
        assert_eq!(ev.person.map(|p| p.number), Some("4".to_string()));
    }

    #[test]
    fn created_at_falls_back_to_camel_case() {
        let ev = RawEvent::from_value(&json!({"created_at": "", "createdAt": "2024-03-01T10:00:00Z"}))
            .expect("object");
        assert_eq!(ev.timestamp.as_deref(), Some("2024-03-01T10:00:00Z"));

        let ev = RawEvent::from_value(&json!({"created_at": null})).expect("object");
        assert_eq!(ev.timestamp, None);
    }

    #[test]
    fn event_fields_tolerate_odd_types() {
        let ev = RawEvent::from_value(&json!({
            "teamId": "12",
            "goals": "1",
            "currentScore": {"home": 3},
            "person": {"personId": 77, "name": "Ada", "number": 9},
            "stopsMatch": "yes",
        }))
        .expect("object");
        assert_eq!(ev.team_id, Some(ExternalId::Num(12)));
        assert_eq!(ev.goals, Some(1));
        assert_eq!(ev.points(), (3, 0));
        assert_eq!(ev.person.as_ref().map(|p| p.number.as_str()), Some("9"));
        assert!(!ev.stops_match);
    }

    #[test]
    fn malformed_structure_is_no_feed() {
        assert!(LiveFeed::from_value(&json!({"events": []})).is_none());
        assert!(LiveFeed::from_value(&json!({"gamestate": {}, "events": {}})).is_none());
        assert!(LiveFeed::from_value(&json!({"gamestate": [], "events": []})).is_none());
        assert!(LiveFeed::from_value(&json!({"gamestate": {}, "events": [1]})).is_none());
        assert!(LiveFeed::from_value(&json!(null)).is_none());
    }

    #[test]
    fn gamestate_defaults() {
        let feed = LiveFeed::from_value(&json!({
            "gamestate": {"currentSetScores": [{"homeGoals": 25, "awayGoals": 20}, {"homeGoals": 3}]},
            "events": [],
            "lineup": "n/a",
        }))
        .expect("valid");
        assert_eq!((feed.game.home_sets, feed.game.away_sets), (0, 0));
        assert_eq!(feed.game.set_scores[0].complete(), Some((25, 20)));
        assert_eq!(feed.game.set_scores[1].complete(), None);
        assert!(feed.lineup.is_none());
    }
}
