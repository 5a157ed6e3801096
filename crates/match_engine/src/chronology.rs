//! Event chronology — a total, stable order over the feed.
//!
//! Sort key: `(timestamp missing, timestamp, feed index)`. Events without a
//! usable timestamp go last, in feed order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::feed::RawEvent;

const OFFSET_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// ISO-8601 timestamp → UTC instant. `Z` means `+00:00`; a timestamp without
/// offset is read as UTC; a bare date is midnight.
pub fn parse_event_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Feed events in chronological order. Borrows the feed; never reorders it.
#[derive(Debug, Clone)]
pub struct Chronology<'a> {
    ordered: Vec<&'a RawEvent>,
}

impl<'a> Chronology<'a> {
    pub fn new(events: &'a [RawEvent]) -> Self {
        let mut keyed: Vec<(Option<DateTime<Utc>>, usize, &'a RawEvent)> = events
            .iter()
            .enumerate()
            .map(|(idx, ev)| (ev.timestamp.as_deref().and_then(parse_event_timestamp), idx, ev))
            .collect();
        keyed.sort_by_key(|(ts, idx, _)| (ts.is_none(), *ts, *idx));

        Self {
            ordered: keyed.into_iter().map(|(_, _, ev)| ev).collect(),
        }
    }

    pub fn earliest(&self) -> Option<&'a RawEvent> {
        self.ordered.first().copied()
    }

    pub fn latest(&self) -> Option<&'a RawEvent> {
        self.ordered.last().copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a RawEvent> + '_ {
        self.ordered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(description: &str, ts: Option<&str>) -> RawEvent {
        RawEvent {
            description: description.to_string(),
            timestamp: ts.map(str::to_string),
            ..RawEvent::default()
        }
    }

    fn order(chrono: &Chronology<'_>) -> Vec<String> {
        chrono.iter().map(|e| e.description.clone()).collect()
    }

    #[test]
    fn parses_common_iso_shapes() {
        let z = parse_event_timestamp("2024-05-04T18:30:00Z").expect("zulu");
        let offset = parse_event_timestamp("2024-05-04T20:30:00+02:00").expect("offset");
        assert_eq!(z, offset);
        assert!(parse_event_timestamp("2024-05-04T18:30:00.123456Z").is_some());
        assert!(parse_event_timestamp("2024-05-04T18:30:00.000000Z").is_some());
        assert_eq!(parse_event_timestamp("2024-05-04 18:30:00"), Some(z));
        assert!(parse_event_timestamp("2024-05-04").is_some());
        assert!(parse_event_timestamp("yesterday").is_none());
        assert!(parse_event_timestamp("").is_none());
    }

    #[test]
    fn minute_precision_with_offset() {
        let z = parse_event_timestamp("2024-05-04T18:30Z").expect("zulu, no seconds");
        assert_eq!(parse_event_timestamp("2024-05-04T18:30+00:00"), Some(z));
        assert_eq!(parse_event_timestamp("2024-05-04T20:30+02:00"), Some(z));
        assert_eq!(parse_event_timestamp("2024-05-04T18:30:00Z"), Some(z));

        let events = vec![
            event("later", Some("2024-05-04T18:31:00Z")),
            event("minute", Some("2024-05-04T18:30Z")),
            event("untimed", None),
        ];
        assert_eq!(order(&Chronology::new(&events)), ["minute", "later", "untimed"]);
    }

    #[test]
    fn valid_timestamps_sort_ascending_and_invalid_go_last() {
        let events = vec![
            event("no-ts-1", None),
            event("late", Some("2024-05-04T18:31:00Z")),
            event("garbage", Some("not a time")),
            event("early", Some("2024-05-04T18:29:00Z")),
            event("no-ts-2", None),
        ];
        let chrono = Chronology::new(&events);
        assert_eq!(order(&chrono), ["early", "late", "no-ts-1", "garbage", "no-ts-2"]);
        assert_eq!(chrono.earliest().map(|e| e.description.as_str()), Some("early"));
        assert_eq!(chrono.latest().map(|e| e.description.as_str()), Some("no-ts-2"));
    }

    #[test]
    fn equal_timestamps_keep_feed_order() {
        let ts = Some("2024-05-04T18:30:00Z");
        let events = vec![event("a", ts), event("b", ts), event("c", Some("2024-05-04T20:30:00+02:00"))];
        let first = order(&Chronology::new(&events));
        let second = order(&Chronology::new(&events));
        assert_eq!(first, ["a", "b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn timestamp_free_feed_keeps_feed_order() {
        let events = vec![event("x", None), event("y", None), event("z", None)];
        assert_eq!(order(&Chronology::new(&events)), ["x", "y", "z"]);
    }

    #[test]
    fn empty_feed_has_no_ends() {
        let chrono = Chronology::new(&[]);
        assert!(chrono.is_empty());
        assert!(chrono.earliest().is_none());
        assert!(chrono.latest().is_none());
    }
}
