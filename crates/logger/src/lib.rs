/// Scoreboard — Logger
/// JSONL event stream, one file per UTC day

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open event log {}", path.display()))?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ───────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct PageRefreshEvent {
    pub ts:          String,
    pub event:       &'static str,   // "PAGE_REFRESH"
    pub page_url:    String,
    pub api_url:     Option<String>,
    pub teams_found: usize,
    pub forced:      bool,           // 401/403 on the feed
}

#[derive(Serialize, Debug)]
pub struct FeedStatusEvent {
    pub ts:      String,
    pub event:   &'static str,       // "FEED_STATUS"
    pub status:  String,             // "expired" | "error" | "malformed"
    pub detail:  String,
}

#[derive(Serialize, Debug)]
pub struct OverlayWrittenEvent {
    pub ts:          String,
    pub event:       &'static str,   // "OVERLAY_WRITTEN"
    pub path:        String,
    pub home:        String,
    pub away:        String,
    pub home_sets:   i64,
    pub away_sets:   i64,
    pub home_points: i64,
    pub away_points: i64,
}

#[derive(Serialize, Debug)]
pub struct MatchEndedEvent {
    pub ts:        String,
    pub event:     &'static str,     // "MATCH_ENDED"
    pub home:      String,
    pub away:      String,
    pub home_sets: i64,
    pub away_sets: i64,
}

#[derive(Serialize, Debug)]
pub struct DaemonStoppedEvent {
    pub ts:      String,
    pub event:   &'static str,       // "DAEMON_STOPPED"
    pub reason:  String,             // "match_ended" | "signal"
    pub cycles:  u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let logger = EventLogger::new(dir.path().join("logs"));
        for cycles in [1, 2] {
            logger
                .log(&DaemonStoppedEvent {
                    ts:     now_iso(),
                    event:  "DAEMON_STOPPED",
                    reason: "signal".into(),
                    cycles,
                })
                .expect("log");
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let text = fs::read_to_string(logger.log_dir().join(format!("{date}.jsonl"))).expect("read");
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["event"], "DAEMON_STOPPED");
        assert_eq!(lines[1]["cycles"], 2);
    }
}
