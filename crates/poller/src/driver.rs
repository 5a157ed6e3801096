//! Polling driver.
//!
//! One cycle: fetch feed → (optional raw dump) → reconstruct → publish.
//! The page is re-read every `page_refresh`, or on the next cycle after the
//! feed answers 401/403. The loop ends on `matchEnded` or the stop signal.

use anyhow::{bail, Context, Result};
use logger::{
    now_iso, DaemonStoppedEvent, EventLogger, FeedStatusEvent, MatchEndedEvent, OverlayWrittenEvent,
    PageRefreshEvent,
};
use match_engine::{extract_match_state, MatchState, TeamPalette};
use overlay::{write_atomically, OverlayWriter};
use page_scraper::FeedPoll;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::source::MatchSource;

/// Latest published snapshot, readable by the status endpoint.
pub type SharedState = Arc<RwLock<Option<MatchState>>>;

/// Progress line every this many cycles.
const PROGRESS_EVERY: u64 = 10;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub page_url: String,
    pub output: PathBuf,
    pub page_refresh: Duration,
    pub api_interval: Duration,
    pub force_roster: bool,
    pub dump_json: Option<PathBuf>,
}

impl PollerConfig {
    pub fn new(page_url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            page_url: page_url.into(),
            output: output.into(),
            page_refresh: Duration::from_secs(60),
            api_interval: Duration::from_millis(1000),
            force_roster: false,
            dump_json: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Published(MatchState),
    /// Feed URL rejected (401/403); page refresh forced.
    Expired(u16),
    /// Feed decoded but structurally unusable; nothing written.
    Malformed,
    /// State reconstructed and shared, but the overlay write failed; the
    /// previous document is still on disk.
    WriteFailed { state: MatchState, error: String },
}

impl CycleOutcome {
    /// Snapshot reconstructed this cycle, written or not.
    pub fn state(&self) -> Option<&MatchState> {
        match self {
            Self::Published(state) | Self::WriteFailed { state, .. } => Some(state),
            Self::Expired(_) | Self::Malformed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MatchEnded,
    Signal,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::MatchEnded => "match_ended",
            Self::Signal => "signal",
        }
    }
}

pub struct Poller<S> {
    source: S,
    config: PollerConfig,
    writer: OverlayWriter,
    logger: Option<EventLogger>,
    shared: SharedState,
    api_url: Option<String>,
    palette: TeamPalette,
    last_refresh: Option<Instant>,
    cycles: u64,
}

impl<S: MatchSource> Poller<S> {
    pub fn new(source: S, config: PollerConfig) -> Self {
        let writer = OverlayWriter::new(config.output.clone());
        Self {
            source,
            config,
            writer,
            logger: None,
            shared: Arc::new(RwLock::new(None)),
            api_url: None,
            palette: TeamPalette::new(),
            last_refresh: None,
            cycles: 0,
        }
    }

    pub fn with_logger(mut self, logger: EventLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn shared_state(&self) -> SharedState {
        self.shared.clone()
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    pub fn palette(&self) -> &TeamPalette {
        &self.palette
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn log_event<T: serde::Serialize>(&self, event: &T) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log(event) {
                warn!("event log write failed: {e:#}");
            }
        }
    }

    fn refresh_due(&self) -> bool {
        self.last_refresh
            .map_or(true, |at| at.elapsed() >= self.config.page_refresh)
    }

    /// Re-read the page. A page without a feed URL or without team anchors
    /// keeps the previous value for that part.
    pub async fn refresh_page(&mut self) -> Result<()> {
        let forced = self.last_refresh.is_none() && self.api_url.is_some();
        // attempted refreshes count, so a failing page is retried on schedule
        self.last_refresh = Some(Instant::now());

        let snapshot = self.source.fetch_page(&self.config.page_url).await?;
        if let Some(url) = snapshot.api_url.clone() {
            self.api_url = Some(url);
        }
        if !snapshot.palette.is_empty() {
            self.palette = snapshot.palette.clone();
        }

        info!(
            teams = self.palette.len(),
            forced,
            "page refreshed (feed url {})",
            if snapshot.api_url.is_some() { "found" } else { "missing" }
        );
        self.log_event(&PageRefreshEvent {
            ts: now_iso(),
            event: "PAGE_REFRESH",
            page_url: self.config.page_url.clone(),
            api_url: snapshot.api_url,
            teams_found: snapshot.palette.len(),
            forced,
        });
        Ok(())
    }

    /// Initial page read. Fails when the page carries no feed URL.
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.writer.ensure_parent()?;
        self.refresh_page().await?;
        if self.api_url.is_none() {
            bail!("no feed API URL found on {}", self.config.page_url);
        }
        Ok(())
    }

    fn dump(&self, doc: &Value) {
        let Some(path) = &self.config.dump_json else {
            return;
        };
        let written = serde_json::to_string_pretty(doc)
            .context("serialize feed dump")
            .and_then(|text| write_atomically(path, &text));
        match written {
            Ok(()) => debug!(path = %path.display(), "raw feed dumped"),
            Err(e) => warn!("feed dump failed: {e:#}"),
        }
    }

    /// One feed fetch + publish. Transport and decode failures are `Err`.
    pub async fn run_once(&mut self) -> Result<CycleOutcome> {
        let Some(api_url) = self.api_url.clone() else {
            bail!("feed API URL not resolved yet");
        };

        let doc = match self.source.fetch_feed(&api_url).await? {
            FeedPoll::Document(doc) => doc,
            FeedPoll::Expired(status) => {
                warn!("feed answered {status}; forcing page refresh next cycle");
                self.last_refresh = None;
                self.log_event(&FeedStatusEvent {
                    ts: now_iso(),
                    event: "FEED_STATUS",
                    status: "expired".into(),
                    detail: format!("http_{status}"),
                });
                return Ok(CycleOutcome::Expired(status));
            }
        };
        self.dump(&doc);

        let Some(state) = extract_match_state(&doc, Some(&self.palette), self.config.force_roster) else {
            warn!("could not extract match state from feed document");
            self.log_event(&FeedStatusEvent {
                ts: now_iso(),
                event: "FEED_STATUS",
                status: "malformed".into(),
                detail: "gamestate/events missing or invalid".into(),
            });
            return Ok(CycleOutcome::Malformed);
        };

        *self.shared.write().await = Some(state.clone());
        if let Err(e) = self.writer.publish(&state) {
            let error = format!("{e:#}");
            warn!("overlay write failed: {error}");
            self.log_event(&FeedStatusEvent {
                ts: now_iso(),
                event: "FEED_STATUS",
                status: "write_failed".into(),
                detail: error.clone(),
            });
            return Ok(CycleOutcome::WriteFailed { state, error });
        }
        self.log_event(&OverlayWrittenEvent {
            ts: now_iso(),
            event: "OVERLAY_WRITTEN",
            path: self.writer.path().display().to_string(),
            home: state.home.name.clone(),
            away: state.away.name.clone(),
            home_sets: state.home.sets_won,
            away_sets: state.away.sets_won,
            home_points: state.home.current_points,
            away_points: state.away.current_points,
        });
        Ok(CycleOutcome::Published(state))
    }

    /// Daemon loop. Cycle errors are logged and retried next interval; a
    /// closed stop channel counts as a stop request.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> Result<StopReason> {
        info!(
            "Polling {} every {:?} (page refresh {:?}) → {}",
            self.config.page_url,
            self.config.api_interval,
            self.config.page_refresh,
            self.writer.path().display()
        );

        let reason = loop {
            if *stop.borrow() {
                break StopReason::Signal;
            }

            if self.refresh_due() {
                if let Err(e) = self.refresh_page().await {
                    warn!("page refresh failed: {e:#}");
                }
            }

            match self.run_once().await {
                Ok(outcome) => {
                    let written = matches!(outcome, CycleOutcome::Published(_));
                    if let Some(state) = outcome.state() {
                        if written && self.cycles % PROGRESS_EVERY == 0 {
                            info!(
                                "Updated scoreboard (home {} - away {})",
                                state.home.current_points, state.away.current_points
                            );
                        }
                        if state.match_ended {
                            info!("Match has ended, stopping");
                            self.log_event(&MatchEndedEvent {
                                ts: now_iso(),
                                event: "MATCH_ENDED",
                                home: state.home.name.clone(),
                                away: state.away.name.clone(),
                                home_sets: state.home.sets_won,
                                away_sets: state.away.sets_won,
                            });
                            self.cycles += 1;
                            break StopReason::MatchEnded;
                        }
                    }
                }
                Err(e) => {
                    warn!("cycle failed: {e:#}");
                    self.log_event(&FeedStatusEvent {
                        ts: now_iso(),
                        event: "FEED_STATUS",
                        status: "error".into(),
                        detail: format!("{e:#}"),
                    });
                }
            }
            self.cycles += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.config.api_interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break StopReason::Signal;
                    }
                }
            }
        };

        info!(cycles = self.cycles, "Poller stopped ({})", reason.as_str());
        self.log_event(&DaemonStoppedEvent {
            ts: now_iso(),
            event: "DAEMON_STOPPED",
            reason: reason.as_str().into(),
            cycles: self.cycles,
        });
        Ok(reason)
    }
}
