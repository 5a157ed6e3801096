//! Runtime configuration: `.env` → environment → command line.

use anyhow::{bail, Context, Result};
use page_scraper::match_id_from_page_url;
use poller::PollerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT: &str = "html/scoreboard.xml";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const USAGE: &str = "usage: scoreboard-live <page_url?expandmatch=ID> [--daemon] [--output PATH] \
[--page-refresh-interval SECS] [--api-interval-ms MS] [--no-summary] [--dump-json PATH] [--force-lineup]";

/// Options that consume the following argument.
const VALUE_OPTIONS: [&str; 4] = ["--output", "--page-refresh-interval", "--api-interval-ms", "--dump-json"];

// ── Argument helpers ──────────────────────────────────────────────────────────

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// `--name value` or `--name=value`.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix) {
            if !v.trim().is_empty() {
                return Some(v.trim().to_string());
            }
        }
        if arg == name {
            if let Some(next) = args.get(idx + 1).filter(|n| !n.starts_with("--")) {
                return Some(next.clone());
            }
        }
    }
    None
}

/// Arguments that are neither options nor option values, in order.
pub fn positional(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = VALUE_OPTIONS.contains(&arg.as_str());
            continue;
        }
        out.push(arg.clone());
    }
    out
}

fn truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub page_url: String,
    pub match_id: String,
    pub output: PathBuf,
    pub page_refresh_secs: u64,
    pub api_interval_ms: u64,
    pub force_lineup: bool,
    pub dump_json: Option<PathBuf>,
    pub daemon: bool,
    pub no_summary: bool,
    pub status_bind: Option<SocketAddr>,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Command line wins over the environment.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let page_url = positional(args)
            .into_iter()
            .next()
            .or_else(|| env("SCOREBOARD_PAGE_URL"))
            .context("missing page URL")?;
        let Some(match_id) = match_id_from_page_url(&page_url) else {
            bail!("page URL must include an 'expandmatch' query parameter (e.g. ?expandmatch=123)");
        };

        let number = |flag: &str, key: &str, default: u64| -> Result<u64> {
            match flag_value(args, flag).or_else(|| env(key)) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{flag} expects a whole number, got {raw:?}")),
                None => Ok(default),
            }
        };
        let page_refresh_secs = number("--page-refresh-interval", "SCOREBOARD_PAGE_REFRESH_SECS", 60)?;
        let api_interval_ms = number("--api-interval-ms", "SCOREBOARD_API_INTERVAL_MS", 1000)?;
        if api_interval_ms == 0 {
            bail!("--api-interval-ms must be positive");
        }

        let status_bind = env("SCOREBOARD_STATUS_BIND")
            .map(|raw| raw.parse::<SocketAddr>().with_context(|| format!("bad SCOREBOARD_STATUS_BIND {raw:?}")))
            .transpose()?;

        Ok(Self {
            page_url,
            match_id,
            output: flag_value(args, "--output")
                .or_else(|| env("SCOREBOARD_OUTPUT"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            page_refresh_secs,
            api_interval_ms,
            force_lineup: has_flag(args, "--force-lineup")
                || env("SCOREBOARD_FORCE_LINEUP").is_some_and(|v| truthy(&v)),
            dump_json: flag_value(args, "--dump-json")
                .or_else(|| env("SCOREBOARD_DUMP_JSON"))
                .map(PathBuf::from),
            daemon: has_flag(args, "--daemon"),
            no_summary: has_flag(args, "--no-summary"),
            status_bind,
            log_dir: env("SCOREBOARD_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }

    pub fn poller_config(&self) -> PollerConfig {
        let mut config = PollerConfig::new(self.page_url.clone(), self.output.clone());
        config.page_refresh = Duration::from_secs(self.page_refresh_secs);
        config.api_interval = Duration::from_millis(self.api_interval_ms);
        config.force_roster = self.force_lineup;
        config.dump_json = self.dump_json.clone();
        config
    }

    /// Lock file guarding the output against a second poller.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.output.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }
}
