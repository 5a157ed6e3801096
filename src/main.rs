/// Scoreboard — live overlay for one match
///
/// What it does:
///   1. Reads the competition page (feed URL + team colors)
///   2. Polls the live feed and rebuilds the match state from scratch each time
///   3. Writes the overlay document atomically for the broadcast browser source
///
/// One-shot by default; `--daemon` keeps polling until the match ends or Ctrl+C.
///
/// Run:
///   cargo run --bin scoreboard-live -- "<page_url>?expandmatch=<id>" --daemon

use anyhow::{Context, Result};
use dotenv::dotenv;
use logger::EventLogger;
use overlay::render_summary;
use page_scraper::PageClient;
use poller::{CycleOutcome, Poller};
use scoreboard_live::config::{Config, USAGE};
use scoreboard_live::status;
use std::fs::{self, File};
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const EXIT_NO_FEED_URL: u8 = 1;
const EXIT_FETCH_FAILED: u8 = 2;
const EXIT_DECODE_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<ExitCode> {
    info!("=== Scoreboard — match {} ===", config.match_id);
    info!("Page: {}", config.page_url);
    info!("Output: {}", config.output.display());

    // Single poller per destination
    if let Some(dir) = config.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let lock_file_path = config.lock_path();
    let lock_file = File::create(&lock_file_path)
        .with_context(|| format!("create lock file {}", lock_file_path.display()))?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("Another poller is already writing {}! Exiting.", config.output.display());
            return Ok(ExitCode::SUCCESS);
        }
    };

    let mut poller = Poller::new(PageClient::new(), config.poller_config())
        .with_logger(EventLogger::new(&config.log_dir));

    if let Err(e) = poller.bootstrap().await {
        error!("Could not locate feed API URL: {e:#}");
        return Ok(ExitCode::from(EXIT_NO_FEED_URL));
    }
    info!("Feed API URL: {}", poller.api_url().unwrap_or("-"));

    if !config.daemon {
        return Ok(one_shot(&mut poller, &config).await);
    }

    if let Some(bind) = config.status_bind {
        let shared = poller.shared_state();
        tokio::spawn(async move {
            if let Err(e) = status::serve(bind, shared).await {
                warn!("status endpoint stopped: {e:#}");
            }
        });
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, stopping after the current cycle");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                warn!("Ctrl+C handler unavailable: {e}");
                // keep the sender alive so the poller is not stopped
                std::future::pending::<()>().await;
            }
        }
    });

    info!("Entering daemon mode. Press Ctrl+C to stop.");
    let reason = poller.run(stop_rx).await?;
    info!("Daemon finished: {reason:?}");
    Ok(ExitCode::SUCCESS)
}

async fn one_shot(poller: &mut Poller<PageClient>, config: &Config) -> ExitCode {
    match poller.run_once().await {
        Ok(CycleOutcome::Published(state)) => {
            if !config.no_summary {
                println!("{}", render_summary(&state));
            }
            info!("Scoreboard written to {}", config.output.display());
            ExitCode::SUCCESS
        }
        Ok(CycleOutcome::WriteFailed { error, .. }) => {
            error!("Could not write {}: {error}", config.output.display());
            ExitCode::FAILURE
        }
        Ok(CycleOutcome::Malformed) => ExitCode::SUCCESS,
        Ok(CycleOutcome::Expired(status)) => {
            error!("Feed rejected the request (HTTP {status})");
            ExitCode::from(EXIT_FETCH_FAILED)
        }
        Err(e) if e.downcast_ref::<serde_json::Error>().is_some() => {
            error!("Could not decode the feed as JSON: {e:#}");
            ExitCode::from(EXIT_DECODE_FAILED)
        }
        Err(e) => {
            error!("Error fetching feed data: {e:#}");
            ExitCode::from(EXIT_FETCH_FAILED)
        }
    }
}
