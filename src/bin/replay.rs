/// Scoreboard — offline replay
///
/// Renders the overlay from a saved feed document (e.g. a `--dump-json` file),
/// optionally with a palette file `{"<teamId>": {"color": "#RRGGBB", "name": "..."}}`.
///
/// Run:
///   cargo run --bin scoreboard-replay -- latest.json [palette.json] [--output out.xml] [--force-lineup]

use anyhow::{bail, Context, Result};
use match_engine::{extract_match_state, TeamPalette};
use overlay::{render_summary, OverlayWriter};
use scoreboard_live::config::{flag_value, has_flag, positional, DEFAULT_OUTPUT};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let inputs = positional(&args);
    let Some(feed_path) = inputs.first().map(PathBuf::from) else {
        bail!("usage: scoreboard-replay <feed.json> [palette.json] [--output PATH] [--force-lineup] [--no-summary]");
    };

    let palette = match inputs.get(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            Some(TeamPalette::from_value(&read_json(&path)?)
                .with_context(|| format!("{} is not a team palette object", path.display()))?)
        }
        None => None,
    };

    let doc = read_json(&feed_path)?;
    let Some(state) = extract_match_state(&doc, palette.as_ref(), has_flag(&args, "--force-lineup")) else {
        bail!("{} has no usable gamestate/events", feed_path.display());
    };

    let writer = OverlayWriter::new(flag_value(&args, "--output").unwrap_or_else(|| DEFAULT_OUTPUT.to_string()));
    writer.ensure_parent()?;
    writer.publish(&state)?;

    if !has_flag(&args, "--no-summary") {
        println!("{}", render_summary(&state));
    }
    info!("Scoreboard written to {}", writer.path().display());
    Ok(())
}
