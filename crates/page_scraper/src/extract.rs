//! HTML extraction over a fetched match page.
//!
//! The feed URL lives in a script embedded in a `wire:effects` attribute
//! (JSON, `scripts` map of script sources). Team colors come from the team
//! anchors in the match header; anchor order is home first.

use match_engine::{TeamColorEntry, TeamPalette};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

pub const MATCH_QUERY_KEY: &str = "expandmatch";

/// Longer anchor texts keep only their trailing words.
const MAX_NAME_WORDS: usize = 8;

static RE_API_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"apiurl:\s*'([^']*)'").unwrap());
static RE_TEAM_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/teams/(\d+)$").unwrap());
static RE_BACKGROUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)background-color:\s*([^;"\s]+)"#).unwrap());

static SEL_ANY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());
static SEL_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.w-full.flex.justify-around").unwrap());
static SEL_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Match id from the page URL's `expandmatch` query parameter (key matched
/// case-insensitively, anywhere in the query).
pub fn match_id_from_page_url(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    url.query_pairs()
        .find(|(key, value)| key.eq_ignore_ascii_case(MATCH_QUERY_KEY) && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// First `apiurl: '...'` found in any `wire:effects` script, in document
/// order. Payloads that are not JSON are skipped.
pub fn extract_api_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut checked = 0usize;

    for element in document.select(&SEL_ANY) {
        let Some(effects) = element.value().attr("wire:effects") else {
            continue;
        };
        checked += 1;
        let Ok(payload) = serde_json::from_str::<Value>(effects) else {
            continue;
        };
        let Some(scripts) = payload.get("scripts").and_then(Value::as_object) else {
            continue;
        };
        for script in scripts.values().filter_map(Value::as_str) {
            if let Some(caps) = RE_API_URL.captures(script) {
                debug!(attribute = checked, "feed URL found in wire:effects");
                return Some(clean_api_url(&caps[1]));
            }
        }
    }

    debug!(checked, "no feed URL in wire:effects attributes");
    None
}

/// Undo the JS string escaping the page applies to the URL.
fn clean_api_url(raw: &str) -> String {
    raw.replace("\\/", "/").replace("\\u0026", "&")
}

/// Ordered team-id → color/name map. Searches the match header when present,
/// otherwise the whole page. A repeated team id overwrites in place.
pub fn extract_team_palette(html: &str) -> TeamPalette {
    let document = Html::parse_document(html);
    let mut palette = TeamPalette::new();

    let anchors: Vec<ElementRef<'_>> = match document.select(&SEL_HEADER).next() {
        Some(header) => header.select(&SEL_ANCHOR).collect(),
        None => document.select(&SEL_ANCHOR).collect(),
    };

    for anchor in anchors {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(caps) = RE_TEAM_HREF.captures(href) else {
            continue;
        };
        let color = RE_BACKGROUND
            .captures(&anchor.inner_html())
            .map(|c| c[1].to_uppercase())
            .unwrap_or_else(|| "transparent".to_string());
        let name = anchor_name(anchor, &color);
        palette.insert(&caps[1], TeamColorEntry { color, name });
    }

    debug!(
        teams = palette.len(),
        colors = %palette.iter().map(|(id, e)| format!("{id}:{}", e.color)).collect::<Vec<_>>().join(", "),
        "team palette extracted"
    );
    palette
}

fn anchor_name(anchor: ElementRef<'_>, color: &str) -> String {
    let text = anchor.text().collect::<Vec<_>>().join(" ");
    let mut cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(rest) = cleaned.strip_prefix(color) {
        cleaned = rest.trim().to_string();
    }
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > MAX_NAME_WORDS {
        words[words.len() - MAX_NAME_WORDS..].join(" ")
    } else {
        cleaned
    }
}
