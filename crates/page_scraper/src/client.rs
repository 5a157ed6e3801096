//! Page and feed HTTP access.

use anyhow::{Context, Result};
use match_engine::TeamPalette;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::extract::{extract_api_url, extract_team_palette, match_id_from_page_url};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// What one page fetch yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub page_url: String,
    pub api_url: Option<String>,
    pub palette: TeamPalette,
}

impl PageSnapshot {
    pub fn from_html(page_url: &str, html: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
            api_url: extract_api_url(html),
            palette: extract_team_palette(html),
        }
    }

    pub fn match_id(&self) -> Option<String> {
        match_id_from_page_url(&self.page_url)
    }
}

/// Result of one feed request that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPoll {
    Document(Value),
    /// 401/403: the signed feed URL has expired; re-read the page.
    Expired(u16),
}

pub struct PageClient {
    client: reqwest::Client,
}

impl Default for PageClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PageClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub async fn fetch_page(&self, page_url: &str) -> Result<PageSnapshot> {
        info!("Fetching match page {}", page_url);
        let html = self
            .client
            .get(page_url)
            .send()
            .await
            .context("page request failed")?
            .error_for_status()
            .context("page request rejected")?
            .text()
            .await
            .context("page body unreadable")?;

        let snapshot = PageSnapshot::from_html(page_url, &html);
        debug!(
            api_url = snapshot.api_url.as_deref().unwrap_or("-"),
            teams = snapshot.palette.len(),
            "page parsed"
        );
        Ok(snapshot)
    }

    /// Transport errors, other HTTP errors and undecodable bodies are `Err`;
    /// a `serde_json::Error` stays reachable through `downcast_ref`.
    pub async fn fetch_feed(&self, api_url: &str) -> Result<FeedPoll> {
        let resp = self
            .client
            .get(api_url)
            .send()
            .await
            .context("feed request failed")?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(FeedPoll::Expired(status.as_u16()));
        }
        let body = resp
            .error_for_status()
            .context("feed request rejected")?
            .text()
            .await
            .context("feed body unreadable")?;
        let doc: Value = serde_json::from_str(&body).context("feed is not JSON")?;
        Ok(FeedPoll::Document(doc))
    }
}
