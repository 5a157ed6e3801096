//! Scoreboard — Page Scraper
//!
//! HTTP access to the competition page and the live feed, plus the HTML
//! extraction that turns a page into a feed URL and a team palette.

pub mod client;
pub mod extract;

pub use client::{FeedPoll, PageClient, PageSnapshot, BROWSER_USER_AGENT};
pub use extract::{extract_api_url, extract_team_palette, match_id_from_page_url, MATCH_QUERY_KEY};
