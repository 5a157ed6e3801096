//! Where pages and feed documents come from.

use anyhow::Result;
use page_scraper::{FeedPoll, PageClient, PageSnapshot};
use std::future::Future;

/// Network seam of the driver. The live implementation is [`PageClient`].
pub trait MatchSource {
    fn fetch_page(&self, page_url: &str) -> impl Future<Output = Result<PageSnapshot>> + Send;
    fn fetch_feed(&self, api_url: &str) -> impl Future<Output = Result<FeedPoll>> + Send;
}

impl MatchSource for PageClient {
    async fn fetch_page(&self, page_url: &str) -> Result<PageSnapshot> {
        PageClient::fetch_page(self, page_url).await
    }

    async fn fetch_feed(&self, api_url: &str) -> Result<FeedPoll> {
        PageClient::fetch_feed(self, api_url).await
    }
}
