use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Error, Result};
use rss::Channel;
use url::Url;

/// One entry out of a news feed, before extraction and dedup.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub company: String,
    pub published_at: DateTime<Utc>,
}

#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetch the current feed entries for a company.
    async fn fetch(&self, company: &str) -> Result<Vec<FeedItem>>;
}

/// Bing News RSS, queried per company.
pub struct BingNewsFeed {
    http: reqwest::Client,
    base_url: String,
}

const BING_NEWS_BASE: &str = "https://www.bing.com/news/search";

impl BingNewsFeed {
    pub fn new() -> Self {
        Self::with_base_url(BING_NEWS_BASE)
    }

    /// Point the feed at a different endpoint. Used by tests and proxies.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn feed_url(&self, company: &str) -> Result<Url> {
        Url::parse_with_params(&self.base_url, &[("q", company), ("format", "rss")])
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }
}

impl Default for BingNewsFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedProvider for BingNewsFeed {
    async fn fetch(&self, company: &str) -> Result<Vec<FeedItem>> {
        let url = self.feed_url(company)?;
        tracing::debug!("Fetching feed for {} from {}", company, url);
        let body = self.http.get(url).send().await?.bytes().await?;
        parse_feed(&body, company)
    }
}

/// Decode an RSS payload into feed items tagged with the company the query
/// was for. Entries without a link are dropped; a missing pubDate falls back
/// to now, a missing source to "Unknown".
pub fn parse_feed(bytes: &[u8], company: &str) -> Result<Vec<FeedItem>> {
    let channel =
        Channel::read_from(bytes).map_err(|e| Error::Feed(format!("Bad RSS payload: {}", e)))?;

    let items = channel
        .items()
        .iter()
        .filter_map(|item| {
            let url = item.link()?.to_string();
            let title = item.title().unwrap_or_default().to_string();
            let published_at = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);
            let source = item
                .source()
                .and_then(|s| s.title())
                .unwrap_or("Unknown")
                .to_string();

            Some(FeedItem {
                title,
                url,
                source,
                company: company.to_string(),
                published_at,
            })
        })
        .collect();

    Ok(items)
}
