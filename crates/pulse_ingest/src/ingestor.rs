use chrono::{Duration, Utc};
use futures::future::join_all;
use pulse_core::{ArticleStore, IngestReport, NewArticle, Result, Summarizer};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::extract::ContentExtractor;
use crate::feed::{FeedItem, FeedProvider};
use crate::normalize::{canonicalize_url, content_hash, normalize_title, titles_similar, SIMILARITY_THRESHOLD};

/// Articles older than this are dropped at the start of every run.
const RETENTION_DAYS: i64 = 7;

/// The ingestion pipeline: fetch feeds per company, dedup, extract the page
/// body, summarize, store. A failing feed or item is logged and skipped;
/// only storage-wide failures abort the run.
pub struct Ingestor {
    store: Arc<dyn ArticleStore>,
    feed: Arc<dyn FeedProvider>,
    extractor: Arc<dyn ContentExtractor>,
    summarizer: Arc<dyn Summarizer>,
    companies: Vec<String>,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        feed: Arc<dyn FeedProvider>,
        extractor: Arc<dyn ContentExtractor>,
        summarizer: Arc<dyn Summarizer>,
        companies: Vec<String>,
    ) -> Self {
        Self {
            store,
            feed,
            extractor,
            summarizer,
            companies,
        }
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub async fn run(&self) -> Result<IngestReport> {
        info!("Starting ingestion for {} companies", self.companies.len());

        let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
        let pruned = self.store.prune_older_than(cutoff).await?;
        if pruned > 0 {
            info!("Pruned {} stale articles", pruned);
        }

        let candidates = self.collect_candidates().await;
        let mut report = IngestReport {
            fetched: candidates.len(),
            ..Default::default()
        };

        for item in candidates {
            match self.ingest_item(&item).await {
                Ok(true) => report.added += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!("Failed to ingest {}: {}", item.url, e);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Ingestion complete: {} fetched, {} added, {} skipped",
            report.fetched, report.added, report.skipped
        );
        Ok(report)
    }

    /// Fetch every company's feed and dedup across them: same canonical URL,
    /// same normalized title, or a fuzzy-similar title all collapse to the
    /// first entry seen.
    async fn collect_candidates(&self) -> Vec<FeedItem> {
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut seen_titles: Vec<String> = Vec::new();
        let mut candidates = Vec::new();

        let fetches = self
            .companies
            .iter()
            .map(|company| async move { (company, self.feed.fetch(company).await) });

        // Fetches run concurrently; dedup below keeps the company order, so
        // the first company to list a story wins.
        for (company, result) in join_all(fetches).await {
            let items = match result {
                Ok(items) => items,
                Err(e) => {
                    warn!("Feed fetch failed for {}: {}", company, e);
                    continue;
                }
            };
            debug!("Feed for {} returned {} items", company, items.len());

            for item in items {
                let url_norm = canonicalize_url(&item.url);
                let title_norm = normalize_title(&item.title);

                if seen_urls.contains(&url_norm) {
                    continue;
                }
                if seen_titles
                    .iter()
                    .any(|t| t == &title_norm || titles_similar(t, &title_norm, SIMILARITY_THRESHOLD))
                {
                    continue;
                }

                seen_urls.insert(url_norm);
                seen_titles.push(title_norm);
                candidates.push(item);
            }
        }

        candidates
    }

    /// Returns Ok(true) when the item was stored, Ok(false) when it was
    /// skipped as a duplicate or for having no usable content.
    async fn ingest_item(&self, item: &FeedItem) -> Result<bool> {
        let url_norm = canonicalize_url(&item.url);
        let title_norm = normalize_title(&item.title);

        if self.store.is_duplicate(&url_norm, &title_norm).await? {
            debug!("Already stored, skipping: {}", item.url);
            return Ok(false);
        }

        info!("Processing: {}", item.title);
        let content = self.extractor.extract(&item.url).await?;
        if content.is_empty() {
            debug!("No extractable content: {}", item.url);
            return Ok(false);
        }

        let hash = content_hash(&content);
        if self.store.has_content_hash(&hash).await? {
            debug!("Content already stored under another URL: {}", item.url);
            return Ok(false);
        }

        let summary = match self.summarizer.summarize(&content).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Summarization failed for {}: {}", item.url, e);
                None
            }
        };

        let article = NewArticle {
            company: item.company.clone(),
            title: item.title.clone(),
            title_norm,
            url: item.url.clone(),
            url_norm,
            source: item.source.clone(),
            content,
            content_hash: hash,
            summary,
            published_at: item.published_at,
        };

        // The store's unique constraints are the backstop for races between
        // overlapping runs; a rejection here counts as a skip.
        match self.store.insert(&article).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Store rejected {}: {}", article.url, e);
                Ok(false)
            }
        }
    }
}
