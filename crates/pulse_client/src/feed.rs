use pulse_core::Article;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::gateway::{ArticleGateway, DEFAULT_LIMIT};

/// Heuristic wait between triggering ingestion and re-fetching. The server
/// gives no completion signal on the trigger itself; `sync_polling` is the
/// variant that asks instead of guessing.
pub const SYNC_DELAY: Duration = Duration::from_secs(5);

/// Ceiling for the polling backoff in `sync_polling`.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub const EMPTY_STATE_MESSAGE: &str = "No news found. Try hitting Sync News.";

const NO_SUMMARY_PLACEHOLDER: &str = "No summary available.";

#[derive(Default)]
struct FeedState {
    filter: Option<String>,
    articles: Vec<Article>,
    loading: bool,
    refreshing: bool,
}

/// View controller for the article list: holds the company filter, the
/// rendered collection, and the loading/refreshing flags. Clonable handle;
/// all methods take `&self` so loads and syncs can overlap the way they do
/// in a real view, with a generation counter making sure only the latest
/// filter's result ever lands.
#[derive(Clone)]
pub struct NewsFeed {
    gateway: Arc<dyn ArticleGateway>,
    state: Arc<RwLock<FeedState>>,
    generation: Arc<AtomicU64>,
    refresh_delay: Duration,
    limit: usize,
}

impl NewsFeed {
    pub fn new(gateway: Arc<dyn ArticleGateway>) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(FeedState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            refresh_delay: SYNC_DELAY,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Shorten (or stretch) the post-trigger wait. Tests use milliseconds.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Fetch articles for the current filter and replace the collection.
    /// A result that resolves after the filter has moved on is stale and is
    /// dropped; the newer load owns the flags from that point.
    pub async fn load(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let filter = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.filter.clone()
        };

        let articles = self.gateway.list_articles(filter.as_deref(), self.limit).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            state.articles = articles;
            state.loading = false;
        } else {
            debug!("Dropping stale fetch result for filter {:?}", filter);
        }
    }

    /// Select a company (or None for all) and reload. Any fetch still in
    /// flight for the previous filter is invalidated, not cancelled.
    pub async fn set_filter(&self, filter: Option<String>) {
        {
            let mut state = self.state.write().await;
            state.filter = filter;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.load().await;
    }

    /// Manual sync: trigger ingestion, wait the fixed delay, re-fetch once.
    /// The trigger's outcome does not change the flow; the re-fetch happens
    /// either way.
    pub async fn sync(&self) {
        self.state.write().await.refreshing = true;

        let accepted = self.gateway.trigger_ingestion().await;
        if !accepted {
            debug!("Ingestion trigger not accepted, re-fetching anyway");
        }
        tokio::time::sleep(self.refresh_delay).await;
        self.load().await;

        self.state.write().await.refreshing = false;
    }

    /// Sync that polls the server's job status instead of trusting a timer:
    /// trigger, then poll with doubling intervals until the job reports a
    /// terminal state or the attempt budget runs out, then re-fetch once.
    pub async fn sync_polling(&self, max_attempts: usize, initial_interval: Duration) {
        self.state.write().await.refreshing = true;

        let _ = self.gateway.trigger_ingestion().await;

        let mut interval = initial_interval;
        for attempt in 0..max_attempts {
            tokio::time::sleep(interval).await;
            match self.gateway.ingestion_status().await {
                Some(status) if status.is_terminal() => {
                    debug!("Ingestion terminal after {} poll(s): {:?}", attempt + 1, status);
                    break;
                }
                other => debug!("Poll {} saw {:?}", attempt + 1, other),
            }
            interval = std::cmp::min(interval.saturating_mul(2), MAX_POLL_INTERVAL);
        }

        self.load().await;
        self.state.write().await.refreshing = false;
    }

    pub async fn articles(&self) -> Vec<Article> {
        self.state.read().await.articles.clone()
    }

    pub async fn filter(&self) -> Option<String> {
        self.state.read().await.filter.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn is_refreshing(&self) -> bool {
        self.state.read().await.refreshing
    }

    /// True when a completed fetch left nothing to show. A failed fetch
    /// looks the same: the gateway collapses failures to an empty list.
    pub async fn is_empty_state(&self) -> bool {
        let state = self.state.read().await;
        !state.loading && state.articles.is_empty()
    }
}

/// Missing summaries are a presentation concern; the server leaves them null.
pub fn display_summary(article: &Article) -> &str {
    article.summary.as_deref().unwrap_or(NO_SUMMARY_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pulse_core::IngestStatus;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn article(company: &str, id: i64) -> Article {
        Article {
            id,
            company: company.to_string(),
            title: format!("{} story {}", company, id),
            url: format!("https://example.com/{}", id),
            source: "Example Wire".to_string(),
            summary: None,
            published_at: Utc::now(),
        }
    }

    #[derive(Default)]
    struct MockGateway {
        by_filter: HashMap<Option<String>, Vec<Article>>,
        delays: HashMap<Option<String>, Duration>,
        trigger_ok: bool,
        list_calls: AtomicUsize,
        trigger_calls: AtomicUsize,
        status_calls: AtomicUsize,
        last_filter: Mutex<Option<Option<String>>>,
        statuses: Mutex<VecDeque<Option<IngestStatus>>>,
    }

    #[async_trait]
    impl ArticleGateway for MockGateway {
        async fn list_articles(&self, company: Option<&str>, _limit: usize) -> Vec<Article> {
            let key = company.map(str::to_string);
            if let Some(delay) = self.delays.get(&key) {
                tokio::time::sleep(*delay).await;
            }
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_filter.lock().unwrap() = Some(key.clone());
            self.by_filter.get(&key).cloned().unwrap_or_default()
        }

        async fn trigger_ingestion(&self) -> bool {
            self.trigger_calls.fetch_add(1, Ordering::SeqCst);
            self.trigger_ok
        }

        async fn ingestion_status(&self) -> Option<IngestStatus> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Some(IngestStatus::Running))
        }
    }

    #[tokio::test]
    async fn filter_passes_through_and_replaces_collection() {
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([
                (None, vec![article("Apple", 1), article("Google", 2)]),
                (
                    Some("Google".to_string()),
                    vec![article("Google", 2), article("Google", 3), article("Google", 4)],
                ),
            ]),
            trigger_ok: true,
            ..Default::default()
        });
        let feed = NewsFeed::new(mock.clone());

        feed.load().await;
        assert_eq!(feed.articles().await.len(), 2);
        assert!(!feed.is_loading().await);

        feed.set_filter(Some("Google".to_string())).await;
        let articles = feed.articles().await;
        assert_eq!(articles.len(), 3);
        assert!(articles.iter().all(|a| a.company == "Google"));
        assert_eq!(
            *mock.last_filter.lock().unwrap(),
            Some(Some("Google".to_string()))
        );
        assert!(!feed.is_loading().await);
    }

    #[tokio::test]
    async fn loading_flag_spans_the_fetch() {
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([(None, vec![article("Meta", 1)])]),
            delays: HashMap::from([(None, Duration::from_millis(80))]),
            trigger_ok: true,
            ..Default::default()
        });
        let feed = NewsFeed::new(mock);

        let loader = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(feed.is_loading().await);

        loader.await.unwrap();
        assert!(!feed.is_loading().await);
        assert_eq!(feed.articles().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_result_shows_empty_state() {
        let feed = NewsFeed::new(Arc::new(MockGateway {
            trigger_ok: true,
            ..Default::default()
        }));
        feed.load().await;
        assert!(feed.is_empty_state().await);
        assert_eq!(EMPTY_STATE_MESSAGE, "No news found. Try hitting Sync News.");
    }

    #[tokio::test]
    async fn sync_triggers_once_and_refetches_after_delay() {
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([(None, vec![article("Apple", 1)])]),
            trigger_ok: true,
            ..Default::default()
        });
        let feed = NewsFeed::new(mock.clone()).with_refresh_delay(Duration::from_millis(80));

        let syncer = tokio::spawn({
            let feed = feed.clone();
            async move { feed.sync().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Inside the delay window: refreshing is set, no re-fetch yet.
        assert!(feed.is_refreshing().await);
        assert_eq!(mock.trigger_calls.load(Ordering::SeqCst), 1);
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 0);

        syncer.await.unwrap();
        assert!(!feed.is_refreshing().await);
        assert_eq!(mock.trigger_calls.load(Ordering::SeqCst), 1);
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(feed.articles().await.len(), 1);
    }

    #[tokio::test]
    async fn sync_completes_even_when_trigger_fails() {
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([(None, vec![article("Apple", 1)])]),
            trigger_ok: false,
            ..Default::default()
        });
        let feed = NewsFeed::new(mock.clone()).with_refresh_delay(Duration::from_millis(10));

        feed.sync().await;
        assert!(!feed.is_refreshing().await);
        assert_eq!(mock.trigger_calls.load(Ordering::SeqCst), 1);
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_fetch_result_is_discarded() {
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([
                (None, vec![article("Apple", 1), article("Meta", 2)]),
                (Some("Google".to_string()), vec![article("Google", 3)]),
            ]),
            // The unfiltered fetch is slow; the filtered one wins the race.
            delays: HashMap::from([(None, Duration::from_millis(120))]),
            trigger_ok: true,
            ..Default::default()
        });
        let feed = NewsFeed::new(mock);

        let slow_load = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        feed.set_filter(Some("Google".to_string())).await;

        let after_filter = feed.articles().await;
        assert_eq!(after_filter.len(), 1);
        assert_eq!(after_filter[0].company, "Google");

        // Let the slow unfiltered fetch land; it must not overwrite.
        slow_load.await.unwrap();
        let articles = feed.articles().await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].company, "Google");
        assert!(!feed.is_loading().await);
    }

    #[tokio::test]
    async fn polling_sync_stops_at_terminal_status() {
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([(None, vec![article("Apple", 1)])]),
            trigger_ok: true,
            statuses: Mutex::new(VecDeque::from([
                Some(IngestStatus::Running),
                Some(IngestStatus::Completed {
                    added: 1,
                    fetched: 1,
                    finished_at: Utc::now(),
                }),
            ])),
            ..Default::default()
        });
        let feed = NewsFeed::new(mock.clone());

        feed.sync_polling(5, Duration::from_millis(5)).await;
        assert_eq!(mock.status_calls.load(Ordering::SeqCst), 2);
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
        assert!(!feed.is_refreshing().await);
    }

    #[tokio::test]
    async fn polling_sync_is_bounded_without_terminal_status() {
        // Status never leaves Running (the mock's default); the attempt
        // budget caps the polling.
        let mock = Arc::new(MockGateway {
            by_filter: HashMap::from([(None, vec![article("Apple", 1)])]),
            trigger_ok: true,
            ..Default::default()
        });
        let feed = NewsFeed::new(mock.clone());

        feed.sync_polling(3, Duration::from_millis(5)).await;
        assert_eq!(mock.status_calls.load(Ordering::SeqCst), 3);
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
        assert!(!feed.is_refreshing().await);
        assert_eq!(feed.articles().await.len(), 1);
    }

    #[test]
    fn missing_summary_gets_placeholder() {
        let with_summary = Article {
            summary: Some("real summary".to_string()),
            ..article("Apple", 1)
        };
        assert_eq!(display_summary(&with_summary), "real summary");
        assert_eq!(display_summary(&article("Apple", 1)), "No summary available.");
    }
}
