use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Article, ArticleStore, NewArticle, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

struct Stored {
    id: i64,
    article: NewArticle,
}

#[derive(Default)]
struct MemoryStore {
    articles: Vec<Stored>,
    next_id: i64,
}

impl MemoryStore {
    fn insert(&mut self, article: &NewArticle) -> i64 {
        self.next_id += 1;
        self.articles.push(Stored {
            id: self.next_id,
            article: article.clone(),
        });
        self.next_id
    }

    fn list_recent(&self, company: Option<&str>, limit: usize) -> Vec<Article> {
        let mut matching: Vec<&Stored> = self
            .articles
            .iter()
            .filter(|s| match company {
                Some(c) => s.article.company.contains(c),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.article.published_at.cmp(&a.article.published_at));
        matching
            .into_iter()
            .take(limit)
            .map(|s| Article {
                id: s.id,
                company: s.article.company.clone(),
                title: s.article.title.clone(),
                url: s.article.url.clone(),
                source: s.article.source.clone(),
                summary: s.article.summary.clone(),
                published_at: s.article.published_at,
            })
            .collect()
    }
}

/// In-memory store backed by an RwLock. The default backend; state lives for
/// the lifetime of the process only.
#[derive(Clone)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn insert(&self, article: &NewArticle) -> Result<i64> {
        let mut store = self.store.write().await;
        Ok(store.insert(article))
    }

    async fn list_recent(&self, company: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list_recent(company, limit))
    }

    async fn is_duplicate(&self, url_norm: &str, title_norm: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .any(|s| s.article.url_norm == url_norm || s.article.title_norm == title_norm))
    }

    async fn has_content_hash(&self, hash: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.articles.iter().any(|s| s.article.content_hash == hash))
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut store = self.store.write().await;
        let before = store.articles.len();
        store.articles.retain(|s| s.article.published_at >= cutoff);
        Ok((before - store.articles.len()) as u64)
    }
}
