use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Article, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert an article, returning its assigned id.
    async fn insert(&self, article: &NewArticle) -> Result<i64>;

    /// List articles in reverse-chronological order, capped at `limit`.
    /// A company filter is a substring match against the company column.
    async fn list_recent(&self, company: Option<&str>, limit: usize) -> Result<Vec<Article>>;

    /// True when an article with the same normalized URL or normalized title
    /// is already stored.
    async fn is_duplicate(&self, url_norm: &str, title_norm: &str) -> Result<bool>;

    /// True when the content hash is already stored.
    async fn has_content_hash(&self, hash: &str) -> Result<bool>;

    /// Delete articles published before `cutoff`, returning how many went.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
