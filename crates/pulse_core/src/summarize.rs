use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize extracted article content.
    async fn summarize(&self, content: &str) -> Result<String>;
}
