use async_trait::async_trait;
use pulse_core::{Article, Error, IngestStatus, Result};
use tracing::error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_LIMIT: usize = 50;

/// The view layer's handle on the news API. Implementations are fail-soft:
/// transport and decode failures collapse to safe defaults instead of
/// surfacing, so a flaky network can never crash the view.
#[async_trait]
pub trait ArticleGateway: Send + Sync {
    /// List articles, optionally filtered by company. Empty on any failure.
    async fn list_articles(&self, company: Option<&str>, limit: usize) -> Vec<Article>;

    /// Fire-and-forget ingestion trigger. True means the transport accepted
    /// the request, nothing more.
    async fn trigger_ingestion(&self) -> bool;

    /// Current state of the server's ingestion job, None on any failure.
    async fn ingestion_status(&self) -> Option<IngestStatus>;
}

/// HTTP implementation against the pulse API.
pub struct ApiGateway {
    http: reqwest::Client,
    base_url: String,
}

impl ApiGateway {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        // Validate once up front; per-request URLs are built from this.
        Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn articles_url(&self, company: Option<&str>, limit: usize) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/articles", self.base_url))
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &limit.to_string());
            // No filter means no company parameter at all.
            if let Some(company) = company {
                pairs.append_pair("company", company);
            }
        }
        Ok(url)
    }

    async fn fetch_articles(&self, company: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let url = self.articles_url(company, limit)?;
        let articles = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(articles)
    }

    async fn post_ingest(&self) -> Result<()> {
        // Body is not consumed; only transport acceptance matters.
        self.http
            .post(format!("{}/ingest", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn fetch_status(&self) -> Result<IngestStatus> {
        let status = self
            .http
            .get(format!("{}/ingest/status", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(status)
    }
}

#[async_trait]
impl ArticleGateway for ApiGateway {
    async fn list_articles(&self, company: Option<&str>, limit: usize) -> Vec<Article> {
        match self.fetch_articles(company, limit).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching articles: {}", e);
                Vec::new()
            }
        }
    }

    async fn trigger_ingestion(&self) -> bool {
        match self.post_ingest().await {
            Ok(()) => true,
            Err(e) => {
                error!("Ingestion trigger failed: {}", e);
                false
            }
        }
    }

    async fn ingestion_status(&self) -> Option<IngestStatus> {
        match self.fetch_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                error!("Ingestion status fetch failed: {}", e);
                None
            }
        }
    }
}
