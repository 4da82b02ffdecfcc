use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Companies tracked out of the box. The CLI can override the set.
pub const DEFAULT_COMPANIES: [&str; 4] = ["Microsoft", "Google", "Apple", "Meta"];

/// An article as served to clients. Server-owned; clients only render and
/// link out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub company: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// An article on its way into the store. Carries the full extracted content
/// and the normalized dedup keys, none of which ever leave the server.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub company: String,
    pub title: String,
    pub title_norm: String,
    pub url: String,
    pub url_norm: String,
    pub source: String,
    pub content: String,
    pub content_hash: String,
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Outcome of a single ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    /// Feed items seen across all companies, after cross-feed dedup.
    pub fetched: usize,
    /// Articles actually inserted.
    pub added: usize,
    /// Items skipped as duplicates or with no extractable content.
    pub skipped: usize,
}

/// State of the background ingestion job, served by `GET /ingest/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IngestStatus {
    Idle,
    Running,
    Completed {
        added: usize,
        fetched: usize,
        finished_at: DateTime<Utc>,
    },
    Failed {
        error: String,
        finished_at: DateTime<Utc>,
    },
}

impl IngestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestStatus::Completed { .. } | IngestStatus::Failed { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, IngestStatus::Running)
    }
}

impl Default for IngestStatus {
    fn default() -> Self {
        IngestStatus::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(!IngestStatus::Idle.is_terminal());
        assert!(!IngestStatus::Running.is_terminal());
        assert!(IngestStatus::Completed {
            added: 0,
            fetched: 0,
            finished_at: Utc::now()
        }
        .is_terminal());
        assert!(IngestStatus::Failed {
            error: "boom".to_string(),
            finished_at: Utc::now()
        }
        .is_terminal());
    }

    #[test]
    fn status_serializes_with_state_tag() {
        let json = serde_json::to_value(IngestStatus::Running).unwrap();
        assert_eq!(json["state"], "running");
    }

    #[test]
    fn article_wire_shape() {
        let article = Article {
            id: 7,
            company: "Google".to_string(),
            title: "Quarterly results".to_string(),
            url: "https://example.com/a".to_string(),
            source: "Example Wire".to_string(),
            summary: None,
            published_at: Utc::now(),
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["company"], "Google");
        assert!(json["summary"].is_null());
        assert!(json.get("published_at").is_some());
    }
}
