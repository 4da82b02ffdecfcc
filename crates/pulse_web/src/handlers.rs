use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use pulse_core::{Article, IngestStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub company: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Article>>, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let articles = state
        .store
        .list_recent(query.company.as_deref(), limit)
        .await
        .map_err(|e| {
            error!("Failed to list articles: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(articles))
}

/// Kick off a background ingestion run. At most one run is in flight at a
/// time; a second trigger while one is running is acknowledged without
/// starting another.
pub async fn trigger_ingest(State(state): State<Arc<AppState>>) -> Json<Value> {
    {
        let mut status = state.status.write().await;
        if status.is_running() {
            info!("Ingestion already in flight, not starting another");
            return Json(json!({ "message": "Ingestion already running" }));
        }
        *status = IngestStatus::Running;
    }

    let ingestor = state.ingestor.clone();
    let status = state.status.clone();
    tokio::spawn(async move {
        let outcome = match ingestor.run().await {
            Ok(report) => IngestStatus::Completed {
                added: report.added,
                fetched: report.fetched,
                finished_at: Utc::now(),
            },
            Err(e) => {
                error!("Ingestion run failed: {}", e);
                IngestStatus::Failed {
                    error: e.to_string(),
                    finished_at: Utc::now(),
                }
            }
        };
        *status.write().await = outcome;
    });

    Json(json!({ "message": "Ingestion started" }))
}

pub async fn ingest_status(State(state): State<Arc<AppState>>) -> Json<IngestStatus> {
    Json(state.status.read().await.clone())
}
