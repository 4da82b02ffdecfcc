use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_core::{Article, ArticleStore, Error, NewArticle, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        title_norm TEXT NOT NULL,
        url_norm TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        published_at TEXT NOT NULL,
        source TEXT NOT NULL,
        company TEXT NOT NULL,
        summary TEXT,
        content TEXT,
        CONSTRAINT uq_url_norm UNIQUE (url_norm)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS ix_content_hash ON articles (content_hash)",
    "CREATE INDEX IF NOT EXISTS ix_title_norm_company ON articles (title_norm, company)",
    // Add future migrations here
];

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SqliteStorage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
        let published_at: String = row.get("published_at");
        let published_at = DateTime::parse_from_rfc3339(&published_at)
            .map_err(|e| Error::Storage(format!("Bad timestamp in database: {}", e)))?
            .with_timezone(&Utc);

        Ok(Article {
            id: row.get("id"),
            company: row.get("company"),
            title: row.get("title"),
            url: row.get("url"),
            source: row.get("source"),
            summary: row.get("summary"),
            published_at,
        })
    }
}

#[async_trait]
impl ArticleStore for SqliteStorage {
    async fn insert(&self, article: &NewArticle) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (title, url, title_norm, url_norm, content_hash, published_at, source, company, summary, content)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.title_norm)
        .bind(&article.url_norm)
        .bind(&article.content_hash)
        .bind(article.published_at.to_rfc3339())
        .bind(&article.source)
        .bind(&article.company)
        .bind(article.summary.as_deref())
        .bind(&article.content)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to store article: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::Storage(format!(
                "Duplicate rejected by database: {}",
                article.url_norm
            )));
        }
        Ok(result.last_insert_rowid())
    }

    async fn list_recent(&self, company: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let rows = match company {
            Some(company) => {
                sqlx::query(
                    r#"
                    SELECT id, company, title, url, source, summary, published_at
                    FROM articles
                    WHERE instr(company, ?) > 0
                    ORDER BY published_at DESC
                    LIMIT ?
                    "#,
                )
                .bind(company)
                .bind(limit as i64)
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, company, title, url, source, summary, published_at
                    FROM articles
                    ORDER BY published_at DESC
                    LIMIT ?
                    "#,
                )
                .bind(limit as i64)
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(|e| Error::Storage(format!("Failed to list articles: {}", e)))?;

        rows.iter().map(Self::row_to_article).collect()
    }

    async fn is_duplicate(&self, url_norm: &str, title_norm: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE url_norm = ? OR title_norm = ? LIMIT 1")
            .bind(url_norm)
            .bind(title_norm)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Duplicate lookup failed: {}", e)))?;
        Ok(row.is_some())
    }

    async fn has_content_hash(&self, hash: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE content_hash = ? LIMIT 1")
            .bind(hash)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Hash lookup failed: {}", e)))?;
        Ok(row.is_some())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles WHERE published_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Prune failed: {}", e)))?;
        Ok(result.rows_affected())
    }
}
