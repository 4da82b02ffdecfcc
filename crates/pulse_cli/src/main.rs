use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pulse_client::{display_summary, ApiGateway, NewsFeed, DEFAULT_BASE_URL, EMPTY_STATE_MESSAGE};
use pulse_core::{ArticleStore, Summarizer, DEFAULT_COMPANIES};
use pulse_ingest::{BingNewsFeed, HeuristicSummarizer, HttpExtractor, Ingestor, RemoteSummarizer};
use pulse_storage::{MemoryStorage, SqliteStorage};
use pulse_web::{create_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const API_KEY_ENV: &str = "PULSE_API_KEY";

#[derive(Parser)]
#[command(author, version, about = "Company news aggregation service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StorageArgs {
    /// Storage backend: memory or sqlite
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Database path for the sqlite backend
    #[arg(long, default_value = "articles.db")]
    db: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
        /// Companies to track; repeat the flag to override the default set
        #[arg(long = "company")]
        companies: Vec<String>,
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Run one ingestion pass in the foreground
    Ingest {
        /// Companies to track; repeat the flag to override the default set
        #[arg(long = "company")]
        companies: Vec<String>,
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Print stored articles
    List {
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Fetch and print the feed from a running server
    Feed {
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        api_url: String,
        #[arg(long)]
        company: Option<String>,
        /// Trigger ingestion and re-fetch before printing
        #[arg(long)]
        sync: bool,
    },
}

impl StorageArgs {
    async fn build_store(&self) -> anyhow::Result<Arc<dyn ArticleStore>> {
        match self.storage.as_str() {
            "memory" => Ok(Arc::new(MemoryStorage::new())),
            "sqlite" => {
                let store = SqliteStorage::new(&self.db)
                    .await
                    .with_context(|| format!("opening {}", self.db.display()))?;
                Ok(Arc::new(store))
            }
            other => anyhow::bail!("Unknown storage backend: {}", other),
        }
    }
}

fn tracked_companies(override_set: Vec<String>) -> Vec<String> {
    if override_set.is_empty() {
        DEFAULT_COMPANIES.iter().map(|c| c.to_string()).collect()
    } else {
        override_set
    }
}

fn build_summarizer() -> Arc<dyn Summarizer> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => {
            info!("Using remote summarizer");
            Arc::new(RemoteSummarizer::new(key))
        }
        _ => {
            info!("{} not set, using heuristic summarizer", API_KEY_ENV);
            Arc::new(HeuristicSummarizer)
        }
    }
}

fn build_ingestor(store: Arc<dyn ArticleStore>, companies: Vec<String>) -> Ingestor {
    Ingestor::new(
        store,
        Arc::new(BingNewsFeed::new()),
        Arc::new(HttpExtractor::new()),
        build_summarizer(),
        companies,
    )
}

async fn serve(addr: SocketAddr, companies: Vec<String>, storage: StorageArgs) -> anyhow::Result<()> {
    let store = storage.build_store().await?;
    let ingestor = build_ingestor(store.clone(), tracked_companies(companies));
    let app = create_app(AppState::new(store, Arc::new(ingestor)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on {} (storage: {})", addr, storage.storage);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ingest(companies: Vec<String>, storage: StorageArgs) -> anyhow::Result<()> {
    let store = storage.build_store().await?;
    let ingestor = build_ingestor(store, tracked_companies(companies));
    let report = ingestor.run().await?;
    println!(
        "Ingestion complete: {} fetched, {} added, {} skipped",
        report.fetched, report.added, report.skipped
    );
    Ok(())
}

async fn list(company: Option<String>, limit: usize, storage: StorageArgs) -> anyhow::Result<()> {
    let store = storage.build_store().await?;
    let articles = store.list_recent(company.as_deref(), limit).await?;
    if articles.is_empty() {
        println!("No articles stored.");
        return Ok(());
    }
    for article in articles {
        println!(
            "{:10} {} {} ({})",
            article.company,
            article.published_at.format("%Y-%m-%d %H:%M"),
            article.title,
            article.url
        );
    }
    Ok(())
}

async fn feed(api_url: String, company: Option<String>, sync: bool) -> anyhow::Result<()> {
    let gateway = ApiGateway::with_base_url(&api_url)?;
    let feed = NewsFeed::new(Arc::new(gateway));

    feed.set_filter(company).await;
    if sync {
        println!("Syncing...");
        feed.sync().await;
    }

    let articles = feed.articles().await;
    if feed.is_empty_state().await {
        println!("{}", EMPTY_STATE_MESSAGE);
        return Ok(());
    }
    for article in &articles {
        println!(
            "[{}] {} - {}",
            article.company,
            article.title,
            article.published_at.format("%Y-%m-%d")
        );
        println!("    {}", display_summary(article));
        println!("    {}", article.url);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            addr,
            companies,
            storage,
        } => serve(addr, companies, storage).await,
        Commands::Ingest { companies, storage } => ingest(companies, storage).await,
        Commands::List {
            company,
            limit,
            storage,
        } => list(company, limit, storage).await,
        Commands::Feed {
            api_url,
            company,
            sync,
        } => feed(api_url, company, sync).await,
    }
}
