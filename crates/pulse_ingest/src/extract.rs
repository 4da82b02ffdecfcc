use async_trait::async_trait;
use pulse_core::Result;
use scraper::{Html, Selector};

/// Minimum body length for a page to count as having real content.
const MIN_CONTENT_CHARS: usize = 200;
/// Cap on stored content, to keep summaries and the database bounded.
const MAX_CONTENT_CHARS: usize = 15_000;

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Fetch a page and return its main text, or an empty string when the
    /// page has no usable body.
    async fn extract(&self, url: &str) -> Result<String>;
}

pub struct HttpExtractor {
    http: reqwest::Client,
}

impl HttpExtractor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let html = self.http.get(url).send().await?.text().await?;
        Ok(extract_text(&html))
    }
}

/// Pull paragraph text out of an HTML document. Too-short bodies come back
/// empty so callers can skip the article; long ones are truncated.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let paragraphs = Selector::parse("p").expect("static selector");

    let text = document
        .select(&paragraphs)
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.chars().count() <= MIN_CONTENT_CHARS {
        return String::new();
    }
    if text.chars().count() > MAX_CONTENT_CHARS {
        return text.chars().take(MAX_CONTENT_CHARS).collect();
    }
    text
}
