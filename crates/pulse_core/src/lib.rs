pub mod error;
pub mod store;
pub mod summarize;
pub mod types;

pub use error::Error;
pub use store::ArticleStore;
pub use summarize::Summarizer;
pub use types::{Article, IngestReport, IngestStatus, NewArticle, DEFAULT_COMPANIES};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{Article, ArticleStore, Error, IngestStatus, NewArticle, Result};
}
