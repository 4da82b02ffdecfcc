pub mod feed;
pub mod gateway;

pub use feed::{display_summary, NewsFeed, EMPTY_STATE_MESSAGE, SYNC_DELAY};
pub use gateway::{ApiGateway, ArticleGateway, DEFAULT_BASE_URL, DEFAULT_LIMIT};

pub mod prelude {
    pub use crate::feed::NewsFeed;
    pub use crate::gateway::{ApiGateway, ArticleGateway};
    pub use pulse_core::{Article, IngestStatus, Result};
}
