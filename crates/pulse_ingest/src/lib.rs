pub mod extract;
pub mod feed;
pub mod ingestor;
pub mod normalize;
pub mod summarize;

pub use extract::{ContentExtractor, HttpExtractor};
pub use feed::{BingNewsFeed, FeedItem, FeedProvider};
pub use ingestor::Ingestor;
pub use summarize::{HeuristicSummarizer, RemoteSummarizer};

pub mod prelude {
    pub use crate::feed::{FeedItem, FeedProvider};
    pub use crate::Ingestor;
    pub use pulse_core::{Article, IngestReport, NewArticle, Result};
}
