pub mod backends;

pub use backends::memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use backends::sqlite::SqliteStorage;

pub mod prelude {
    pub use super::backends::memory::MemoryStorage;
    #[cfg(feature = "sqlite")]
    pub use super::backends::sqlite::SqliteStorage;
    pub use pulse_core::{Article, ArticleStore, NewArticle, Result};
}
