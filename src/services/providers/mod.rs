/// Article data source abstraction
///
/// The engine only ever needs one thing from the platform: every published
/// article, as flat records. Each backend implements that single fetch.
use crate::{error::AppResult, models::Article};

pub mod firestore;

pub use firestore::FirestoreSource;

/// Trait for article sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch all articles whose status is "published"
    ///
    /// An empty vector means the platform has no published articles; transport
    /// and decoding failures are errors.
    async fn fetch_published(&self) -> AppResult<Vec<Article>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
