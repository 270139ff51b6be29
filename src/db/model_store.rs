use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::Article;
use crate::services::model_builder::{ModelSnapshot, SimilarityModel};
use crate::services::vectorizer::{SparseVector, TfidfVectorizer};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const TFIDF_MATRIX_FILE: &str = "tfidf_matrix.json";
pub const SIMILARITY_MATRIX_FILE: &str = "similarity_matrix.json";
pub const ARTICLES_FILE: &str = "articles.json";

const SNAPSHOT_FILES: [&str; 4] = [
    VECTORIZER_FILE,
    TFIDF_MATRIX_FILE,
    SIMILARITY_MATRIX_FILE,
    ARTICLES_FILE,
];

/// Durable storage for model snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModelStore: Send + Sync {
    /// Writes the vectorizer, both matrices and the corpus
    async fn save(&self, snapshot: &ModelSnapshot) -> AppResult<()>;

    /// Reads a snapshot back
    ///
    /// Returns `Ok(None)` when any artifact is missing; unreadable or
    /// inconsistent artifacts are errors.
    async fn load(&self) -> AppResult<Option<ModelSnapshot>>;
}

/// Stores each artifact as a JSON file inside one directory
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> AppResult<()> {
        let bytes = serde_json::to_vec(value)?;
        tokio::fs::write(self.dir.join(file), bytes).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> AppResult<T> {
        let bytes = tokio::fs::read(self.dir.join(file)).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Persistence(format!("{} is corrupt: {}", file, e)))
    }
}

#[async_trait::async_trait]
impl ModelStore for FileModelStore {
    async fn save(&self, snapshot: &ModelSnapshot) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        self.write_json(VECTORIZER_FILE, &snapshot.model.vectorizer).await?;
        self.write_json(TFIDF_MATRIX_FILE, &snapshot.model.tfidf_matrix).await?;
        self.write_json(SIMILARITY_MATRIX_FILE, &snapshot.model.similarity_matrix)
            .await?;
        self.write_json(ARTICLES_FILE, &snapshot.articles).await?;

        tracing::info!(
            dir = %self.dir.display(),
            article_count = snapshot.articles.len(),
            "Model saved"
        );
        Ok(())
    }

    async fn load(&self) -> AppResult<Option<ModelSnapshot>> {
        for file in SNAPSHOT_FILES {
            if !tokio::fs::try_exists(self.dir.join(file)).await? {
                tracing::warn!(
                    dir = %self.dir.display(),
                    missing = file,
                    "No saved model found"
                );
                return Ok(None);
            }
        }

        let vectorizer: TfidfVectorizer = self.read_json(VECTORIZER_FILE).await?;
        let tfidf_matrix: Vec<SparseVector> = self.read_json(TFIDF_MATRIX_FILE).await?;
        let similarity_matrix: Vec<Vec<f64>> = self.read_json(SIMILARITY_MATRIX_FILE).await?;
        let articles: Vec<Article> = self.read_json(ARTICLES_FILE).await?;

        let model = SimilarityModel {
            vectorizer,
            tfidf_matrix,
            similarity_matrix,
        };
        model
            .check_dimensions(articles.len())
            .map_err(AppError::Persistence)?;

        tracing::info!(dir = %self.dir.display(), article_count = articles.len(), "Model loaded");
        Ok(Some(ModelSnapshot { model, articles }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::corpus::Corpus;
    use crate::services::model_builder::{build_model, tests::sample_articles};

    fn sample_snapshot() -> ModelSnapshot {
        let articles = sample_articles(12);
        let corpus = Corpus::from_articles(articles.clone());
        ModelSnapshot {
            model: build_model(&corpus).unwrap(),
            articles,
        }
    }

    #[tokio::test]
    async fn test_save_then_load_returns_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("ml_models_artelipi"));
        let snapshot = sample_snapshot();

        store.save(&snapshot).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_empty_directory_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path());

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_snapshot_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path());
        store.save(&sample_snapshot()).await.unwrap();
        tokio::fs::remove_file(dir.path().join(SIMILARITY_MATRIX_FILE))
            .await
            .unwrap();

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path());
        store.save(&sample_snapshot()).await.unwrap();
        tokio::fs::write(dir.path().join(VECTORIZER_FILE), b"not json")
            .await
            .unwrap();

        assert!(matches!(store.load().await, Err(AppError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_row_count_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path());
        let mut snapshot = sample_snapshot();
        snapshot.articles.truncate(5);
        store.save(&snapshot).await.unwrap();

        assert!(matches!(store.load().await, Err(AppError::Persistence(_))));
    }
}
