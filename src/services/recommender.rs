use serde::Serialize;

use super::corpus::{Corpus, CorpusEntry, LoadOutcome, MIN_ARTICLES_FOR_ML};
use super::model_builder::{build_model, ModelSnapshot, SimilarityModel};
use crate::error::{AppError, AppResult};
use crate::models::{Article, Recommendation, Strategy};

/// Whether the similarity model can be trusted for the current corpus
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    /// Nothing has been built or restored yet
    NoModel,
    /// A model exists but was built for an earlier corpus
    Stale,
    /// The model matches the current corpus row for row
    Ready,
}

/// Result of a build request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built {
        article_count: usize,
        vocabulary_size: usize,
    },
    /// Corpus below the ML threshold; any previous model is left as it was
    NotBuilt { article_count: usize },
}

/// Snapshot of the engine for status endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineStats {
    pub total_articles: usize,
    pub model_state: ModelState,
    pub ml_enabled: bool,
    pub min_articles_for_ml: usize,
    pub recommendation_strategy: &'static str,
}

/// Article recommendation engine
///
/// Holds the current corpus and, optionally, a similarity model. Queries never
/// mutate either; `load`, `build` and `restore` replace them.
#[derive(Debug)]
pub struct Recommender {
    corpus: Corpus,
    model: Option<SimilarityModel>,
    state: ModelState,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    pub fn new() -> Self {
        Self {
            corpus: Corpus::default(),
            model: None,
            state: ModelState::NoModel,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Replaces the corpus wholesale. An existing model is kept but marked stale.
    pub fn load(&mut self, articles: Vec<Article>) -> LoadOutcome {
        self.corpus = Corpus::from_articles(articles);
        if self.state == ModelState::Ready {
            self.state = ModelState::Stale;
        }

        if self.corpus.is_empty() {
            tracing::warn!("No articles found in Artelipi platform");
            LoadOutcome::Empty
        } else {
            tracing::info!(article_count = self.corpus.len(), "Loaded Artelipi articles");
            LoadOutcome::Loaded {
                article_count: self.corpus.len(),
            }
        }
    }

    /// Fits a fresh model on the current corpus
    pub fn build(&mut self) -> BuildOutcome {
        let article_count = self.corpus.len();
        match build_model(&self.corpus) {
            Some(model) => {
                let vocabulary_size = model.vectorizer.vocabulary_size();
                self.model = Some(model);
                self.state = ModelState::Ready;
                tracing::info!(article_count, vocabulary_size, "ML model built");
                BuildOutcome::Built {
                    article_count,
                    vocabulary_size,
                }
            }
            None => {
                tracing::warn!(
                    article_count,
                    min_articles_for_ml = MIN_ARTICLES_FOR_ML,
                    "Not enough articles for ML"
                );
                BuildOutcome::NotBuilt { article_count }
            }
        }
    }

    /// True when the corpus is large enough for ML but the model does not match it
    pub fn needs_rebuild(&self) -> bool {
        self.corpus.supports_ml() && self.state != ModelState::Ready
    }

    pub fn ml_enabled(&self) -> bool {
        self.ready_model().is_some()
    }

    /// The persistable unit, available only while the model is ready
    pub fn snapshot(&self) -> Option<ModelSnapshot> {
        self.ready_model().map(|model| ModelSnapshot {
            model: model.clone(),
            articles: self.corpus.articles(),
        })
    }

    /// Installs a persisted corpus and model after checking they line up
    pub fn restore(&mut self, snapshot: ModelSnapshot) -> AppResult<()> {
        let submitted = snapshot.articles.len();
        let corpus = Corpus::from_articles(snapshot.articles);
        if corpus.len() != submitted {
            return Err(AppError::Persistence(format!(
                "snapshot corpus has duplicate article ids ({} of {} unique)",
                corpus.len(),
                submitted
            )));
        }
        snapshot
            .model
            .check_dimensions(corpus.len())
            .map_err(AppError::Persistence)?;

        tracing::info!(article_count = corpus.len(), "Restored model snapshot");
        self.corpus = corpus;
        self.model = Some(snapshot.model);
        self.state = ModelState::Ready;
        Ok(())
    }

    pub fn stats(&self) -> EngineStats {
        let ml_enabled = self.ml_enabled();
        EngineStats {
            total_articles: self.corpus.len(),
            model_state: self.state,
            ml_enabled,
            min_articles_for_ml: MIN_ARTICLES_FOR_ML,
            recommendation_strategy: if ml_enabled {
                "ML-based"
            } else {
                "Rule-based (engagement + recency)"
            },
        }
    }

    /// Most engaged articles first, ties in corpus order
    pub fn trending(&self, limit: usize) -> Vec<Recommendation> {
        let mut positions: Vec<usize> = (0..self.corpus.len()).collect();
        self.sort_by_engagement(&mut positions);
        self.take_ranked(positions, limit, Strategy::Engagement)
    }

    /// Newest articles first; undated articles follow in corpus order
    pub fn recent(&self, limit: usize) -> Vec<Recommendation> {
        let entries = self.corpus.entries();
        let mut positions: Vec<usize> = (0..entries.len()).collect();
        positions.sort_by(|&a, &b| {
            let (a, b) = (entries[a].article.created_at, entries[b].article.created_at);
            match (a, b) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        self.take_ranked(positions, limit, Strategy::Recency)
    }

    /// Articles related to `article_id`, excluding the article itself
    pub fn similar_to_article(&self, article_id: &str, limit: usize) -> Vec<Recommendation> {
        if self.corpus.is_empty() {
            return Vec::new();
        }

        let Some(target) = self.corpus.position(article_id) else {
            tracing::info!(article_id = %article_id, "Article not found, falling back to recent");
            return self.recent(limit);
        };

        let Some(model) = self.ready_model() else {
            tracing::debug!(
                article_id = %article_id,
                "Using rule-based recommendations (not enough data for ML)"
            );
            let mut positions: Vec<usize> =
                (0..self.corpus.len()).filter(|&i| i != target).collect();
            self.sort_by_engagement(&mut positions);
            return self.take_ranked(positions, limit, Strategy::Engagement);
        };

        let scores: Vec<(usize, f64)> = model.similarity_matrix[target]
            .iter()
            .copied()
            .enumerate()
            .filter(|&(i, _)| i != target)
            .collect();
        self.take_scored(scores, limit)
    }

    /// Articles whose content is closest to free text
    pub fn similar_to_content(&self, text: &str, limit: usize) -> Vec<Recommendation> {
        if self.corpus.is_empty() {
            return Vec::new();
        }

        let Some(model) = self.ready_model() else {
            return self.recent(limit);
        };

        let query = model.vectorizer.transform(text);
        let scores: Vec<(usize, f64)> = model
            .tfidf_matrix
            .iter()
            .map(|row| query.cosine(row))
            .enumerate()
            .collect();
        self.take_scored(scores, limit)
    }

    /// The model, if it is ready and sized for the current corpus
    fn ready_model(&self) -> Option<&SimilarityModel> {
        if self.state != ModelState::Ready || !self.corpus.supports_ml() {
            return None;
        }
        self.model
            .as_ref()
            .filter(|model| model.row_count() == self.corpus.len())
    }

    fn sort_by_engagement(&self, positions: &mut [usize]) {
        let entries = self.corpus.entries();
        positions.sort_by(|&a, &b| {
            entries[b]
                .engagement_score
                .cmp(&entries[a].engagement_score)
        });
    }

    fn take_ranked(
        &self,
        positions: Vec<usize>,
        limit: usize,
        strategy: Strategy,
    ) -> Vec<Recommendation> {
        positions
            .into_iter()
            .take(limit)
            .filter_map(|i| self.corpus.get(i))
            .map(|entry| to_recommendation(entry, None, strategy))
            .collect()
    }

    fn take_scored(&self, mut scores: Vec<(usize, f64)>, limit: usize) -> Vec<Recommendation> {
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
            .into_iter()
            .take(limit)
            .filter_map(|(i, score)| {
                self.corpus.get(i).map(|entry| {
                    to_recommendation(entry, Some(score), Strategy::ContentSimilarity)
                })
            })
            .collect()
    }
}

fn to_recommendation(
    entry: &CorpusEntry,
    similarity_score: Option<f64>,
    strategy: Strategy,
) -> Recommendation {
    Recommendation {
        article: entry.article.clone(),
        engagement_score: entry.engagement_score,
        similarity_score,
        strategy,
    }
}
