use serde::{Deserialize, Serialize};

use super::corpus::Corpus;
use super::vectorizer::{SparseVector, TfidfParams, TfidfVectorizer};
use crate::models::Article;

/// Fitted vectorizer plus the matrices derived from one corpus snapshot
///
/// Row `i` of both matrices belongs to the article at position `i` of the
/// corpus the model was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityModel {
    pub vectorizer: TfidfVectorizer,
    pub tfidf_matrix: Vec<SparseVector>,
    pub similarity_matrix: Vec<Vec<f64>>,
}

impl SimilarityModel {
    pub fn row_count(&self) -> usize {
        self.similarity_matrix.len()
    }

    /// Checks that both matrices have exactly `rows` rows and the similarity
    /// matrix is square
    pub fn check_dimensions(&self, rows: usize) -> Result<(), String> {
        if self.tfidf_matrix.len() != rows {
            return Err(format!(
                "tf-idf matrix has {} rows, corpus has {}",
                self.tfidf_matrix.len(),
                rows
            ));
        }
        if self.similarity_matrix.len() != rows {
            return Err(format!(
                "similarity matrix has {} rows, corpus has {}",
                self.similarity_matrix.len(),
                rows
            ));
        }
        if let Some((i, row)) = self
            .similarity_matrix
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != rows)
        {
            return Err(format!(
                "similarity row {} has {} columns, expected {}",
                i,
                row.len(),
                rows
            ));
        }
        Ok(())
    }
}

/// Everything persisted as one unit: the model and the corpus it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    pub model: SimilarityModel,
    pub articles: Vec<Article>,
}

/// Fits a model on the corpus, or `None` when the corpus is too small
pub fn build_model(corpus: &Corpus) -> Option<SimilarityModel> {
    if !corpus.supports_ml() {
        return None;
    }

    let (vectorizer, tfidf_matrix) =
        TfidfVectorizer::fit_transform(TfidfParams::default(), &corpus.full_contents());
    let similarity_matrix = pairwise_cosine(&tfidf_matrix);

    Some(SimilarityModel {
        vectorizer,
        tfidf_matrix,
        similarity_matrix,
    })
}

/// Dense symmetric cosine matrix with a unit diagonal
fn pairwise_cosine(rows: &[SparseVector]) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let score = rows[i].cosine(&rows[j]);
            matrix[i][j] = score;
            matrix[j][i] = score;
        }
    }
    matrix
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::corpus::MIN_ARTICLES_FOR_ML;

    const TOPICS: [&str; 3] = [
        "rust ownership borrowing lifetimes compiler",
        "tomatoes compost soil garden watering",
        "espresso coffee beans roasting grinder",
    ];

    pub(crate) fn sample_articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| {
                Article::new(
                    format!("article-{}", i),
                    format!("Post {}", i),
                    format!("{} note{}", TOPICS[i % TOPICS.len()], i),
                )
            })
            .collect()
    }

    #[test]
    fn test_small_corpus_is_not_built() {
        let corpus = Corpus::from_articles(sample_articles(MIN_ARTICLES_FOR_ML - 1));
        assert!(build_model(&corpus).is_none());
    }

    #[test]
    fn test_similarity_matrix_is_square_symmetric_unit_diagonal() {
        let corpus = Corpus::from_articles(sample_articles(15));
        let model = build_model(&corpus).unwrap();

        assert_eq!(model.row_count(), 15);
        assert!(model.check_dimensions(15).is_ok());
        for i in 0..15 {
            assert!((model.similarity_matrix[i][i] - 1.0).abs() < 1e-9);
            for j in 0..15 {
                assert!(
                    (model.similarity_matrix[i][j] - model.similarity_matrix[j][i]).abs() < 1e-12
                );
            }
        }
    }

    #[test]
    fn test_same_topic_is_more_similar() {
        let corpus = Corpus::from_articles(sample_articles(12));
        let model = build_model(&corpus).unwrap();

        // 0 and 3 share a topic, 0 and 1 do not
        assert!(model.similarity_matrix[0][3] > model.similarity_matrix[0][1]);
    }

    #[test]
    fn test_check_dimensions_reports_mismatch() {
        let corpus = Corpus::from_articles(sample_articles(10));
        let model = build_model(&corpus).unwrap();
        assert!(model.check_dimensions(11).is_err());

        let mut ragged = model.clone();
        ragged.similarity_matrix[4].pop();
        assert!(ragged.check_dimensions(10).is_err());
    }
}
