use std::collections::HashMap;

use crate::models::Article;

/// Below this many articles the engine never uses the similarity model
pub const MIN_ARTICLES_FOR_ML: usize = 10;

/// An article together with the fields derived from it at load time
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub article: Article,
    pub full_content: String,
    pub engagement_score: u64,
}

impl From<Article> for CorpusEntry {
    fn from(article: Article) -> Self {
        Self {
            full_content: article.full_content(),
            engagement_score: article.engagement_score(),
            article,
        }
    }
}

/// Result of replacing the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { article_count: usize },
    /// The source had no published articles
    Empty,
}

/// Ordered, id-keyed collection of articles
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    /// Builds a corpus in input order; a repeated id keeps its first occurrence
    pub fn from_articles(articles: Vec<Article>) -> Self {
        let mut corpus = Self::default();
        for article in articles {
            if corpus.positions.contains_key(&article.id) {
                tracing::warn!(
                    article_id = %article.id,
                    "Duplicate article id dropped from corpus"
                );
                continue;
            }
            corpus
                .positions
                .insert(article.id.clone(), corpus.entries.len());
            corpus.entries.push(CorpusEntry::from(article));
        }
        corpus
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the corpus is large enough for similarity ranking
    pub fn supports_ml(&self) -> bool {
        self.entries.len() >= MIN_ARTICLES_FOR_ML
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&CorpusEntry> {
        self.entries.get(position)
    }

    pub fn position(&self, article_id: &str) -> Option<usize> {
        self.positions.get(article_id).copied()
    }

    pub fn full_contents(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.full_content.as_str()).collect()
    }

    pub fn articles(&self) -> Vec<Article> {
        self.entries.iter().map(|e| e.article.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields_computed_on_load() {
        let mut article = Article::new("a", "Hello", "world");
        article.bookmark_count = 2;
        let corpus = Corpus::from_articles(vec![article]);

        let entry = corpus.get(0).unwrap();
        assert_eq!(entry.full_content, "Hello world");
        assert_eq!(entry.engagement_score, 10);
    }

    #[test]
    fn test_positions_follow_input_order() {
        let corpus = Corpus::from_articles(vec![
            Article::new("a", "", ""),
            Article::new("b", "", ""),
        ]);
        assert_eq!(corpus.position("a"), Some(0));
        assert_eq!(corpus.position("b"), Some(1));
        assert_eq!(corpus.position("zzz"), None);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let corpus = Corpus::from_articles(vec![
            Article::new("a", "first", ""),
            Article::new("a", "second", ""),
        ]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(0).unwrap().article.title, "first");
    }

    #[test]
    fn test_ml_threshold() {
        let small: Vec<Article> = (0..MIN_ARTICLES_FOR_ML - 1)
            .map(|i| Article::new(i.to_string(), "", ""))
            .collect();
        assert!(!Corpus::from_articles(small).supports_ml());

        let enough: Vec<Article> = (0..MIN_ARTICLES_FOR_ML)
            .map(|i| Article::new(i.to_string(), "", ""))
            .collect();
        assert!(Corpus::from_articles(enough).supports_ml());
    }
}
