//! TF-IDF vectorizer over unigrams and bigrams.
//!
//! Documents are lowercased, split into runs of word characters (at least two
//! characters long), stripped of English stop words, and expanded into
//! unigrams plus adjacent-pair bigrams. Weights use the smoothed idf
//! `ln((1 + n) / (1 + df)) + 1` on raw counts, and every row is L2-normalized,
//! so the dot product of two rows is their cosine similarity.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::stop_words::is_stop_word;

/// Fitting parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TfidfParams {
    /// Vocabulary cap, keeping the most frequent terms
    pub max_features: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Inclusive n-gram range
    pub ngram_range: (usize, usize),
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            max_features: 1000,
            min_df: 1,
            max_df: 0.9,
            ngram_range: (1, 2),
        }
    }
}

/// Sparse row with strictly increasing column indices
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Cosine similarity; zero when either side has no terms
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            self.dot(other) / denom
        }
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
        self
    }
}

/// A vectorizer fitted on a corpus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TfidfVectorizer {
    params: TfidfParams,
    /// Term to column, columns in alphabetical term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and idf weights, returning the fitted vectorizer
    /// together with the document-term matrix in input order
    pub fn fit_transform<S: AsRef<str>>(
        params: TfidfParams,
        documents: &[S],
    ) -> (Self, Vec<SparseVector>) {
        let n_docs = documents.len();
        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| count_terms(&analyze(doc.as_ref(), params.ngram_range)))
            .collect();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut total_freq: HashMap<&str, usize> = HashMap::new();
        for doc_counts in &counts {
            for (term, &count) in doc_counts {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                *total_freq.entry(term.as_str()).or_insert(0) += count;
            }
        }

        let max_doc_count = params.max_df * n_docs as f64;
        let mut kept: Vec<(&str, usize)> = doc_freq
            .iter()
            .filter(|(_, &df)| df >= params.min_df && (df as f64) <= max_doc_count)
            .map(|(&term, _)| (term, total_freq[term]))
            .collect();

        if kept.len() > params.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            kept.truncate(params.max_features);
        }

        let mut vocabulary: BTreeMap<String, usize> =
            kept.iter().map(|(term, _)| (term.to_string(), 0)).collect();
        for (column, slot) in vocabulary.values_mut().enumerate() {
            *slot = column;
        }

        let idf = vocabulary
            .keys()
            .map(|term| smoothed_idf(n_docs, doc_freq[term.as_str()]))
            .collect();

        let vectorizer = Self {
            params,
            vocabulary,
            idf,
        };
        let matrix = counts.iter().map(|c| vectorizer.weigh(c)).collect();

        (vectorizer, matrix)
    }

    /// Projects unseen text into the fitted vector space
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&count_terms(&analyze(text, self.params.ngram_range)))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[cfg(test)]
    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> SparseVector {
        let mut entries: Vec<(usize, f64)> = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&column| (column, count as f64 * self.idf[column]))
            })
            .collect();
        entries.sort_by_key(|(column, _)| *column);

        let (indices, values) = entries.into_iter().unzip();
        SparseVector { indices, values }.normalized()
    }
}

fn smoothed_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2 && !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Tokens followed by their n-grams, in `ngram_range` order
fn analyze(text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n == 1 {
            terms.extend(tokens.iter().cloned());
        } else {
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
    }
    terms
}

fn count_terms(terms: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term.clone()).or_insert(0) += 1;
    }
    counts
}
