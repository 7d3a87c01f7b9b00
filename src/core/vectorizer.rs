// File: src/core/vectorizer.rs
use crate::config::VectorizerConfig;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Shortest token, in characters, that the tokenizer keeps.
const MIN_TOKEN_CHARS: usize = 2;

/// A sparse row of the TF-IDF matrix: `(column, weight)` pairs sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// True for the degenerate vector of a medicine with no usable terms.
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|&(_, w)| w == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ci, wi) = self.entries[i];
            let (cj, wj) = other.entries[j];
            match ci.cmp(&cj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Splits text into lower-cased word tokens.
///
/// A token is a maximal run of alphanumeric or `_` characters; tokens shorter
/// than two characters are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// TF-IDF vectorizer fitted once over the whole medicine collection.
///
/// ```text
/// tfidf(t, d) = count(t, d) × idf(t)
/// idf(t)      = ln((1 + n) / (1 + df(t))) + 1
/// ```
/// Rows are L2-normalised, so the cosine of two rows is their dot product.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    ngram_range: (usize, usize),
    min_df: usize,
    max_df: f64,
    /// Term -> column. Columns follow lexicographic term order.
    vocabulary: BTreeMap<String, usize>,
    idf_values: Vec<f64>,
}

impl TfidfVectorizer {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&VectorizerConfig::default())
    }

    #[must_use]
    pub fn from_config(config: &VectorizerConfig) -> Self {
        Self {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            vocabulary: BTreeMap::new(),
            idf_values: Vec::new(),
        }
        .with_ngram_range(config.ngram_range.0, config.ngram_range.1)
        .with_min_df(config.min_df)
        .with_max_df(config.max_df)
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Terms appearing in more than `max_df` of the documents are ignored.
    #[must_use]
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Vec<SparseVector> {
        self.fit(documents);
        self.transform(documents)
    }

    /// Learns the vocabulary and IDF weights. Any previous fit is discarded.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) {
        let n_docs = documents.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let unique: HashSet<String> = self.terms(doc.as_ref()).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_df_count = self.max_df * n_docs as f64;
        let kept: BTreeMap<String, usize> = doc_freq
            .into_iter()
            .filter(|&(_, df)| df >= self.min_df && df as f64 <= max_df_count)
            .collect();

        self.idf_values = kept
            .values()
            .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = kept
            .into_keys()
            .enumerate()
            .map(|(column, term)| (term, column))
            .collect();
    }

    /// Projects documents onto the fitted vocabulary. Documents with no known
    /// terms come back as zero vectors.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents
            .iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect()
    }

    fn transform_one(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(document) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf_values[column]))
            .collect();

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }
        SparseVector::from_sorted(entries)
    }

    /// All n-gram terms of a document, in order, with repetitions.
    fn terms(&self, document: &str) -> Vec<String> {
        let tokens = tokenize(document);
        let mut terms = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf_values(&self) -> &[f64] {
        &self.idf_values
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
