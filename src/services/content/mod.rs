//! Content-based retrieval: a TF-IDF vector space over product text,
//! queried with cosine similarity.
//!
//! The index is built once per catalog and then shared read-only; a query
//! never touches mutable state, so concurrent queries are safe.

mod tokenize;

pub use tokenize::tokenize;

use crate::config::ContentConfig;
use crate::error::{EngineError, Result};
use crate::models::{Catalog, Recommendations, ScoredProduct};
use crate::utils::score_key;
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use tracing::{debug, info};

/// Immutable TF-IDF index over one catalog. Row `i` of the document matrix
/// corresponds to catalog position `i`; rows are L2-normalized so cosine
/// similarity reduces to a dot product.
#[derive(Debug)]
pub struct ContentIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    doc_matrix: Array2<f32>,
    config: ContentConfig,
}

impl ContentIndex {
    /// Build the vector space over every product's textual fields
    /// (name + brand + category + description).
    pub fn build(catalog: &Catalog, config: &ContentConfig) -> Self {
        let docs: Vec<Vec<String>> = catalog
            .iter()
            .map(|p| {
                let mut text = String::with_capacity(
                    p.name.len() + p.brand.len() + p.description.len() + 2,
                );
                text.push_str(&p.name);
                text.push(' ');
                text.push_str(&p.brand);
                if let Some(category) = &p.category {
                    text.push(' ');
                    text.push_str(category);
                }
                text.push(' ');
                text.push_str(&p.description);
                tokenize(&text, config)
            })
            .collect();

        // Vocabulary in first-seen order; deterministic for a given catalog.
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        for tokens in &docs {
            let mut seen = std::collections::HashSet::new();
            for token in tokens {
                let idx = *vocabulary.entry(token.clone()).or_insert_with(|| {
                    doc_freq.push(0);
                    doc_freq.len() - 1
                });
                if seen.insert(idx) {
                    doc_freq[idx] += 1;
                }
            }
        }

        let n_docs = docs.len();
        // Smoothed IDF, never negative: ln(N / df) + 1.
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| (n_docs as f32 / df as f32).ln() + 1.0)
            .collect();

        let mut doc_matrix = Array2::<f32>::zeros((n_docs, vocabulary.len()));
        for (row, tokens) in docs.iter().enumerate() {
            for token in tokens {
                let col = vocabulary[token];
                doc_matrix[[row, col]] += idf[col];
            }
            let norm = doc_matrix.row(row).dot(&doc_matrix.row(row)).sqrt();
            if norm > 0.0 {
                doc_matrix.row_mut(row).mapv_inplace(|v| v / norm);
            }
        }

        info!(
            documents = n_docs,
            vocabulary = vocabulary.len(),
            "Content index built"
        );

        Self {
            vocabulary,
            idf,
            doc_matrix,
            config: config.clone(),
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Rank catalog entries by cosine similarity to `text`.
    ///
    /// `catalog` must be the one the index was built from. A query whose
    /// terms all miss the vocabulary returns an empty list; the caller
    /// decides whether to fall back to the top-rated list. Blank queries
    /// are rejected.
    pub fn query(&self, catalog: &Catalog, text: &str, top_n: usize) -> Result<Recommendations> {
        debug_assert_eq!(self.doc_matrix.nrows(), catalog.len());

        if text.trim().is_empty() {
            return Err(EngineError::InvalidQuery(
                "query text is blank".to_string(),
            ));
        }

        let tokens = tokenize(text, &self.config);
        let mut query_vec = Array1::<f32>::zeros(self.vocabulary.len());
        let mut matched = 0usize;
        for token in &tokens {
            if let Some(&col) = self.vocabulary.get(token) {
                query_vec[col] += self.idf[col];
                matched += 1;
            }
        }

        let norm = query_vec.dot(&query_vec).sqrt();
        if norm == 0.0 {
            debug!(query = text, "Query has no vocabulary overlap");
            return Ok(Vec::new());
        }
        query_vec.mapv_inplace(|v| v / norm);

        let scores = self.doc_matrix.dot(&query_vec);

        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .enumerate()
            .filter(|(_, &score)| score > 0.0)
            .map(|(idx, &score)| (idx, score))
            .collect();

        let products = catalog.products();
        ranked.sort_by(|a, b| {
            score_key(b.1)
                .cmp(&score_key(a.1))
                .then_with(|| {
                    products[b.0]
                        .rating
                        .partial_cmp(&products[a.0].rating)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| products[a.0].id.cmp(&products[b.0].id))
        });

        let result: Recommendations = ranked
            .into_iter()
            .take(top_n)
            .map(|(idx, score)| ScoredProduct {
                product: products[idx].clone(),
                score,
            })
            .collect();

        debug!(
            query = text,
            tokens = tokens.len(),
            matched_tokens = matched,
            returned = result.len(),
            "Content query completed"
        );

        Ok(result)
    }
}
