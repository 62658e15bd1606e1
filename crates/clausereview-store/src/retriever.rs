//! Term-frequency retrieval over the passage store.
//!
//! Passages and queries are mapped to sparse TF-IDF vectors (raw term counts,
//! smoothed IDF, L2-normalised) and ranked by cosine similarity. The fitted
//! index tracks the store generation and refits itself when the store changes.

use std::collections::HashMap;

use clausereview_core::Document;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::DocumentStore;

/// A retrieved passage with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// First stage of the pipeline: pick the passages the reader will see.
pub trait Retriever {
    fn retrieve(
        &mut self,
        store: &DocumentStore,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError>;
}

type SparseVec = HashMap<String, f32>;

/// TF-IDF retriever with automatic refitting.
#[derive(Default)]
pub struct TfidfRetriever {
    idf: HashMap<String, f32>,
    vectors: Vec<SparseVec>,
    fitted_generation: Option<u64>,
}

impl TfidfRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the current store contents.
    pub fn fit(&mut self, store: &DocumentStore) {
        let docs = store.documents();
        let term_counts: Vec<HashMap<String, usize>> =
            docs.iter().map(|d| count_terms(&d.content)).collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n = docs.len() as f32;
        self.idf = df
            .into_iter()
            .map(|(term, df)| (term.to_string(), ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0))
            .collect();

        self.vectors = term_counts
            .iter()
            .map(|counts| self.weigh(counts))
            .collect();
        self.fitted_generation = Some(store.generation());

        info!(
            documents = docs.len(),
            vocabulary = self.idf.len(),
            "fitted tf-idf index"
        );
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    fn is_stale(&self, store: &DocumentStore) -> bool {
        self.fitted_generation != Some(store.generation())
    }

    /// TF-IDF weights for the given counts, L2-normalised. Unknown terms are dropped.
    fn weigh(&self, counts: &HashMap<String, usize>) -> SparseVec {
        let mut vec: SparseVec = counts
            .iter()
            .filter_map(|(term, &tf)| {
                self.idf
                    .get(term)
                    .map(|idf| (term.clone(), tf as f32 * idf))
            })
            .collect();
        let norm: f32 = vec.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in vec.values_mut() {
                *w /= norm;
            }
        }
        vec
    }
}

impl Retriever for TfidfRetriever {
    fn retrieve(
        &mut self,
        store: &DocumentStore,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        if store.is_empty() {
            return Err(StoreError::EmptyIndex);
        }
        if self.is_stale(store) {
            self.fit(store);
        }

        let query_vec = self.weigh(&count_terms(query));
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, doc_vec)| (i, dot(&query_vec, doc_vec)))
            .collect();

        // Stable sort keeps store order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let docs = store.documents();
        let results: Vec<ScoredDocument> = scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| ScoredDocument {
                document: docs[i].clone(),
                score,
            })
            .collect();

        debug!(
            top_k,
            returned = results.len(),
            best = results.first().map(|r| r.score).unwrap_or(0.0),
            "retrieved passages"
        );
        Ok(results)
    }
}

/// Lowercased runs of two or more word characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
}

fn count_terms(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

fn dot(a: &SparseVec, b: &SparseVec) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(passages: &[(&str, &str)]) -> DocumentStore {
        let mut store = DocumentStore::new();
        store.write_documents(
            passages
                .iter()
                .enumerate()
                .map(|(i, (name, text))| Document::new(name, i, text.to_string()))
                .collect(),
        );
        store
    }

    fn contract_store() -> DocumentStore {
        store_with(&[
            ("msa.txt", "Payment terms: invoices are payable within thirty days of receipt."),
            ("msa.txt", "This Agreement shall be governed by the laws of the State of Delaware."),
            ("msa.txt", "Neither party shall assign this Agreement without prior written consent."),
        ])
    }

    #[test]
    fn tokenize_lowercases_and_drops_single_chars() {
        let tokens: Vec<String> = tokenize("The Licensee's IP, a 3rd-party X").collect();
        assert_eq!(tokens, vec!["the", "licensee", "ip", "3rd", "party"]);
    }

    #[test]
    fn retrieve_ranks_matching_passage_first() {
        let store = contract_store();
        let mut retriever = TfidfRetriever::new();

        let results = retriever
            .retrieve(&store, "Which state law governs the contract?", 1)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].document.content.contains("Delaware"));
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn retrieve_respects_top_k() {
        let store = contract_store();
        let mut retriever = TfidfRetriever::new();

        assert_eq!(retriever.retrieve(&store, "agreement", 2).unwrap().len(), 2);
        assert_eq!(retriever.retrieve(&store, "agreement", 10).unwrap().len(), 3);
    }

    #[test]
    fn retrieve_scores_descending() {
        let store = contract_store();
        let mut retriever = TfidfRetriever::new();

        let results = retriever.retrieve(&store, "prior written consent to assign", 3).unwrap();
        assert!(results[0].document.content.contains("assign"));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn retrieve_unknown_terms_still_returns_passages() {
        let store = contract_store();
        let mut retriever = TfidfRetriever::new();

        let results = retriever.retrieve(&store, "zzz qqq", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
        // Ties keep store order.
        assert_eq!(results[0].document.id, "msa.txt#0");
    }

    #[test]
    fn retrieve_empty_store_errors() {
        let store = DocumentStore::new();
        let mut retriever = TfidfRetriever::new();
        assert!(matches!(
            retriever.retrieve(&store, "anything", 1),
            Err(StoreError::EmptyIndex)
        ));
    }

    #[test]
    fn refits_when_store_changes() {
        let mut store = contract_store();
        let mut retriever = TfidfRetriever::new();
        retriever.retrieve(&store, "payment", 1).unwrap();
        let vocab_before = retriever.vocabulary_len();

        store.write_documents(vec![Document::new(
            "nda.txt",
            0,
            "Confidential information must not be disclosed to competitors.".into(),
        )]);

        let results = retriever.retrieve(&store, "confidential information", 1).unwrap();
        assert!(retriever.vocabulary_len() > vocab_before);
        assert_eq!(results[0].document.meta.name, "nda.txt");
    }

    #[test]
    fn rare_terms_outweigh_common_ones() {
        let store = store_with(&[
            ("a.txt", "the agreement the agreement the agreement"),
            ("b.txt", "the agreement includes an escrow deposit"),
        ]);
        let mut retriever = TfidfRetriever::new();
        let results = retriever.retrieve(&store, "agreement escrow", 1).unwrap();
        assert_eq!(results[0].document.meta.name, "b.txt");
    }

    #[test]
    fn document_vectors_are_unit_norm() {
        let store = contract_store();
        let mut retriever = TfidfRetriever::new();
        retriever.fit(&store);
        for vec in &retriever.vectors {
            let norm: f32 = vec.values().map(|w| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
        }
    }
}
