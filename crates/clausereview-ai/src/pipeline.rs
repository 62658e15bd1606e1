//! Retrieve-then-read pipeline.

use clausereview_core::{Document, PipelineParams, Prediction, display_category};
use clausereview_store::{DocumentStore, Retriever};
use tracing::debug;

use crate::reader::Reader;

/// Answers one question end to end.
pub trait QaPipeline {
    fn run(&mut self, query: &str, params: PipelineParams) -> anyhow::Result<Prediction>;
}

/// Retrieves `retriever_top_k` passages, then extracts `reader_top_k` answers from them.
///
/// Borrows its collaborators for the duration of one review batch.
pub struct ExtractiveQaPipeline<'a> {
    store: &'a DocumentStore,
    retriever: &'a mut dyn Retriever,
    reader: &'a mut dyn Reader,
}

impl<'a> ExtractiveQaPipeline<'a> {
    pub fn new(
        store: &'a DocumentStore,
        retriever: &'a mut dyn Retriever,
        reader: &'a mut dyn Reader,
    ) -> Self {
        Self {
            store,
            retriever,
            reader,
        }
    }
}

impl QaPipeline for ExtractiveQaPipeline<'_> {
    fn run(&mut self, query: &str, params: PipelineParams) -> anyhow::Result<Prediction> {
        let retrieved = self
            .retriever
            .retrieve(self.store, query, params.retriever_top_k)?;
        let documents: Vec<Document> = retrieved.into_iter().map(|r| r.document).collect();

        let mut answers = self.reader.predict(query, &documents, params.reader_top_k)?;
        answers.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        answers.truncate(params.reader_top_k);

        debug!(
            passages = documents.len(),
            answers = answers.len(),
            "pipeline run complete"
        );
        Ok(Prediction {
            query: query.to_string(),
            category: display_category(query).map(str::to_string),
            answers,
        })
    }
}
