use clausereview_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("ingesting {name}: {source}")]
    Ingest {
        name: String,
        #[source]
        source: StoreError,
    },

    /// One failing question aborts the rest of the batch.
    #[error("pipeline failed on {question}: {source}")]
    Pipeline {
        /// Category name when the query is a catalogue question, else the raw query.
        question: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
