//! Storage layer: contracts directory, file conversion, paragraph store, TF-IDF retrieval.

mod contracts;
mod convert;
mod error;
mod retriever;
mod store;

pub use contracts::ContractsDir;
pub use convert::{clean_text, convert_file, convert_source, split_paragraphs};
pub use error::StoreError;
pub use retriever::{Retriever, ScoredDocument, TfidfRetriever};
pub use store::DocumentStore;
