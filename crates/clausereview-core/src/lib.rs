pub mod clause;
pub mod config;
pub mod document;

pub use clause::{ClauseQuestion, display_category, find_category, load_categories_and_questions};
pub use config::{ConfigError, ReviewConfig};
pub use document::{Answer, Document, DocumentMeta, PipelineParams, Prediction, Span};
