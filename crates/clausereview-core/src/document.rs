//! Documents, answers, and predictions shared between the store, reader, and review flow.

use serde::{Deserialize, Serialize};

/// One paragraph of a converted contract file.
///
/// The retriever ranks these and the reader extracts answer spans from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// `<file name>#<paragraph index>`; unique within a store.
    pub id: String,
    pub content: String,
    pub meta: DocumentMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Source file name as uploaded.
    pub name: String,
    /// Zero-based paragraph position within the source file.
    pub paragraph: usize,
}

impl Document {
    pub fn new(name: &str, paragraph: usize, content: String) -> Self {
        Self {
            id: format!("{name}#{paragraph}"),
            content,
            meta: DocumentMeta {
                name: name.to_string(),
                paragraph,
            },
        }
    }
}

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A single extracted answer candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Verbatim text of the span.
    pub answer: String,
    /// Reader confidence in `[0, 1]`.
    pub score: f32,
    /// Surrounding text of the source paragraph.
    pub context: String,
    /// Span of `answer` within `context`.
    pub offsets_in_context: Span,
    /// Span of `answer` within the source paragraph.
    pub offsets_in_document: Span,
    pub document_id: String,
    /// Source file name.
    pub meta_name: String,
}

/// Result of running the pipeline for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub query: String,
    /// Display name of the clause category, when the query is a catalogue question.
    pub category: Option<String>,
    /// Sorted by descending score.
    pub answers: Vec<Answer>,
}

/// Per-call knobs for the retrieve-then-extract pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Paragraphs handed from the retriever to the reader.
    pub retriever_top_k: usize,
    /// Answers kept per question.
    pub reader_top_k: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            retriever_top_k: 1,
            reader_top_k: 5,
        }
    }
}
