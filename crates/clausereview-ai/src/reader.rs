use clausereview_core::{Answer, Document, ReviewConfig, Span};

/// Second stage of the pipeline: extract answer spans from retrieved passages.
pub trait Reader {
    /// Up to `top_k` answers across all `documents`, highest score first.
    fn predict(
        &mut self,
        query: &str,
        documents: &[Document],
        top_k: usize,
    ) -> anyhow::Result<Vec<Answer>>;
}

/// Windowing and span limits for a transformer reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub max_seq_len: usize,
    pub doc_stride: usize,
    pub max_answer_len: usize,
    pub context_window: usize,
}

impl From<&ReviewConfig> for ReaderOptions {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            max_seq_len: config.max_seq_len,
            doc_stride: config.doc_stride,
            max_answer_len: config.max_answer_len,
            context_window: config.context_window,
        }
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::from(&ReviewConfig::default())
    }
}

impl ReaderOptions {
    /// Tokens left for the passage once the question and special tokens
    /// (`question_overhead`) are placed in a window.
    ///
    /// Windowing needs `doc_stride` to be smaller than this budget.
    pub fn passage_budget(&self, question_overhead: usize) -> anyhow::Result<usize> {
        let budget = self.max_seq_len.saturating_sub(question_overhead);
        anyhow::ensure!(
            self.doc_stride < budget,
            "question takes {question_overhead} of {} tokens, leaving {budget} for the passage; \
             doc_stride ({}) must be smaller",
            self.max_seq_len,
            self.doc_stride
        );
        Ok(budget)
    }
}

/// Build an [`Answer`] from a byte range of `doc.content`.
///
/// Offsets in the answer are character offsets. The context keeps up to
/// `context_window` characters on each side of the span. Returns `None` when
/// the range is empty, out of bounds, or not on character boundaries.
pub fn build_answer(
    doc: &Document,
    byte_start: usize,
    byte_end: usize,
    score: f32,
    context_window: usize,
) -> Option<Answer> {
    let content = doc.content.as_str();
    if byte_start >= byte_end
        || byte_end > content.len()
        || !content.is_char_boundary(byte_start)
        || !content.is_char_boundary(byte_end)
    {
        return None;
    }

    let answer = content[byte_start..byte_end].trim();
    if answer.is_empty() {
        return None;
    }
    // Shift past any whitespace trimmed off the front.
    let lead = content[byte_start..byte_end].len() - content[byte_start..byte_end].trim_start().len();
    let byte_start = byte_start + lead;

    let char_start = content[..byte_start].chars().count();
    let char_end = char_start + answer.chars().count();
    let total_chars = content.chars().count();

    let ctx_start = char_start.saturating_sub(context_window);
    let ctx_end = (char_end + context_window).min(total_chars);
    let context: String = content
        .chars()
        .skip(ctx_start)
        .take(ctx_end - ctx_start)
        .collect();

    Some(Answer {
        answer: answer.to_string(),
        score,
        context,
        offsets_in_context: Span {
            start: char_start - ctx_start,
            end: char_end - ctx_start,
        },
        offsets_in_document: Span {
            start: char_start,
            end: char_end,
        },
        document_id: doc.id.clone(),
        meta_name: doc.meta.name.clone(),
    })
}
