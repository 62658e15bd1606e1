//! ONNX Runtime extractive reader for question-answering models.
//!
//! Runs a span-extraction model (e.g. RoBERTa fine-tuned on CUAD, exported
//! with `start_logits` / `end_logits` outputs). The model directory must
//! contain `model.onnx` and `tokenizer.json`.
//!
//! Each `(question, passage)` pair is tokenized with only the passage
//! truncated, so long passages are split into overlapping windows of
//! `max_seq_len` tokens with `doc_stride` tokens of overlap. Every window is
//! scored independently and the best spans across all windows are kept.

use std::path::Path;

use clausereview_core::{Answer, Document};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Encoding, Tokenizer, TruncationParams, TruncationStrategy};
use tracing::{debug, info};

use crate::reader::{Reader, ReaderOptions, build_answer};
use crate::span::best_spans;

/// Transformer reader using ONNX Runtime.
pub struct OnnxReader {
    session: Session,
    tokenizer: Tokenizer,
    /// Same vocabulary without truncation, for measuring the question.
    untruncated: Tokenizer,
    /// BERT-style models take `token_type_ids`; RoBERTa-style models do not.
    uses_token_types: bool,
    options: ReaderOptions,
}

impl OnnxReader {
    /// Load a QA model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path, options: ReaderOptions) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let uses_token_types = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        let untruncated = tokenizer.clone();

        // Only the passage is truncated; overflow becomes extra windows.
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_seq_len,
                stride: options.doc_stride,
                strategy: TruncationStrategy::OnlySecond,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(None);

        info!(
            model = %model_path.display(),
            uses_token_types,
            max_seq_len = options.max_seq_len,
            "loaded reader model"
        );
        Ok(Self {
            session,
            tokenizer,
            untruncated,
            uses_token_types,
            options,
        })
    }

    /// Encode a question/passage pair into its windows.
    ///
    /// Fails, rather than letting the tokenizer panic, when the question
    /// leaves no more than `doc_stride` tokens for the passage.
    fn windows(&self, query: &str, passage: &str) -> anyhow::Result<Vec<Encoding>> {
        let overhead = self
            .untruncated
            .encode((query, ""), true)
            .map_err(|e| anyhow::anyhow!("tokenize question: {e}"))?
            .len();
        self.options.passage_budget(overhead)?;

        let encoding = self
            .tokenizer
            .encode((query, passage), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let mut windows = encoding.get_overflowing().clone();
        windows.insert(0, encoding);
        Ok(windows)
    }

    /// Run the model on one window, returning `(start_logits, end_logits)`.
    fn logits(&mut self, window: &Encoding) -> anyhow::Result<(Vec<f32>, Vec<f32>)> {
        let seq_len = window.get_ids().len();
        let shape = [1i64, seq_len as i64];

        let input_ids: Vec<i64> = window.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = window
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        let outputs = if self.uses_token_types {
            let token_type_ids: Vec<i64> =
                window.get_type_ids().iter().map(|&t| t as i64).collect();
            let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;
            self.session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])?
        } else {
            self.session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?
        };

        let (start_shape, start_data) = outputs[0].try_extract_tensor::<f32>()?;
        let (end_shape, end_data) = outputs[1].try_extract_tensor::<f32>()?;
        let start_dims: &[i64] = start_shape;
        let end_dims: &[i64] = end_shape;
        anyhow::ensure!(
            start_dims == [1, seq_len as i64] && end_dims == [1, seq_len as i64],
            "unexpected logits shape: start {start_dims:?}, end {end_dims:?}, expected [1, {seq_len}]"
        );

        Ok((start_data.to_vec(), end_data.to_vec()))
    }
}

impl Reader for OnnxReader {
    fn predict(
        &mut self,
        query: &str,
        documents: &[Document],
        top_k: usize,
    ) -> anyhow::Result<Vec<Answer>> {
        let mut answers: Vec<Answer> = Vec::new();

        for doc in documents {
            let windows = self.windows(query, &doc.content)?;
            debug!(document = %doc.id, windows = windows.len(), "reading passage");

            for window in &windows {
                let (start_logits, end_logits) = self.logits(window)?;
                let context_mask: Vec<bool> = window
                    .get_sequence_ids()
                    .iter()
                    .map(|s| *s == Some(1))
                    .collect();

                let offsets = window.get_offsets();
                for span in best_spans(
                    &start_logits,
                    &end_logits,
                    &context_mask,
                    self.options.max_answer_len,
                    top_k,
                ) {
                    let byte_start = offsets[span.start].0;
                    let byte_end = offsets[span.end].1;
                    if let Some(answer) = build_answer(
                        doc,
                        byte_start,
                        byte_end,
                        span.score,
                        self.options.context_window,
                    ) {
                        answers.push(answer);
                    }
                }
            }
        }

        answers.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        // Overlapping windows can propose the same span twice; keep the best.
        let mut seen = Vec::new();
        answers.retain(|a| {
            let key = (a.document_id.clone(), a.offsets_in_document);
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        answers.truncate(top_k);
        Ok(answers)
    }
}
