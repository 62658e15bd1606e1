//! Answer span decoding from start/end logits.
//!
//! Scores every `(start, end)` token pair inside the context with
//! `end - start < max_answer_len`, using the product of the start and end
//! softmax probabilities (softmax taken over context tokens only).

/// A candidate answer span in token coordinates. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanCandidate {
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

/// Best `top_k` spans, highest score first.
///
/// `context_mask[i]` marks tokens that belong to the passage; question and
/// special tokens can never start or end an answer.
pub fn best_spans(
    start_logits: &[f32],
    end_logits: &[f32],
    context_mask: &[bool],
    max_answer_len: usize,
    top_k: usize,
) -> Vec<SpanCandidate> {
    let len = start_logits.len().min(end_logits.len()).min(context_mask.len());
    if len == 0 || top_k == 0 || max_answer_len == 0 {
        return Vec::new();
    }

    let start_probs = masked_softmax(&start_logits[..len], &context_mask[..len]);
    let end_probs = masked_softmax(&end_logits[..len], &context_mask[..len]);

    let mut candidates = Vec::new();
    for start in (0..len).filter(|&i| context_mask[i]) {
        let last = (start + max_answer_len).min(len);
        for end in (start..last).filter(|&j| context_mask[j]) {
            candidates.push(SpanCandidate {
                start,
                end,
                score: start_probs[start] * end_probs[end],
            });
        }
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(top_k);
    candidates
}

/// Softmax over masked-in positions; masked-out positions get probability 0.
fn masked_softmax(logits: &[f32], mask: &[bool]) -> Vec<f32> {
    let max = logits
        .iter()
        .zip(mask)
        .filter(|(_, m)| **m)
        .map(|(l, _)| *l)
        .fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f32> = logits
        .iter()
        .zip(mask)
        .map(|(l, m)| if *m { (l - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_peak_start_and_end() {
        // Tokens 0-1 are question, 2-6 context.
        let start = [9.0, 9.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        let end = [9.0, 9.0, 0.0, 0.0, 0.0, 5.0, 0.0];
        let mask = [false, false, true, true, true, true, true];

        let spans = best_spans(&start, &end, &mask, 10, 1);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (3, 5));
    }

    #[test]
    fn never_ends_before_start() {
        let start = [0.0, 0.0, 5.0];
        let end = [5.0, 0.0, 0.0];
        let mask = [true, true, true];

        for span in best_spans(&start, &end, &mask, 10, 10) {
            assert!(span.end >= span.start);
        }
    }

    #[test]
    fn respects_max_answer_len() {
        let start = [5.0, 0.0, 0.0, 0.0, 0.0];
        let end = [0.0, 0.0, 0.0, 0.0, 5.0];
        let mask = [true; 5];

        let spans = best_spans(&start, &end, &mask, 2, 20);
        assert!(spans.iter().all(|s| s.end - s.start < 2));
        assert!(!spans.iter().any(|s| (s.start, s.end) == (0, 4)));
    }

    #[test]
    fn masked_tokens_excluded() {
        let start = [10.0, 0.0, 0.0];
        let end = [10.0, 0.0, 0.0];
        let mask = [false, true, true];

        let spans = best_spans(&start, &end, &mask, 5, 10);
        assert!(spans.iter().all(|s| s.start >= 1 && s.end >= 1));
        assert_eq!(spans.len(), 3); // (1,1), (1,2), (2,2)
    }

    #[test]
    fn scores_descending_and_bounded() {
        let start = [1.0, 2.0, 3.0, 0.5];
        let end = [0.5, 3.0, 2.0, 1.0];
        let mask = [true; 4];

        let spans = best_spans(&start, &end, &mask, 4, 5);
        assert_eq!(spans.len(), 5);
        for pair in spans.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(spans.iter().all(|s| s.score > 0.0 && s.score <= 1.0));
    }

    #[test]
    fn empty_context_yields_nothing() {
        let spans = best_spans(&[1.0, 2.0], &[1.0, 2.0], &[false, false], 5, 5);
        assert!(spans.is_empty());
        assert!(best_spans(&[], &[], &[], 5, 5).is_empty());
    }

    #[test]
    fn softmax_sums_to_one_over_mask() {
        let probs = masked_softmax(&[1.0, 2.0, 3.0], &[true, false, true]);
        assert_eq!(probs[1], 0.0);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }
}
