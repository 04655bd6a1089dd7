// ============================================================
// Layer 5 - Answer-Window Scorer
// ============================================================
// Given post-softmax start and end distributions over the full
// input ([CLS] question [SEP] context [SEP] padding), find the
// contiguous context span (i, j) maximising
//
//     start[i] * end[j]     with  i <= j  and  j - i <= max_answer_len
//
// Conceptually this is the upper band of the outer product of the
// two vectors restricted to the context region:
//
//            end ->
//        s  [ x x x x . . ]     x = valid cell
//        t  [ . x x x x . ]     . = zeroed (j < i, or span too long)
//        a  [ . . x x x x ]
//        r  [ . . . x x x ]
//        t  [ . . . . x x ]
//
// Only the band is visited, so the cost is O(len * max_answer_len).
// Cells are scanned row by row and only a strictly greater score
// replaces the current best, so ties go to the first cell in
// row-major order.

use std::ops::Range;

use crate::domain::answer::{AnswerWindow, Probabilities};
use crate::domain::error::ScoreError;

/// Longest answer, in tokens past the start token, that the scorer accepts.
pub const DEFAULT_MAX_ANSWER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerWindowScorer {
    max_answer_len: usize,
}

impl AnswerWindowScorer {
    /// `max_answer_len` bounds `end - start`, so a window covers at most
    /// `max_answer_len + 1` tokens.
    pub fn new(max_answer_len: usize) -> Self {
        Self { max_answer_len }
    }

    pub fn max_answer_len(&self) -> usize {
        self.max_answer_len
    }

    /// Best window inside `context`, reported in context-local indices.
    pub fn best_window(
        &self,
        start_score: &Probabilities,
        end_score:   &Probabilities,
        context:     Range<usize>,
    ) -> Result<AnswerWindow, ScoreError> {
        if start_score.len() != end_score.len() {
            return Err(ScoreError::LengthMismatch {
                start: start_score.len(),
                end:   end_score.len(),
            });
        }
        if context.end <= context.start {
            return Err(ScoreError::EmptyContext { start: context.start, end: context.end });
        }
        if context.end > start_score.len() {
            return Err(ScoreError::OutOfBounds { end: context.end, len: start_score.len() });
        }

        let starts = &start_score.as_slice()[context.clone()];
        let ends   = &end_score.as_slice()[context];
        let last   = starts.len() - 1;

        let mut best = AnswerWindow { score: starts[0] * ends[0], start: 0, end: 0 };
        for (i, &p_start) in starts.iter().enumerate() {
            let band_end = (i + self.max_answer_len).min(last);
            for (j, &p_end) in ends.iter().enumerate().take(band_end + 1).skip(i) {
                let score = p_start * p_end;
                if score > best.score {
                    best = AnswerWindow { score, start: i, end: j };
                }
            }
        }
        Ok(best)
    }
}

impl Default for AnswerWindowScorer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ANSWER_LEN)
    }
}

/// Scores `[context_start_idx, context_end_idx)` with the default
/// 16-token cap.
pub fn find_best_answer_window(
    start_score:       &Probabilities,
    end_score:         &Probabilities,
    context_start_idx: usize,
    context_end_idx:   usize,
) -> Result<AnswerWindow, ScoreError> {
    AnswerWindowScorer::default().best_window(
        start_score,
        end_score,
        context_start_idx..context_end_idx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn probs(values: &[f32]) -> Probabilities {
        Probabilities::new(values.to_vec()).unwrap()
    }

    /// Small deterministic generator so property checks need no extra crate.
    fn pseudo_random(seed: u64, n: usize) -> Vec<f32> {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) % 1000) as f32 / 1000.0
            })
            .collect()
    }

    #[test]
    fn test_picks_obvious_span() {
        let start = probs(&[0.1, 0.1, 0.7, 0.1]);
        let end   = probs(&[0.1, 0.1, 0.1, 0.7]);
        let w = find_best_answer_window(&start, &end, 0, 4).unwrap();
        assert_eq!((w.start, w.end), (2, 3));
        assert!((w.score - 0.49).abs() < 1e-6);
    }

    #[test]
    fn test_single_token_context() {
        let start = probs(&[0.2, 0.3, 0.5]);
        let end   = probs(&[0.6, 0.3, 0.1]);
        let w = find_best_answer_window(&start, &end, 1, 2).unwrap();
        assert_eq!((w.start, w.end), (0, 0));
        assert!((w.score - 0.09).abs() < 1e-6);
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(17)]
    #[case(40)]
    fn test_uniform_scores_take_first_cell(#[case] len: usize) {
        // Every valid cell has the same product, so the row-major
        // first one, (0, 0), wins.
        let uniform = probs(&vec![1.0 / len as f32; len]);
        let w = find_best_answer_window(&uniform, &uniform, 0, len).unwrap();
        assert_eq!((w.start, w.end), (0, 0));
    }

    #[test]
    fn test_ties_go_to_first_row_major_cell() {
        // (0,1) and (1,1) both score 0.25; row 0 is scanned first.
        let start = probs(&[0.5, 0.5, 0.0]);
        let end   = probs(&[0.0, 0.5, 0.5]);
        let w = find_best_answer_window(&start, &end, 0, 3).unwrap();
        assert_eq!((w.start, w.end), (0, 1));
    }

    #[test]
    fn test_over_long_span_is_rejected() {
        // Unconstrained argmax is (0, 20) = 0.81, which is 20 tokens long.
        let mut start = vec![0.001; 24];
        let mut end   = vec![0.001; 24];
        start[0] = 0.9;
        end[20]  = 0.9;
        end[10]  = 0.05;
        let w = find_best_answer_window(&probs(&start), &probs(&end), 0, 24).unwrap();
        assert_eq!((w.start, w.end), (0, 10));
        assert!(w.end - w.start <= DEFAULT_MAX_ANSWER_LEN);
    }

    #[test]
    fn test_cap_is_configurable() {
        let start = probs(&[0.9, 0.01, 0.01, 0.01]);
        let end   = probs(&[0.01, 0.01, 0.01, 0.9]);
        let wide   = AnswerWindowScorer::new(3).best_window(&start, &end, 0..4).unwrap();
        let narrow = AnswerWindowScorer::new(1).best_window(&start, &end, 0..4).unwrap();
        assert_eq!((wide.start, wide.end), (0, 3));
        assert!(narrow.end - narrow.start <= 1);
    }

    #[test]
    fn test_indices_are_context_local() {
        let start = probs(&[0.9, 0.0, 0.1, 0.8, 0.1, 0.9]);
        let end   = probs(&[0.9, 0.0, 0.1, 0.1, 0.8, 0.9]);
        // The two 0.9 pairs sit outside the context [2, 5).
        let w = find_best_answer_window(&start, &end, 2, 5).unwrap();
        assert_eq!((w.start, w.end), (1, 2));
        assert!((w.score - 0.64).abs() < 1e-6);
    }

    #[test]
    fn test_properties_hold_on_random_inputs() {
        for seed in 0..50u64 {
            let n = 1 + (seed as usize * 7) % 60;
            let start = probs(&pseudo_random(seed, n));
            let end   = probs(&pseudo_random(seed + 1000, n));
            let cs = (seed as usize) % n;
            let ce = cs + 1 + (seed as usize * 3) % (n - cs);

            let w = find_best_answer_window(&start, &end, cs, ce).unwrap();
            assert!(cs + w.start <= cs + w.end && cs + w.end < ce);
            assert!(w.end - w.start <= DEFAULT_MAX_ANSWER_LEN);
            let expected = start.as_slice()[cs + w.start] * end.as_slice()[cs + w.end];
            assert!((w.score - expected).abs() < 1e-7);

            // Pure: same input, same output.
            assert_eq!(find_best_answer_window(&start, &end, cs, ce).unwrap(), w);
        }
    }

    #[rstest]
    #[case(&[0.1, 0.2], &[0.1], 0, 1, ScoreError::LengthMismatch { start: 2, end: 1 })]
    #[case(&[0.1, 0.2], &[0.1, 0.2], 1, 1, ScoreError::EmptyContext { start: 1, end: 1 })]
    #[case(&[0.1, 0.2], &[0.1, 0.2], 2, 1, ScoreError::EmptyContext { start: 2, end: 1 })]
    #[case(&[0.1, 0.2], &[0.1, 0.2], 0, 3, ScoreError::OutOfBounds { end: 3, len: 2 })]
    fn test_invalid_arguments(
        #[case] start: &[f32],
        #[case] end: &[f32],
        #[case] cs: usize,
        #[case] ce: usize,
        #[case] expected: ScoreError,
    ) {
        let err = find_best_answer_window(&probs(start), &probs(end), cs, ce).unwrap_err();
        assert_eq!(err, expected);
    }
}
