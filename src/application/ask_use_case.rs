// ============================================================
// Layer 2 - Ask Use Case (QaPipeline)
// ============================================================
// One question in, one answer out:
//
//   1. Tokenize the question (the context was tokenized once,
//      when it was prepared)
//   2. Cut [CLS] q [SEP] c [SEP] into fixed-size windows
//   3. Run the model on every window
//   4. Softmax start/end logits, search the best answer window
//      inside the context part of each input
//   5. Keep the best-scoring window, map its tokens back to byte
//      offsets and slice the answer out of the context
//
// No printing here; drivers (CLI, interactive session, tests)
// decide what to do with the QaResponse.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::data::windowing::{prepare_windows, InputWindow, WindowConfig};
use crate::domain::answer::{AnswerWindow, QaResponse};
use crate::domain::encoding::{ByteSpan, Encoding, SpanLogits};
use crate::domain::error::QaError;
use crate::domain::traits::{SpanPredictor, Tokenize};
use crate::ml::postprocess::probabilities;
use crate::ml::scorer::{AnswerWindowScorer, DEFAULT_MAX_ANSWER_LEN};

/// Knobs of the answering step. The model's own input size comes
/// from the predictor, not from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on `end - start` of an answer, in tokens
    pub max_answer_len:  usize,
    /// Smallest context slice a window may carry
    pub min_context_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_answer_len:  DEFAULT_MAX_ANSWER_LEN,
            min_context_len: 16,
        }
    }
}

/// A context tokenized once and reused for every question.
#[derive(Debug, Clone)]
pub struct PreparedContext {
    text:     String,
    encoding: Encoding,
}

impl PreparedContext {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_count(&self) -> usize {
        self.encoding.len()
    }
}

pub struct QaPipeline {
    tokenizer: Box<dyn Tokenize>,
    predictor: Box<dyn SpanPredictor>,
    config:    PipelineConfig,
    scorer:    AnswerWindowScorer,
}

impl QaPipeline {
    pub fn new(
        tokenizer: Box<dyn Tokenize>,
        predictor: Box<dyn SpanPredictor>,
        config:    PipelineConfig,
    ) -> Self {
        let scorer = AnswerWindowScorer::new(config.max_answer_len);
        Self { tokenizer, predictor, config, scorer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Tokenize a context. Empty or token-less text is rejected here,
    /// before any model call.
    pub fn prepare_context(&self, text: impl Into<String>) -> Result<PreparedContext> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QaError::EmptyContext.into());
        }
        let encoding = self.tokenizer.encode(&text)?;
        if encoding.is_empty() {
            return Err(QaError::EmptyContext.into());
        }
        tracing::info!("Context ready: {} chars, {} tokens", text.len(), encoding.len());
        Ok(PreparedContext { text, encoding })
    }

    pub fn answer(&self, context: &PreparedContext, question: &str) -> Result<QaResponse> {
        let started = Instant::now();
        if question.trim().is_empty() {
            return Err(QaError::EmptyQuestion.into());
        }

        let question_enc = self.tokenizer.encode(question)?;
        let windows = prepare_windows(
            question_enc.tokens(),
            context.encoding.tokens(),
            self.tokenizer.special_tokens(),
            &WindowConfig {
                input_size:       self.predictor.input_size(),
                min_context_len:  self.config.min_context_len,
                use_position_ids: self.predictor.uses_position_ids(),
            },
        )?;

        let mut best: Option<AnswerWindow> = None;
        for window in &windows {
            let logits    = self.predictor.predict(&window.input)?;
            let candidate = self.score_window(window, &logits)?.offset(window.context_offset);
            tracing::debug!(
                "window @{}: tokens [{}, {}] score {:.4}",
                window.context_offset, candidate.start, candidate.end, candidate.score
            );
            if best.map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
        let best = best.ok_or(QaError::EmptyContext)?;

        let span   = self.byte_span(context, &best)?;
        let answer = context.text
            .get(span.start..span.end)
            .ok_or_else(|| anyhow!("answer span {}..{} is not inside the context", span.start, span.end))?
            .to_string();

        Ok(QaResponse {
            question:     question.to_string(),
            answer,
            score:        best.score,
            span,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }

    /// Convenience for one-shot callers: prepare the context and answer.
    pub fn answer_once(&self, context: &str, question: &str) -> Result<QaResponse> {
        let prepared = self.prepare_context(context)?;
        self.answer(&prepared, question)
    }

    fn score_window(&self, window: &InputWindow, logits: &SpanLogits) -> Result<AnswerWindow, QaError> {
        let expected = window.input.len();
        if logits.start.len() != expected || logits.end.len() != expected {
            return Err(QaError::LogitShape {
                expected,
                start: logits.start.len(),
                end:   logits.end.len(),
            });
        }
        let start = probabilities(&logits.start)?;
        let end   = probabilities(&logits.end)?;
        Ok(self.scorer.best_window(&start, &end, window.context_range())?)
    }

    fn byte_span(&self, context: &PreparedContext, window: &AnswerWindow) -> Result<ByteSpan> {
        let spans = context.encoding.spans();
        let first = spans.get(window.start);
        let last  = spans.get(window.end);
        match (first, last) {
            (Some(first), Some(last)) => Ok(ByteSpan::new(first.start, last.end)),
            _ => Err(anyhow!(
                "token window [{}, {}] outside span map of {} tokens",
                window.start, window.end, spans.len()
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::encoding::ModelInput;
    use crate::infra::vocab::WordPieceTokenizer;

    pub(crate) const VOCAB: &[&str] = &[
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "what", "is", "the", "capital",
        "of", "france", "paris", "it", "a", "big", "city", "and", "?", ".",
        "river", "seine", "runs", "through",
    ];

    pub(crate) fn id(token: &str) -> i64 {
        VOCAB.iter().position(|t| *t == token).unwrap() as i64
    }

    /// Puts a high start logit on every `start_token` and a high end
    /// logit on every `end_token`; everything else gets zero.
    pub(crate) struct TargetPredictor {
        pub input_size:  usize,
        pub start_token: i64,
        pub end_token:   i64,
    }

    impl SpanPredictor for TargetPredictor {
        fn input_size(&self) -> usize {
            self.input_size
        }

        fn predict(&self, input: &ModelInput) -> Result<SpanLogits> {
            let pick = |target: i64| -> Vec<f32> {
                input.input_ids.iter()
                    .zip(&input.token_type_ids)
                    .map(|(&t, &ty)| if t == target && ty == 1 { 10.0 } else { 0.0 })
                    .collect()
            };
            Ok(SpanLogits { start: pick(self.start_token), end: pick(self.end_token) })
        }
    }

    struct BrokenPredictor;

    impl SpanPredictor for BrokenPredictor {
        fn input_size(&self) -> usize {
            32
        }

        fn predict(&self, _input: &ModelInput) -> Result<SpanLogits> {
            Ok(SpanLogits { start: vec![0.0; 3], end: vec![0.0; 3] })
        }
    }

    pub(crate) fn pipeline(predictor: impl SpanPredictor + 'static, min_context_len: usize) -> QaPipeline {
        let tokenizer = WordPieceTokenizer::from_tokens(VOCAB.iter().copied()).unwrap();
        QaPipeline::new(
            Box::new(tokenizer),
            Box::new(predictor),
            PipelineConfig { min_context_len, ..PipelineConfig::default() },
        )
    }

    const CONTEXT: &str = "The capital of France is Paris. It is a big city.";

    #[test]
    fn test_answers_single_word() {
        let qa = pipeline(
            TargetPredictor { input_size: 32, start_token: id("paris"), end_token: id("paris") },
            4,
        );
        let resp = qa.answer_once(CONTEXT, "What is the capital of France?").unwrap();
        assert_eq!(resp.answer, "Paris");
        assert_eq!(&CONTEXT[resp.span.start..resp.span.end], "Paris");
        assert!(resp.score > 0.9);
    }

    #[test]
    fn test_answers_multi_word_span() {
        let qa = pipeline(
            TargetPredictor { input_size: 32, start_token: id("a"), end_token: id("city") },
            4,
        );
        let resp = qa.answer_once(CONTEXT, "What is Paris?").unwrap();
        assert_eq!(resp.answer, "a big city");
    }

    #[test]
    fn test_answer_found_in_later_window() {
        // Long context, small input: the answer only appears in a late window.
        let context = format!("{} The river Seine runs through Paris.", "It is a big city. ".repeat(6));
        let qa = pipeline(
            TargetPredictor { input_size: 12, start_token: id("seine"), end_token: id("seine") },
            4,
        );
        let resp = qa.answer_once(&context, "river?").unwrap();
        assert_eq!(resp.answer, "Seine");
        assert!(resp.span.start > 100);
    }

    #[test]
    fn test_context_is_reused_across_questions() {
        let qa = pipeline(
            TargetPredictor { input_size: 32, start_token: id("paris"), end_token: id("paris") },
            4,
        );
        let ctx = qa.prepare_context(CONTEXT).unwrap();
        let first  = qa.answer(&ctx, "capital?").unwrap();
        let second = qa.answer(&ctx, "capital?").unwrap();
        assert_eq!(first.answer, second.answer);
        assert_eq!(first.span, second.span);
        assert_eq!(ctx.token_count(), 13);
    }

    #[test]
    fn test_empty_context_is_rejected() {
        let qa = pipeline(
            TargetPredictor { input_size: 32, start_token: 0, end_token: 0 },
            4,
        );
        for context in ["", "   \n "] {
            let err = qa.prepare_context(context).unwrap_err();
            assert!(matches!(err.downcast_ref::<QaError>(), Some(QaError::EmptyContext)));
            assert_eq!(err.to_string(), "Error: Empty context");
        }
    }

    #[test]
    fn test_empty_question_is_rejected() {
        let qa = pipeline(
            TargetPredictor { input_size: 32, start_token: 0, end_token: 0 },
            4,
        );
        let err = qa.answer_once(CONTEXT, "  ").unwrap_err();
        assert!(matches!(err.downcast_ref::<QaError>(), Some(QaError::EmptyQuestion)));
    }

    #[test]
    fn test_question_too_long_for_model() {
        let qa = pipeline(
            TargetPredictor { input_size: 12, start_token: 0, end_token: 0 },
            4,
        );
        let err = qa.answer_once(CONTEXT, "what is the capital of france and paris ?").unwrap_err();
        assert!(matches!(err.downcast_ref::<QaError>(), Some(QaError::QuestionTooLong { .. })));
    }

    #[test]
    fn test_wrong_logit_length_is_reported() {
        let qa = pipeline(BrokenPredictor, 4);
        let err = qa.answer_once(CONTEXT, "capital?").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QaError>(),
            Some(QaError::LogitShape { expected: 32, start: 3, end: 3 })
        ));
    }
}
