//! Error conditions owned by this crate.
//!
//! Scorer and pipeline conditions are typed with `thiserror` so callers
//! can match on them. Failures of external collaborators (HTTP, model
//! loading, inference) stay `anyhow::Error` and pass through untouched.

/// Invalid arguments handed to the answer-window scorer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("start and end scores differ in length ({start} vs {end})")]
    LengthMismatch { start: usize, end: usize },

    #[error("empty context region [{start}, {end})")]
    EmptyContext { start: usize, end: usize },

    #[error("context end {end} is past the score length {len}")]
    OutOfBounds { end: usize, len: usize },

    #[error("score at position {index} is not a probability: {value}")]
    InvalidScore { index: usize, value: f32 },
}

/// Conditions raised while answering a question.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("Error: Empty context")]
    EmptyContext,

    #[error("Error: Empty question")]
    EmptyQuestion,

    #[error(
        "question is too long for input size {input_size}: \
         {question_tokens} question tokens leave room for {capacity} context tokens, \
         at least {min_context_len} required"
    )]
    QuestionTooLong {
        input_size:      usize,
        question_tokens: usize,
        capacity:        usize,
        min_context_len: usize,
    },

    #[error("tokenizer produced {tokens} tokens but {spans} spans")]
    MisalignedEncoding { tokens: usize, spans: usize },

    #[error("model returned {start}/{end} start/end logits, expected {expected}")]
    LogitShape { expected: usize, start: usize, end: usize },

    #[error(transparent)]
    Score(#[from] ScoreError),
}
