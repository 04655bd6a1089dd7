// ============================================================
// Layer 3 - Answer Types
// ============================================================
// Post-softmax probabilities, the answer window picked by the
// scorer, and the response handed back to whatever driver
// (CLI, interactive session, test) asked the question.

use serde::{Deserialize, Serialize};

use crate::domain::encoding::ByteSpan;
use crate::domain::error::ScoreError;

/// A score vector whose entries are finite and non-negative.
///
/// The scorer multiplies start and end entries, which only ranks
/// spans correctly for probabilities. Raw logits have to go
/// through softmax first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probabilities(Vec<f32>);

impl Probabilities {
    pub fn new(values: Vec<f32>) -> Result<Self, ScoreError> {
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ScoreError::InvalidScore { index, value });
        }
        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for Probabilities {
    type Error = ScoreError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// Best contiguous span found by the scorer.
///
/// `start` and `end` are inclusive token indices local to the
/// context region that was scored (index 0 is the first context token).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerWindow {
    pub score: f32,
    pub start: usize,
    pub end:   usize,
}

impl AnswerWindow {
    /// Shift the window by `offset` tokens
    pub fn offset(self, offset: usize) -> Self {
        Self { start: self.start + offset, end: self.end + offset, ..self }
    }
}

/// Result of one question against a prepared context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResponse {
    pub question:     String,
    pub answer:       String,
    pub score:        f32,
    /// Byte range of `answer` inside the context
    pub span:         ByteSpan,
    pub elapsed_secs: f64,
}
