// ============================================================
// Layer 3 - Encoding Types
// ============================================================
// A tokenizer turns text into two aligned sequences:
//
//   tokens: [ 2054, 2003, 1996, 3007, ... ]      (vocabulary ids)
//   spans:  [ (0,4), (5,7), (8,11), (12,19), ... ] (byte offsets)
//
// The span map is what lets us turn a predicted token window
// back into a slice of the original context string.
//
// Offsets are BYTE offsets into the source `&str`, so slicing
// with them is always on a char boundary.

use serde::{Deserialize, Serialize};

use crate::domain::error::QaError;

/// Ordered vocabulary ids for one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSequence(Vec<u32>);

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl From<Vec<u32>> for TokenSequence {
    fn from(ids: Vec<u32>) -> Self {
        Self(ids)
    }
}

/// Half-open byte range `[start, end)` of one token in its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteSpan {
    pub start: usize,
    pub end:   usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<(usize, usize)> for ByteSpan {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// One `ByteSpan` per token, in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMap(Vec<ByteSpan>);

impl SpanMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ByteSpan> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[ByteSpan] {
        &self.0
    }
}

/// Output of a tokenizer: ids and their source spans, always aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    tokens: TokenSequence,
    spans:  SpanMap,
}

impl Encoding {
    /// Build an encoding from parallel vectors.
    /// Fails if the two sides do not have the same length.
    pub fn new(ids: Vec<u32>, spans: Vec<ByteSpan>) -> Result<Self, QaError> {
        if ids.len() != spans.len() {
            return Err(QaError::MisalignedEncoding {
                tokens: ids.len(),
                spans:  spans.len(),
            });
        }
        Ok(Self { tokens: TokenSequence(ids), spans: SpanMap(spans) })
    }

    /// Append a single token. Keeps both sides aligned by construction.
    pub fn push(&mut self, id: u32, span: ByteSpan) {
        self.tokens.0.push(id);
        self.spans.0.push(span);
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn spans(&self) -> &SpanMap {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Ids of the BERT-style special tokens used to frame model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub cls: u32,
    pub sep: u32,
    pub pad: u32,
}

/// Fixed-shape input record for one inference call.
///
/// Every vector has exactly `input_size` entries. `position_ids`
/// is only filled for models that declare they need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInput {
    pub input_ids:      Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_ids:   Option<Vec<i64>>,
}

impl ModelInput {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Raw start/end logits returned by the model, one per input position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanLogits {
    pub start: Vec<f32>,
    pub end:   Vec<f32>,
}
