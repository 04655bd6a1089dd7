// ============================================================
// Layer 4 - Input Windowing
// ============================================================
// The model takes a fixed number of positions (input_size). A
// question plus a long context rarely fits, so the context is cut
// into overlapping windows, each framed as
//
//   [CLS] question [SEP] context[start..start+cap] [SEP] [PAD]...
//    \_____ type 0 _____/ \________ type 1 ________/  type 0
//
// cap    = input_size - question_len - 3   (CLS + 2 x SEP)
// stride = cap / 2, so neighbouring windows overlap by half and an
// answer near a cut still appears whole in some window.
//
// Example, cap = 4, context of 10 tokens:
//   window 1: tokens 0..4
//   window 2: tokens 2..6
//   window 3: tokens 4..8
//   window 4: tokens 6..10   <- last window always reaches the end

use std::ops::Range;

use crate::domain::encoding::{ModelInput, SpecialTokens, TokenSequence};
use crate::domain::error::QaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub input_size:       usize,
    /// Smallest context slice worth running the model on
    pub min_context_len:  usize,
    pub use_position_ids: bool,
}

/// One model input plus what is needed to map its output back.
#[derive(Debug, Clone, PartialEq)]
pub struct InputWindow {
    pub input:           ModelInput,
    /// Number of pad positions at the tail of `input`
    pub padding:         usize,
    /// Index of this window's first token in the full context
    pub context_offset:  usize,
    pub question_tokens: usize,
}

impl InputWindow {
    /// Positions of the context tokens inside `input`: everything
    /// after `[CLS] q [SEP]` and before the closing `[SEP]` and padding.
    pub fn context_range(&self) -> Range<usize> {
        self.question_tokens + 2..self.input.len() - self.padding - 1
    }
}

pub fn prepare_windows(
    question: &TokenSequence,
    context:  &TokenSequence,
    special:  SpecialTokens,
    config:   &WindowConfig,
) -> Result<Vec<InputWindow>, QaError> {
    if context.is_empty() {
        return Err(QaError::EmptyContext);
    }

    let capacity = config.input_size.saturating_sub(question.len() + 3);
    if capacity < config.min_context_len.max(1) {
        return Err(QaError::QuestionTooLong {
            input_size:      config.input_size,
            question_tokens: question.len(),
            capacity,
            min_context_len: config.min_context_len,
        });
    }

    let stride = (capacity / 2).max(1);
    let ctx    = context.as_slice();

    let mut windows = Vec::new();
    let mut start   = 0usize;
    loop {
        let end = (start + capacity).min(ctx.len());
        windows.push(frame(question.as_slice(), &ctx[start..end], start, special, config));
        if end == ctx.len() {
            break;
        }
        start += stride;
    }

    tracing::debug!(
        "{} context tokens -> {} windows (capacity {}, stride {})",
        ctx.len(),
        windows.len(),
        capacity,
        stride
    );
    Ok(windows)
}

fn frame(
    question:       &[u32],
    context:        &[u32],
    context_offset: usize,
    special:        SpecialTokens,
    config:         &WindowConfig,
) -> InputWindow {
    let mut input_ids = Vec::with_capacity(config.input_size);
    input_ids.push(special.cls as i64);
    input_ids.extend(question.iter().map(|&t| t as i64));
    input_ids.push(special.sep as i64);
    input_ids.extend(context.iter().map(|&t| t as i64));
    input_ids.push(special.sep as i64);

    let used    = input_ids.len();
    let padding = config.input_size - used;

    let mut token_type_ids = vec![0i64; question.len() + 2];
    token_type_ids.resize(used, 1);
    token_type_ids.resize(config.input_size, 0);

    let mut attention_mask = vec![1i64; used];
    attention_mask.resize(config.input_size, 0);

    input_ids.resize(config.input_size, special.pad as i64);

    let position_ids = config
        .use_position_ids
        .then(|| (0..config.input_size as i64).collect());

    InputWindow {
        input: ModelInput { input_ids, attention_mask, token_type_ids, position_ids },
        padding,
        context_offset,
        question_tokens: question.len(),
    }
}
