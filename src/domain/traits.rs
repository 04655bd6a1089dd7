// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The pipeline only talks to its collaborators through these
// traits:
//   - Tokenize       -> WordPieceTokenizer, PretrainedTokenizer
//   - SpanPredictor  -> BurnSpanPredictor (or a fake in tests)
//   - PageFetcher    -> HttpFetcher (or canned HTML in tests)
//   - ContextSource  -> ContextLoader

use anyhow::Result;
use url::Url;

use crate::domain::encoding::{Encoding, ModelInput, SpanLogits, SpecialTokens};

// --- Tokenize ------------------------------------------------------------------
/// Anything that turns text into token ids plus byte spans.
pub trait Tokenize {
    /// Encode `text` without adding special tokens.
    fn encode(&self, text: &str) -> Result<Encoding>;

    /// Ids used to frame `[CLS] question [SEP] context [SEP]` and to pad.
    fn special_tokens(&self) -> SpecialTokens;
}

// --- SpanPredictor -------------------------------------------------------------
/// A question-answering model with a fixed input size.
///
/// One call takes one `ModelInput` of exactly `input_size()` positions
/// and returns raw start/end logits of the same length.
pub trait SpanPredictor {
    fn input_size(&self) -> usize;

    /// Whether `ModelInput::position_ids` must be filled in
    fn uses_position_ids(&self) -> bool {
        false
    }

    fn predict(&self, input: &ModelInput) -> Result<SpanLogits>;
}

// --- PageFetcher ---------------------------------------------------------------
/// Fetches the HTML body behind a URL.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> Result<String>;
}

// --- ContextSource -------------------------------------------------------------
/// Any component that can produce the paragraphs of a context.
pub trait ContextSource {
    fn load_paragraphs(&self) -> Result<Vec<String>>;

    /// Paragraphs joined with newlines
    fn load_context(&self) -> Result<String> {
        Ok(self.load_paragraphs()?.join("\n"))
    }
}
