// ============================================================
// Layer 6 - Pretrained Tokenizer
// ============================================================
// Wraps a HuggingFace `tokenizer.json` (the file shipped next to
// most exported BERT-style QA models). The `tokenizers` crate does
// normalisation, pre-tokenisation and WordPiece; we only pull out
// ids, byte offsets and the three special tokens we frame with.

use anyhow::{anyhow, Result};
use std::path::Path;
use tokenizers::Tokenizer;

use crate::domain::encoding::{ByteSpan, Encoding, SpecialTokens};
use crate::domain::traits::Tokenize;

pub struct PretrainedTokenizer {
    inner:   Tokenizer,
    special: SpecialTokens,
}

impl PretrainedTokenizer {
    /// Load from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))?;
        Self::new(inner)
    }

    pub fn new(inner: Tokenizer) -> Result<Self> {
        let special = special_tokens(&inner)?;
        Ok(Self { inner, special })
    }
}

/// Resolve `[CLS]`, `[SEP]` and `[PAD]`; any of them missing is a load error.
pub(crate) fn special_tokens(tokenizer: &Tokenizer) -> Result<SpecialTokens> {
    let id = |token: &str| {
        tokenizer.token_to_id(token)
            .ok_or_else(|| anyhow!("Tokenizer has no '{token}' token"))
    };
    Ok(SpecialTokens { cls: id("[CLS]")?, sep: id("[SEP]")?, pad: id("[PAD]")? })
}

impl Tokenize for PretrainedTokenizer {
    fn encode(&self, text: &str) -> Result<Encoding> {
        let enc = self.inner.encode(text, false)
            .map_err(|e| anyhow!("Tokenise: {e}"))?;
        let spans = enc.get_offsets().iter().copied().map(ByteSpan::from).collect();
        Ok(Encoding::new(enc.get_ids().to_vec(), spans)?)
    }

    fn special_tokens(&self) -> SpecialTokens {
        self.special
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Word-level tokenizer JSON in the HuggingFace format, enough to
    /// exercise offsets and special-token lookup without a model download.
    fn word_level_json(words: &[&str]) -> String {
        let mut vocab = serde_json::json!({
            "[PAD]": 0, "[UNK]": 1, "[CLS]": 101, "[SEP]": 102,
        });
        for (i, w) in words.iter().enumerate() {
            vocab[*w] = serde_json::json!(200 + i);
        }
        serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
        })
        .to_string()
    }

    fn load(words: &[&str]) -> Result<PretrainedTokenizer> {
        let path = std::env::temp_dir().join(format!(
            "extractive-qa-tok-{}-{}.json",
            std::process::id(),
            words.len()
        ));
        std::fs::write(&path, word_level_json(words))?;
        let tok = PretrainedTokenizer::from_file(&path);
        let _ = std::fs::remove_file(&path);
        tok
    }

    #[test]
    fn test_encode_returns_byte_offsets() {
        let tok = load(&["paris", "is", "big"]).unwrap();
        let text = "Paris is  BIG";
        let enc = tok.encode(text).unwrap();
        assert_eq!(enc.tokens().as_slice(), &[200, 201, 202]);
        let last = enc.spans().get(2).unwrap();
        assert_eq!(&text[last.start..last.end], "BIG");
    }

    #[test]
    fn test_special_tokens_are_resolved() {
        let tok = load(&["a"]).unwrap();
        assert_eq!(tok.special_tokens(), SpecialTokens { cls: 101, sep: 102, pad: 0 });
    }
}
