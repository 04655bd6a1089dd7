// ============================================================
// Layer 6 - Vocabulary WordPiece Tokenizer
// ============================================================
// Tokenizes with nothing but a BERT `vocab.txt`
// (one token per line, id = line number), assembling the same
// pipeline a BERT `tokenizer.json` describes:
//
//   "Unaffable, Café?"
//       |  BertNormalizer: clean text, lowercase, strip accents,
//       |  pad CJK chars so each one is its own word
//       v
//   "unaffable, cafe?"
//       |  BertPreTokenizer: whitespace + one word per punctuation char
//       v
//   [unaffable] [,] [cafe] [?]
//       |  WordPiece, greedy longest-match-first, `##` continuation
//       v
//   un ##aff ##able , cafe ?
//
// Every sub-token carries the byte span of the WHOLE word it came
// from, so an answer window always expands to whole words of the
// original text.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{NormalizerWrapper, PreTokenizerWrapper, Tokenizer};

use crate::domain::encoding::{ByteSpan, Encoding, SpecialTokens};
use crate::domain::traits::Tokenize;
use crate::infra::tokenizer_store::special_tokens;

/// Words longer than this are mapped straight to `[UNK]`
const MAX_WORD_CHARS: usize = 100;

const UNK: &str = "[UNK]";

pub struct WordPieceTokenizer {
    inner:   Tokenizer,
    special: SpecialTokens,
}

impl WordPieceTokenizer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read vocabulary '{}'", path.display()))?;
        let tokenizer = Self::from_tokens(text.lines().map(str::trim_end))?;
        tracing::info!("Loaded {} vocabulary entries from '{}'", tokenizer.len(), path.display());
        Ok(tokenizer)
    }

    /// Build from tokens in id order. A repeated token keeps its first id.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab: HashMap<String, u32> = HashMap::new();
        for (id, token) in tokens.into_iter().enumerate() {
            let id = u32::try_from(id).context("Vocabulary too large")?;
            vocab.entry(token.into()).or_insert(id);
        }
        if !vocab.contains_key(UNK) {
            return Err(anyhow!("Vocabulary has no '{UNK}' token"));
        }

        let model = WordPiece::builder()
            .vocab(vocab)
            .unk_token(UNK.into())
            .continuing_subword_prefix("##".into())
            .max_input_chars_per_word(MAX_WORD_CHARS)
            .build()
            .map_err(|e| anyhow!("Cannot build WordPiece model: {e}"))?;

        let mut inner = Tokenizer::new(model);
        inner
            .with_normalizer(NormalizerWrapper::from(BertNormalizer::new(true, true, Some(true), true)))
            .with_pre_tokenizer(PreTokenizerWrapper::from(BertPreTokenizer));

        let special = special_tokens(&inner)?;
        Ok(Self { inner, special })
    }

    pub fn len(&self) -> usize {
        self.inner.get_vocab_size(false)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Tokenize for WordPieceTokenizer {
    fn encode(&self, text: &str) -> Result<Encoding> {
        let enc = self.inner.encode(text, false)
            .map_err(|e| anyhow!("Tokenise: {e}"))?;

        let spans = enc.get_word_ids()
            .iter()
            .zip(enc.get_offsets())
            .map(|(word, &offsets)| {
                word.and_then(|w| enc.word_to_chars(w, 0))
                    .unwrap_or(offsets)
            })
            .map(ByteSpan::from)
            .collect();
        Ok(Encoding::new(enc.get_ids().to_vec(), spans)?)
    }

    fn special_tokens(&self) -> SpecialTokens {
        self.special
    }
}
