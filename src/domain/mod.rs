// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain typed records and traits shared by every other layer.
//
// Rules for this layer:
//   - NO burn types, NO HTTP, NO file I/O
//   - Only structs, enums, errors and traits
//
// The tokenizer, the inference runtime and the page fetcher
// are external collaborators. They are reached through the
// traits in `traits.rs` so the pipeline can be driven by the
// real implementations or by small fakes in tests.

/// Token ids, byte spans and fixed-shape model inputs
pub mod encoding;

/// Probabilities, answer windows and pipeline responses
pub mod answer;

/// Error conditions raised by the scorer and the pipeline
pub mod error;

/// Seams to the tokenizer, the model runtime and the context loader
pub mod traits;
