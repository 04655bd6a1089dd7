// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// From raw sources to fixed-shape model inputs:
//
//   literal text / URLs
//       |
//       v
//   ContextLoader     -> fetches pages, keeps <p> text
//       |
//       v
//   Preprocessor      -> one clean line per paragraph
//       |
//       v
//   Tokenizer         -> (infra) ids + byte spans
//       |
//       v
//   prepare_windows   -> [CLS] q [SEP] c [SEP] padded windows

/// Context sources, page fetching and <p> extraction
pub mod loader;

/// Paragraph cleaning
pub mod preprocessor;

/// Sliding-window model input preparation
pub mod windowing;
