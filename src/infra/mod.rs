// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Loading the external artefacts the pipeline runs on:
//
//   checkpoint.rs      - model config + weights (burn CompactRecorder)
//   tokenizer_store.rs - HuggingFace tokenizer.json via `tokenizers`
//   vocab.rs           - WordPiece tokenizer over a plain vocab.txt
//   labels.rs          - class label files for classification output

/// Model checkpoint loading
pub mod checkpoint;

/// tokenizer.json loading
pub mod tokenizer_store;

/// vocab.txt WordPiece tokenizer
pub mod vocab;

/// Label files
pub mod labels;
