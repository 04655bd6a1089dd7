// ============================================================
// Layer 5 - ML Layer
// ============================================================
// Everything that touches model outputs.
//
//   scorer.rs      - best answer window over start/end probabilities
//   postprocess.rs - softmax, argmax, top-k
//   model.rs       - burn transformer encoder with a span head
//   inferencer.rs  - SpanPredictor backed by the burn model
//
// Only model.rs and inferencer.rs import burn. The scorer and the
// post-processing are plain slices in, plain values out.

/// Answer-window search
pub mod scorer;

/// Softmax and classification decoding
pub mod postprocess;

/// Transformer encoder Q&A model architecture
pub mod model;

/// Burn-backed span predictor
pub mod inferencer;
