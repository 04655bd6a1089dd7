// ============================================================
// Layer 5 - Burn Span Predictor
// ============================================================
// Runs one fixed-shape `ModelInput` through the transformer and
// hands back raw start/end logits. Softmax and span search live
// in the pipeline, not here.
use anyhow::{anyhow, ensure, Result};
use burn::prelude::*;

use crate::domain::encoding::{ModelInput, SpanLogits};
use crate::domain::traits::SpanPredictor;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{QaModelInput, TransformerQaConfig, TransformerQaModel};

pub type InferBackend = burn::backend::Wgpu;

pub struct BurnSpanPredictor<B: Backend> {
    model:  TransformerQaModel<B>,
    config: TransformerQaConfig,
    device: B::Device,
}

impl<B: Backend> BurnSpanPredictor<B> {
    pub fn new(model: TransformerQaModel<B>, config: TransformerQaConfig, device: B::Device) -> Self {
        Self { model, config, device }
    }

    /// Rebuild the architecture from `model_config.json`, then load weights.
    pub fn from_checkpoint(ckpt: &CheckpointManager, device: B::Device) -> Result<Self> {
        let config = ckpt.load_config()?;
        let model: TransformerQaModel<B> = config.init(&device);
        let model = ckpt.load_model(model, &device)?;
        tracing::info!(
            "Model loaded (input size {}, {} layers)",
            config.max_seq_len,
            config.num_layers
        );
        Ok(Self::new(model, config, device))
    }

    fn row(&self, values: &[i64]) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(values, &self.device).reshape([1, values.len()])
    }
}

impl<B: Backend> SpanPredictor for BurnSpanPredictor<B> {
    fn input_size(&self) -> usize {
        self.config.max_seq_len
    }

    fn uses_position_ids(&self) -> bool {
        self.config.use_position_ids
    }

    fn predict(&self, input: &ModelInput) -> Result<SpanLogits> {
        ensure!(
            input.len() == self.input_size(),
            "model expects {} positions, got {}",
            self.input_size(),
            input.len()
        );
        // Embedding lookups do not bounds-check on every backend
        ensure_ids_below(&input.input_ids, self.config.vocab_size, "token id")?;
        ensure_ids_below(&input.token_type_ids, self.config.type_vocab_size, "token type id")?;
        if let Some(positions) = &input.position_ids {
            ensure_ids_below(positions, self.config.max_seq_len, "position id")?;
        }

        let output = self.model.forward(QaModelInput {
            input_ids:      self.row(&input.input_ids),
            attention_mask: self.row(&input.attention_mask),
            token_type_ids: self.row(&input.token_type_ids),
            position_ids:   input.position_ids.as_deref().map(|p| self.row(p)),
        });

        let start = output.start_logits.into_data().to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read start logits: {e:?}"))?;
        let end = output.end_logits.into_data().to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read end logits: {e:?}"))?;

        Ok(SpanLogits { start, end })
    }
}

fn ensure_ids_below(ids: &[i64], limit: usize, what: &str) -> Result<()> {
    if let Some((i, &id)) = ids.iter().enumerate()
        .find(|&(_, &id)| usize::try_from(id).map_or(true, |id| id >= limit))
    {
        return Err(anyhow!("{what} {id} at position {i} is outside 0..{limit}"));
    }
    Ok(())
}
