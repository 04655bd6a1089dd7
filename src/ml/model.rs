use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
// `max_seq_len` doubles as the fixed input size of the converted model.
#[derive(Config, Debug)]
pub struct TransformerQaConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    /// Segment vocabulary: 0 = question, 1 = context
    #[config(default = 2)]
    pub type_vocab_size: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
    /// Exported graphs that take explicit `position_ids` set this
    #[config(default = false)]
    pub use_position_ids: bool,
}

impl TransformerQaConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TransformerQaModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let segment_embedding  = EmbeddingConfig::new(self.type_vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let qa_head    = LinearConfig::new(self.d_model, 2).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TransformerQaModel {
            token_embedding, segment_embedding, position_embedding, layers,
            final_norm, qa_head, dropout,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// `mask_pad` is true at padded positions, which attention ignores.
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(mask_pad);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TransformerQaModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub segment_embedding:  Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub qa_head:            Linear<B>,
    pub dropout:            Dropout,
}

/// Batched model input, every tensor shaped `[batch, seq_len]`.
pub struct QaModelInput<B: Backend> {
    pub input_ids:      Tensor<B, 2, Int>,
    pub attention_mask: Tensor<B, 2, Int>,
    pub token_type_ids: Tensor<B, 2, Int>,
    pub position_ids:   Option<Tensor<B, 2, Int>>,
}

pub struct QaModelOutput<B: Backend> {
    pub start_logits: Tensor<B, 2>,
    pub end_logits:   Tensor<B, 2>,
}

impl<B: Backend> TransformerQaModel<B> {
    /// start_logits, end_logits: [batch, seq_len]
    pub fn forward(&self, input: QaModelInput<B>) -> QaModelOutput<B> {
        let [batch_size, seq_len] = input.input_ids.dims();
        let device = input.input_ids.device();

        let positions = input.position_ids.unwrap_or_else(|| {
            Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
                .unsqueeze::<2>()
                .expand([batch_size, seq_len])
        });
        let mask_pad = input.attention_mask.equal_elem(0);

        let embeddings = self.token_embedding.forward(input.input_ids)
            + self.segment_embedding.forward(input.token_type_ids)
            + self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(embeddings);
        for layer in &self.layers {
            x = layer.forward(x, mask_pad.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        // Project to 2 logits per token then split into start / end.
        let logits = self.qa_head.forward(x); // [batch, seq_len, 2]
        let start_logits = logits.clone()
            .slice([0..batch_size, 0..seq_len, 0..1])
            .reshape([batch_size, seq_len]);
        let end_logits = logits
            .slice([0..batch_size, 0..seq_len, 1..2])
            .reshape([batch_size, seq_len]);

        QaModelOutput { start_logits, end_logits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_config() -> TransformerQaConfig {
        TransformerQaConfig::new(50, 12, 8, 2, 1, 16)
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: TransformerQaModel<TestBackend> = tiny_config().init(&device);

        let ids = Tensor::<TestBackend, 1, Int>::from_ints([5, 6, 7, 8, 0, 0], &device)
            .reshape([1, 6]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 1, 0, 0], &device)
            .reshape([1, 6]);
        let types = Tensor::<TestBackend, 1, Int>::from_ints([0, 0, 1, 1, 0, 0], &device)
            .reshape([1, 6]);

        let out = model.forward(QaModelInput {
            input_ids:      ids,
            attention_mask: mask,
            token_type_ids: types,
            position_ids:   None,
        });
        assert_eq!(out.start_logits.dims(), [1, 6]);
        assert_eq!(out.end_logits.dims(), [1, 6]);
    }

    #[test]
    fn test_config_defaults() {
        let cfg = tiny_config();
        assert_eq!(cfg.type_vocab_size, 2);
        assert!(!cfg.use_position_ids);
        assert!(cfg.with_use_position_ids(true).use_position_ids);
    }
}
