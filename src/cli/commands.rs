// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Four subcommands:
//   ask      - one question against a context, then exit
//   chat     - interactive questions until an empty line
//   window   - run the answer-window scorer on given scores
//   classify - softmax + top-k over a classifier's logits

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::ask_use_case::PipelineConfig;
use crate::ml::scorer::DEFAULT_MAX_ANSWER_LEN;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question
    Ask(AskArgs),

    /// Read questions from stdin until an empty line
    Chat(ChatArgs),

    /// Find the best answer window in explicit start/end scores
    Window(WindowArgs),

    /// Decode classifier logits into the top labels
    Classify(ClassifyArgs),
}

/// Model, tokenizer and context shared by `ask` and `chat`.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Directory with model_config.json and model.mpk.gz
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Plain BERT vocab.txt (WordPiece tokenizer)
    #[arg(long, conflicts_with = "tokenizer")]
    pub vocab: Option<PathBuf>,

    /// HuggingFace tokenizer.json
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,

    /// Context sources: literal text or http(s) URLs, joined in order
    #[arg(long = "source", required = true, num_args = 1..)]
    pub sources: Vec<String>,

    /// Longest accepted answer, as end - start in tokens
    #[arg(long, default_value_t = DEFAULT_MAX_ANSWER_LEN)]
    pub max_answer_len: usize,

    /// Minimum context tokens per model window
    #[arg(long, default_value_t = 16)]
    pub min_context_len: usize,
}

/// The application layer never sees clap types.
impl From<&ModelArgs> for PipelineConfig {
    fn from(a: &ModelArgs) -> Self {
        PipelineConfig {
            max_answer_len:  a.max_answer_len,
            min_context_len: a.min_context_len,
        }
    }
}

#[derive(Args, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// The natural language question to answer
    #[arg(long)]
    pub question: String,

    /// Print the response as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Comma separated start scores
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub start: Vec<f32>,

    /// Comma separated end scores
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub end: Vec<f32>,

    /// First index of the context region
    #[arg(long, default_value_t = 0)]
    pub context_start: usize,

    /// One past the last index of the context region (default: all)
    #[arg(long)]
    pub context_end: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_MAX_ANSWER_LEN)]
    pub max_answer_len: usize,

    /// Treat the scores as raw logits and softmax them first
    #[arg(long)]
    pub logits: bool,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// JSON array of class logits
    #[arg(long)]
    pub logits: PathBuf,

    /// Label file, one class name per line
    #[arg(long)]
    pub labels: Option<PathBuf>,

    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// The values are already probabilities, skip softmax
    #[arg(long)]
    pub no_softmax: bool,
}
