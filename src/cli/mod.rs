// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments, wires concrete implementations together and
// prints results. Answering itself happens in Layer 2.

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use commands::{AskArgs, ChatArgs, ClassifyArgs, Commands, ModelArgs, WindowArgs};

use crate::application::ask_use_case::{PreparedContext, QaPipeline};
use crate::application::session::{write_response, Session};
use crate::data::loader::{ContextLoader, HttpFetcher, Source};
use crate::domain::answer::Probabilities;
use crate::domain::traits::{ContextSource, Tokenize};
use crate::infra::{
    checkpoint::CheckpointManager,
    labels::load_labels,
    tokenizer_store::PretrainedTokenizer,
    vocab::WordPieceTokenizer,
};
use crate::ml::inferencer::{BurnSpanPredictor, InferBackend};
use crate::ml::postprocess::{argmax, probabilities, top_k};
use crate::ml::scorer::AnswerWindowScorer;

#[derive(Parser, Debug)]
#[command(
    name = "extractive-qa",
    version,
    about = "Answer questions from a context with a converted extractive QA model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Ask(args)      => run_ask(args),
            Commands::Chat(args)     => run_chat(args),
            Commands::Window(args)   => run_window(args),
            Commands::Classify(args) => run_classify(args),
        }
    }
}

fn run_ask(args: AskArgs) -> Result<()> {
    let (pipeline, context) = build(&args.model)?;
    let resp = pipeline.answer(&context, &args.question)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        write_response(&mut io::stdout().lock(), &resp)?;
    }
    Ok(())
}

fn run_chat(args: ChatArgs) -> Result<()> {
    let (pipeline, context) = build(&args.model)?;

    println!("Context: {} tokens. Ask a question (empty line to quit).", context.token_count());
    io::stdout().flush()?;

    let answered = Session::new(&pipeline, &context).run(io::stdin().lock(), io::stdout().lock())?;
    tracing::info!("Session finished after {} questions", answered);
    Ok(())
}

fn run_window(args: WindowArgs) -> Result<()> {
    let (start, end) = if args.logits {
        (probabilities(&args.start)?, probabilities(&args.end)?)
    } else {
        (Probabilities::new(args.start)?, Probabilities::new(args.end)?)
    };
    let context_end = args.context_end.unwrap_or(start.len());

    let window = AnswerWindowScorer::new(args.max_answer_len)
        .best_window(&start, &end, args.context_start..context_end)?;

    println!("{}", serde_json::to_string(&window)?);
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.logits)
        .with_context(|| format!("Cannot read logits '{}'", args.logits.display()))?;
    let values: Vec<f32> = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' is not a JSON array of numbers", args.logits.display()))?;

    let probs = if args.no_softmax { Probabilities::new(values)? } else { probabilities(&values)? };
    let labels = args.labels.as_ref().map(load_labels).transpose()?.unwrap_or_default();

    let name = |class: usize| labels.get(class).map(String::as_str).unwrap_or("?");

    let best = argmax(probs.as_slice()).context("No class scores in the logits file")?;
    println!("Predicted: {} ({})", name(best), best);

    for (rank, (class, p)) in top_k(probs.as_slice(), args.top_k).into_iter().enumerate() {
        println!("{:>2}. {:>5} {:<30} {:.4}", rank + 1, class, name(class), p);
    }
    Ok(())
}

/// Load tokenizer, model and context for `ask` / `chat`.
fn build(args: &ModelArgs) -> Result<(QaPipeline, PreparedContext)> {
    let tokenizer = load_tokenizer(args)?;

    let ckpt = CheckpointManager::new(&args.model_dir);
    let predictor = BurnSpanPredictor::<InferBackend>::from_checkpoint(&ckpt, Default::default())?;
    let pipeline = QaPipeline::new(tokenizer, Box::new(predictor), args.into());

    let sources = args.sources.iter().map(|s| Source::parse(s)).collect();
    let text = ContextLoader::new(sources, HttpFetcher::new()?).load_context()?;
    let context = pipeline.prepare_context(text)?;

    Ok((pipeline, context))
}

/// Explicit flags win; otherwise look for tokenizer.json, then vocab.txt,
/// next to the model.
fn load_tokenizer(args: &ModelArgs) -> Result<Box<dyn Tokenize>> {
    if let Some(path) = &args.vocab {
        return Ok(Box::new(WordPieceTokenizer::from_file(path)?));
    }
    if let Some(path) = &args.tokenizer {
        return Ok(Box::new(PretrainedTokenizer::from_file(path)?));
    }

    let json = args.model_dir.join("tokenizer.json");
    if json.exists() {
        return Ok(Box::new(PretrainedTokenizer::from_file(json)?));
    }
    Ok(Box::new(WordPieceTokenizer::from_file(args.model_dir.join("vocab.txt"))?))
}
