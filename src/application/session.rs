// ============================================================
// Layer 2 - Interactive Session
// ============================================================
// A thin read-loop over QaPipeline::answer. Reads one question
// per line until an empty line or end of input and writes the
// answer block for each. Reader and writer are generic so the
// loop runs the same against stdin/stdout or in-memory buffers.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::application::ask_use_case::{PreparedContext, QaPipeline};
use crate::domain::answer::QaResponse;

pub struct Session<'a> {
    pipeline: &'a QaPipeline,
    context:  &'a PreparedContext,
}

impl<'a> Session<'a> {
    pub fn new(pipeline: &'a QaPipeline, context: &'a PreparedContext) -> Self {
        Self { pipeline, context }
    }

    /// Returns the number of questions answered.
    /// A failed question is reported and the loop carries on.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut out: W) -> Result<usize> {
        let mut answered = 0;
        for line in input.lines() {
            let line = line.context("Cannot read question")?;
            let question = line.trim();
            if question.is_empty() {
                break;
            }
            match self.pipeline.answer(self.context, question) {
                Ok(resp) => {
                    write_response(&mut out, &resp)?;
                    answered += 1;
                }
                Err(e) => {
                    tracing::warn!("Question failed: {e:#}");
                    writeln!(out, "Question: {question}")?;
                    writeln!(out, "Failed: {e:#}")?;
                }
            }
            out.flush()?;
        }
        Ok(answered)
    }
}

pub fn write_response<W: Write>(out: &mut W, resp: &QaResponse) -> std::io::Result<()> {
    writeln!(out, "Question: {}", resp.question)?;
    writeln!(out, "Answer: {}", resp.answer)?;
    writeln!(out, "Score: {:.2}", resp.score)?;
    writeln!(out, "Time: {:.2}s", resp.elapsed_secs)
}
