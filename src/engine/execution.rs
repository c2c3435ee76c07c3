//! Corpus-level parsing: batching, parallelism, and arc write-back.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::data::{conllx, Sentence};
use crate::engine::core::ParserEngine;
use crate::parser::{GreedyParser, Parse};
use crate::system::{DependencySet, ParserError};

/// Head relation written to tokens that the parse leaves unattached.
const NULL_RELATION: &str = "NULL";

/// Caller policy for corpus parsing.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Abort the stream on the first sentence that fails to parse. When
    /// disabled, failed sentences are logged and dropped from the output.
    pub fail_fast: bool,

    /// Override the configured batch size.
    pub batch_size: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        ExecutionOptions {
            fail_fast: true,
            batch_size: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseStats {
    pub sentences: usize,
    pub failed: usize,
    pub tokens: usize,
}

impl ParserEngine {
    /// Parse a single sentence and write the arcs back to its tokens.
    pub fn parse_sentence(&self, sentence: &mut Sentence) -> Result<(), ParserError> {
        let mut parser = GreedyParser::new(self.system.as_ref(), self.guide());
        let dependencies = parser.parse(sentence)?;
        write_back(sentence, &dependencies);
        Ok(())
    }

    /// Parse a batch in parallel. Each worker owns its parser, guide
    /// scratch, and configuration allocations; results keep input order.
    pub fn parse_batch(&self, sentences: &mut [Sentence]) -> Vec<Result<(), ParserError>> {
        if sentences.is_empty() {
            return Vec::new();
        }

        let chunk_size = sentences
            .len()
            .div_ceil(rayon::current_num_threads())
            .max(1);

        let per_chunk: Vec<Vec<Result<(), ParserError>>> = sentences
            .par_chunks_mut(chunk_size)
            .map(|chunk| {
                let mut parser = GreedyParser::new(self.system.as_ref(), self.guide());
                chunk
                    .iter_mut()
                    .map(|sentence| {
                        let dependencies = parser.parse(sentence)?;
                        write_back(sentence, &dependencies);
                        Ok(())
                    })
                    .collect()
            })
            .collect();

        per_chunk.into_iter().flatten().collect()
    }

    /// Parse a CoNLL-X stream, writing parsed sentences to the output in
    /// input order.
    pub fn parse_corpus(
        &self,
        reader: impl BufRead,
        writer: impl Write,
        options: &ExecutionOptions,
    ) -> Result<ParseStats> {
        let mut reader = conllx::Reader::new(reader);
        let mut writer = conllx::Writer::new(writer);
        let batch_size = options
            .batch_size
            .unwrap_or(self.config.parser.batch_size)
            .max(1);

        let mut stats = ParseStats::default();
        let mut ordinal = 0;

        loop {
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                match reader.read_sentence()? {
                    Some(sentence) => batch.push(sentence),
                    None => break,
                }
            }
            if batch.is_empty() {
                break;
            }

            let results = self.parse_batch(&mut batch);

            for (sentence, result) in batch.iter().zip(results) {
                ordinal += 1;
                match result {
                    Ok(()) => {
                        stats.sentences += 1;
                        stats.tokens += sentence.len();
                        writer.write_sentence(sentence)?;
                    }
                    Err(error) if options.fail_fast => {
                        return Err(error)
                            .with_context(|| format!("Cannot parse sentence {}", ordinal));
                    }
                    Err(error) => {
                        stats.failed += 1;
                        log::warn!("Skipping sentence {}: {}", ordinal, error);
                    }
                }
            }
        }

        writer.flush()?;
        Ok(stats)
    }
}

/// Clear any pre-existing heads, then write the arcs to the sentence, so
/// stale input annotations never leak into the output.
fn write_back(sentence: &mut Sentence, dependencies: &DependencySet) {
    for token in sentence.tokens_mut() {
        token.set_head(Some(0));
        token.set_head_rel(Some(NULL_RELATION));
    }

    for arc in dependencies {
        if let Some(token) = sentence.token_mut(arc.dependent) {
            token.set_head(Some(arc.head));
            token.set_head_rel(Some(arc.relation.as_str()));
        }
    }
}
