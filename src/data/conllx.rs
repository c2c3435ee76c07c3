use std::io::{BufRead, Write};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;

use crate::data::token::{Sentence, Token};

/// Placeholder for absent fields in the CoNLL-X format.
const EMPTY_FIELD: &str = "_";

/// Reader for blank-line-separated CoNLL-X sentence blocks.
pub struct Reader<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader {
            reader,
            line_number: 0,
        }
    }

    /// Read the next sentence, or `None` at end of input.
    pub fn read_sentence(&mut self) -> Result<Option<Sentence>> {
        let mut tokens = Vec::new();
        let mut line = String::new();

        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("I/O error after line {}", self.line_number))?;
            self.line_number += 1;

            if read == 0 {
                // End of input; emit a trailing sentence without a closing
                // blank line if one is pending.
                return if tokens.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Sentence::new(tokens)))
                };
            }

            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.trim().is_empty() {
                if tokens.is_empty() {
                    continue;
                }
                return Ok(Some(Sentence::new(tokens)));
            }

            tokens.push(
                parse_token(trimmed)
                    .with_context(|| format!("Malformed token at line {}", self.line_number))?,
            );
        }
    }

    /// Iterate over all remaining sentences.
    pub fn sentences(self) -> Sentences<R> {
        Sentences { reader: self }
    }
}

/// Iterator adapter over [`Reader`].
pub struct Sentences<R> {
    reader: Reader<R>,
}

impl<R: BufRead> Iterator for Sentences<R> {
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_sentence().transpose()
    }
}

fn parse_token(line: &str) -> Result<Token> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(anyhow!(
            "Expected at least 8 tab-separated fields, got {}",
            fields.len()
        ));
    }

    let mut token = Token::new(fields[1]);
    token.set_lemma(non_empty(fields[2]));
    token.set_cpos(non_empty(fields[3]));
    token.set_pos(non_empty(fields[4]));
    token.set_features(parse_features(fields[5]));

    if fields[6] != EMPTY_FIELD {
        let head = fields[6]
            .parse::<usize>()
            .with_context(|| format!("Invalid head index: {}", fields[6]))?;
        token.set_head(Some(head));
    }
    token.set_head_rel(non_empty(fields[7]));

    Ok(token)
}

fn non_empty(field: &str) -> Option<&str> {
    if field == EMPTY_FIELD {
        None
    } else {
        Some(field)
    }
}

fn parse_features(field: &str) -> IndexMap<String, String> {
    let mut features = IndexMap::new();
    if field == EMPTY_FIELD {
        return features;
    }

    for pair in field.split('|') {
        match pair.split_once('=') {
            Some((name, value)) => {
                features.insert(name.to_string(), value.to_string());
            }
            None => {
                log::warn!("Skipping morphological feature without a value: {}", pair);
            }
        }
    }

    features
}

/// Writer emitting one 10-column CoNLL-X block per sentence.
pub struct Writer<W> {
    writer: W,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Writer { writer }
    }

    pub fn write_sentence(&mut self, sentence: &Sentence) -> Result<()> {
        for (offset, token) in sentence.tokens().enumerate() {
            writeln!(
                self.writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                offset + 1,
                token.form(),
                token.lemma().unwrap_or(EMPTY_FIELD),
                token.cpos().unwrap_or(EMPTY_FIELD),
                token.pos().unwrap_or(EMPTY_FIELD),
                render_features(token),
                token
                    .head()
                    .map(|head| head.to_string())
                    .unwrap_or_else(|| EMPTY_FIELD.to_string()),
                token.head_rel().unwrap_or(EMPTY_FIELD),
                EMPTY_FIELD,
                EMPTY_FIELD,
            )
            .context("Cannot write token")?;
        }

        writeln!(self.writer).context("Cannot write sentence separator")?;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Cannot flush output")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn render_features(token: &Token) -> String {
    if token.features().is_empty() {
        return EMPTY_FIELD.to_string();
    }

    token
        .features()
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("|")
}
