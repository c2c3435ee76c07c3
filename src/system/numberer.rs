use std::collections::HashMap;
use std::io::{BufRead, Write};

use thiserror::Error;

use crate::system::{Transition, TransitionSystem};

/// Errors reading a transitions file.
#[derive(Debug, Error)]
pub enum NumbererError {
    #[error("I/O error reading transitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: crate::system::TransitionParseError,
    },

    #[error("line {line}: transition {descriptor} is not part of the {system} system")]
    ForeignTransition {
        line: usize,
        descriptor: String,
        system: &'static str,
    },

    #[error("line {line}: duplicate transition {descriptor}")]
    Duplicate { line: usize, descriptor: String },
}

/// A bijection between transitions and dense integer IDs.
///
/// The persisted form is one transition descriptor per line; line order
/// defines the IDs, which is also the total order used to break score ties.
/// Built during training, read-only at parse time.
#[derive(Debug, Clone, Default)]
pub struct LabelNumberer {
    transitions: Vec<Transition>,
    index: HashMap<Transition, usize>,
}

impl LabelNumberer {
    pub fn new() -> Self {
        LabelNumberer::default()
    }

    /// Read a transitions file, validating every transition against the
    /// given system.
    pub fn from_reader(
        reader: impl BufRead,
        system: &dyn TransitionSystem,
    ) -> Result<Self, NumbererError> {
        let mut numberer = LabelNumberer::new();

        for (offset, line) in reader.lines().enumerate() {
            let line_number = offset + 1;
            let line = line?;
            let descriptor = line.trim();
            if descriptor.is_empty() {
                continue;
            }

            let transition: Transition =
                descriptor
                    .parse()
                    .map_err(|source| NumbererError::Parse {
                        line: line_number,
                        source,
                    })?;

            if !system.admits(&transition) {
                return Err(NumbererError::ForeignTransition {
                    line: line_number,
                    descriptor: descriptor.to_string(),
                    system: system.name(),
                });
            }

            if numberer.index.contains_key(&transition) {
                return Err(NumbererError::Duplicate {
                    line: line_number,
                    descriptor: descriptor.to_string(),
                });
            }

            numberer.add(transition);
        }

        Ok(numberer)
    }

    /// Write the transitions in ID order, one descriptor per line.
    pub fn to_writer(&self, mut writer: impl Write) -> std::io::Result<()> {
        for transition in &self.transitions {
            writeln!(writer, "{}", transition)?;
        }

        Ok(())
    }

    /// Add a transition, returning its ID. Existing transitions keep their
    /// ID.
    pub fn add(&mut self, transition: Transition) -> usize {
        if let Some(&id) = self.index.get(&transition) {
            return id;
        }

        let id = self.transitions.len();
        self.index.insert(transition.clone(), id);
        self.transitions.push(transition);
        id
    }

    /// The ID of a transition, if known.
    pub fn number(&self, transition: &Transition) -> Option<usize> {
        self.index.get(transition).copied()
    }

    /// The transition with the given ID, if any.
    pub fn transition(&self, id: usize) -> Option<&Transition> {
        self.transitions.get(id)
    }

    /// All transitions in ID order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
