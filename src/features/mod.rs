//! Addressed symbolic features over parser configurations.
//!
//! This module is organized into the following submodules:
//! - `addr`: compiled address templates (`[STACK 0,LDEP 1] TOKEN`)
//! - `pest_parser`: the pest grammar front end for templates
//! - `generator`: feature generators, named and hash-kernel modes
//! - `hash`: the 32-bit FNV-1a reference hash

pub mod addr;
pub mod generator;
pub mod hash;
pub mod pest_parser;

use thiserror::Error;

pub use addr::{AddressedValue, DepSource, Layer, Source};
pub use generator::{
    default_factories, read_feature_generators, read_feature_generators_default,
    AddressedValueGenerator, AggregateGenerator, FeatureGenerator, FeatureSet,
    FeatureVectorBuilder, GeneratorFactory, FEATURE_SEPARATOR,
};
pub use hash::{fnv32a, Fnv32a, HasherFactory};
pub use pest_parser::parse_templates;

/// Errors reading feature templates. Fatal at startup.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error reading feature templates: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("line {line}: unknown feature generator: {name}")]
    UnknownGenerator { line: usize, name: String },

    #[error("line {line}: generator without arguments")]
    MissingBody { line: usize },
}

impl TemplateError {
    /// Rebase a single-line syntax error onto its line in the template
    /// file.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            TemplateError::Syntax {
                column, message, ..
            } => TemplateError::Syntax {
                line,
                column,
                message,
            },
            other => other,
        }
    }
}
