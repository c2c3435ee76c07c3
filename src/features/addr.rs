use std::fmt;

use crate::system::Configuration;

/// Where address resolution starts: a stack or buffer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The k-th stack element from the top.
    Stack(usize),
    /// The k-th buffer element from the front.
    Buffer(usize),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Stack(k) => write!(f, "STACK {}", k),
            Source::Buffer(k) => write!(f, "BUFFER {}", k),
        }
    }
}

/// A step from a resolved token to one of its dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepSource {
    /// The k-th leftmost dependent (k = 0 is the outermost).
    LeftDep(usize),
    /// The k-th rightmost dependent (k = 0 is the outermost).
    RightDep(usize),
}

impl fmt::Display for DepSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DepSource::LeftDep(k) => write!(f, "LDEP {}", k),
            DepSource::RightDep(k) => write!(f, "RDEP {}", k),
        }
    }
}

/// The token attribute a template reads at the resolved position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    /// The surface form.
    Token,
    /// The fine-grained part-of-speech tag.
    Tag,
    /// The relation to the head decided so far.
    DepRel,
    /// A single morphological feature.
    Feature(String),
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Layer::Token => write!(f, "TOKEN"),
            Layer::Tag => write!(f, "TAG"),
            Layer::DepRel => write!(f, "DEPREL"),
            Layer::Feature(name) => write!(f, "FEATURE {}", name),
        }
    }
}

/// A compiled feature template: a position in a configuration plus a layer
/// to read there.
///
/// Compiled once at startup; evaluation is an array walk without further
/// parsing. A template resolves to `None` when any step lands outside the
/// sentence or on a missing dependent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedValue {
    source: Source,
    dep_path: Vec<DepSource>,
    layer: Layer,
}

impl AddressedValue {
    pub fn new(source: Source, dep_path: Vec<DepSource>, layer: Layer) -> Self {
        AddressedValue {
            source,
            dep_path,
            layer,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn dep_path(&self) -> &[DepSource] {
        &self.dep_path
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Resolve the addressed position to a token index.
    pub fn resolve(&self, config: &Configuration) -> Option<usize> {
        let mut index = match self.source {
            Source::Stack(k) => config.stack_top(k)?,
            Source::Buffer(k) => config.buffer_front(k)?,
        };

        for step in &self.dep_path {
            index = match step {
                DepSource::LeftDep(k) => config.ldep(index, *k)?,
                DepSource::RightDep(k) => config.rdep(index, *k)?,
            };
        }

        Some(index)
    }

    /// Read the layer value at the addressed position.
    pub fn value<'v>(&self, config: &'v Configuration) -> Option<&'v str> {
        let index = self.resolve(config)?;

        match &self.layer {
            Layer::Token => config.token(index).map(|token| token.form()),
            Layer::Tag => config.token(index).and_then(|token| token.pos()),
            // The relation lives in the arc set, not on the input token.
            Layer::DepRel => config.deprel_of(index),
            Layer::Feature(name) => config.token(index).and_then(|token| token.feature(name)),
        }
    }
}

impl fmt::Display for AddressedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}", self.source)?;
        for step in &self.dep_path {
            write!(f, ",{}", step)?;
        }
        write!(f, "] {}", self.layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Sentence, Token, ROOT_VALUE};

    fn sentence() -> Sentence {
        let mut tokens = Vec::new();
        for (form, tag) in [("the", "DT"), ("cat", "NN"), ("sleeps", "VBZ")] {
            let mut token = Token::new(form);
            token.set_pos(Some(tag));
            tokens.push(token);
        }
        Sentence::new(tokens)
    }

    #[test]
    fn test_stack_and_buffer_resolution() {
        let sentence = sentence();
        let mut config = Configuration::new(&sentence);
        config.shift();
        config.shift();

        // Stack [0 1 2], buffer [3].
        let top_token = AddressedValue::new(Source::Stack(0), Vec::new(), Layer::Token);
        assert_eq!(top_token.value(&config), Some("cat"));

        let front_tag = AddressedValue::new(Source::Buffer(0), Vec::new(), Layer::Tag);
        assert_eq!(front_tag.value(&config), Some("VBZ"));

        let root = AddressedValue::new(Source::Stack(2), Vec::new(), Layer::Token);
        assert_eq!(root.value(&config), Some(ROOT_VALUE));
    }

    #[test]
    fn test_out_of_range_yields_absent() {
        let sentence = sentence();
        let config = Configuration::new(&sentence);

        let template = AddressedValue::new(Source::Stack(99), Vec::new(), Layer::Token);
        assert_eq!(template.resolve(&config), None);
        assert_eq!(template.value(&config), None);
    }

    #[test]
    fn test_missing_dependent_yields_absent() {
        let sentence = sentence();
        let mut config = Configuration::new(&sentence);
        config.shift();

        let template = AddressedValue::new(
            Source::Stack(0),
            vec![DepSource::LeftDep(0)],
            Layer::Tag,
        );
        assert_eq!(template.value(&config), None);
    }

    #[test]
    fn test_dependent_path_and_deprel() {
        let sentence = sentence();
        let mut config = Configuration::new(&sentence);
        config.shift();
        config.shift();
        config.attach(2, 1, "det").unwrap();

        let ldep_form = AddressedValue::new(
            Source::Stack(0),
            vec![DepSource::LeftDep(0)],
            Layer::Token,
        );
        assert_eq!(ldep_form.value(&config), Some("the"));

        let ldep_rel = AddressedValue::new(
            Source::Stack(0),
            vec![DepSource::LeftDep(0)],
            Layer::DepRel,
        );
        assert_eq!(ldep_rel.value(&config), Some("det"));

        // The head itself has no relation yet.
        let top_rel = AddressedValue::new(Source::Stack(0), Vec::new(), Layer::DepRel);
        assert_eq!(top_rel.value(&config), None);
    }

    #[test]
    fn test_feature_layer() {
        let mut sentence = sentence();
        let mut features = indexmap::IndexMap::new();
        features.insert("num".to_string(), "sg".to_string());
        sentence.token_mut(2).unwrap().set_features(features);

        let mut config = Configuration::new(&sentence);
        config.shift();
        config.shift();

        let known = AddressedValue::new(
            Source::Stack(0),
            Vec::new(),
            Layer::Feature("num".to_string()),
        );
        assert_eq!(known.value(&config), Some("sg"));

        let unknown = AddressedValue::new(
            Source::Stack(0),
            Vec::new(),
            Layer::Feature("case".to_string()),
        );
        assert_eq!(unknown.value(&config), None);
    }

    #[test]
    fn test_rendering() {
        let template = AddressedValue::new(
            Source::Stack(1),
            vec![DepSource::LeftDep(0), DepSource::RightDep(2)],
            Layer::Feature("case".to_string()),
        );
        assert_eq!(template.to_string(), "[STACK 1,LDEP 0,RDEP 2] FEATURE case");

        let plain = AddressedValue::new(Source::Buffer(0), Vec::new(), Layer::Token);
        assert_eq!(plain.to_string(), "[BUFFER 0] TOKEN");
    }
}
