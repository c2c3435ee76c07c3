use std::collections::HashMap;
use std::io::BufRead;

use crate::features::addr::AddressedValue;
use crate::features::hash::HasherFactory;
use crate::features::pest_parser::parse_templates;
use crate::features::TemplateError;
use crate::system::Configuration;

/// Separator between a template's canonical source text and its resolved
/// value in the feature name.
pub const FEATURE_SEPARATOR: char = ':';

/// Symbolic features as a name/value mapping.
pub type FeatureSet = HashMap<String, f64>;

/// Sink for hashed features. Writes to the same index are additive; the
/// sink decides how to accumulate them.
pub trait FeatureVectorBuilder {
    fn add(&mut self, index: u32, value: f64);
}

/// Generates concrete features from a parser configuration, either as a
/// name/value mapping or hashed into a fixed-size kernel.
pub trait FeatureGenerator: Send + Sync {
    fn generate(&self, config: &Configuration) -> FeatureSet;

    fn generate_hashed(
        &self,
        config: &Configuration,
        hasher: HasherFactory,
        kernel_size: u32,
        sink: &mut dyn FeatureVectorBuilder,
    );
}

/// A generator over compiled addressed-value templates.
///
/// Each template contributes an indicator feature named by the template's
/// canonical text and its resolved value; templates that resolve to absent
/// contribute nothing.
pub struct AddressedValueGenerator {
    templates: Vec<CompiledTemplate>,
}

struct CompiledTemplate {
    template: AddressedValue,
    // Rendered once; evaluation only appends the value.
    rendered: String,
}

impl AddressedValueGenerator {
    pub fn new(templates: Vec<AddressedValue>) -> Self {
        let templates = templates
            .into_iter()
            .map(|template| CompiledTemplate {
                rendered: template.to_string(),
                template,
            })
            .collect();

        AddressedValueGenerator { templates }
    }

    pub fn templates(&self) -> impl Iterator<Item = &AddressedValue> {
        self.templates.iter().map(|compiled| &compiled.template)
    }
}

impl FeatureGenerator for AddressedValueGenerator {
    fn generate(&self, config: &Configuration) -> FeatureSet {
        let mut features = FeatureSet::new();

        for compiled in &self.templates {
            if let Some(value) = compiled.template.value(config) {
                let name = format!("{}{}{}", compiled.rendered, FEATURE_SEPARATOR, value);
                features.insert(name, 1.0);
            }
        }

        features
    }

    fn generate_hashed(
        &self,
        config: &Configuration,
        hasher: HasherFactory,
        kernel_size: u32,
        sink: &mut dyn FeatureVectorBuilder,
    ) {
        let mut separator = [0; 4];
        let separator = FEATURE_SEPARATOR.encode_utf8(&mut separator).as_bytes();

        for compiled in &self.templates {
            if let Some(value) = compiled.template.value(config) {
                let mut hasher = hasher();
                hasher.write(compiled.rendered.as_bytes());
                hasher.write(separator);
                hasher.write(value.as_bytes());
                sink.add(hasher.finish() % kernel_size, 1.0);
            }
        }
    }
}

/// Routes both calls to every child generator in insertion order.
pub struct AggregateGenerator {
    generators: Vec<Box<dyn FeatureGenerator>>,
}

impl std::fmt::Debug for AggregateGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateGenerator")
            .field("generators", &self.generators.len())
            .finish()
    }
}

impl AggregateGenerator {
    pub fn new(generators: Vec<Box<dyn FeatureGenerator>>) -> Self {
        AggregateGenerator { generators }
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl FeatureGenerator for AggregateGenerator {
    fn generate(&self, config: &Configuration) -> FeatureSet {
        let mut combined = FeatureSet::new();

        for generator in &self.generators {
            combined.extend(generator.generate(config));
        }

        combined
    }

    fn generate_hashed(
        &self,
        config: &Configuration,
        hasher: HasherFactory,
        kernel_size: u32,
        sink: &mut dyn FeatureVectorBuilder,
    ) {
        for generator in &self.generators {
            generator.generate_hashed(config, hasher, kernel_size, sink);
        }
    }
}

/// Creates a feature generator from the argument text of a template-file
/// line.
pub type GeneratorFactory = fn(&str) -> Result<Box<dyn FeatureGenerator>, TemplateError>;

/// The standard factories: only `addr` is defined.
pub fn default_factories() -> HashMap<&'static str, GeneratorFactory> {
    let mut factories: HashMap<&'static str, GeneratorFactory> = HashMap::new();
    factories.insert("addr", addressed_value_factory);
    factories
}

fn addressed_value_factory(body: &str) -> Result<Box<dyn FeatureGenerator>, TemplateError> {
    let templates = parse_templates(body)?;
    Ok(Box::new(AddressedValueGenerator::new(templates)))
}

/// Read a feature-template file with the default generator set.
pub fn read_feature_generators_default(
    reader: impl BufRead,
) -> Result<AggregateGenerator, TemplateError> {
    read_feature_generators(&default_factories(), reader)
}

/// Read a feature-template file: one generator per non-blank line, each
/// line a generator name followed by its arguments.
pub fn read_feature_generators(
    factories: &HashMap<&'static str, GeneratorFactory>,
    reader: impl BufRead,
) -> Result<AggregateGenerator, TemplateError> {
    let mut generators = Vec::new();

    for (offset, line) in reader.lines().enumerate() {
        let line_number = offset + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (name, body) = line
            .split_once(' ')
            .ok_or(TemplateError::MissingBody { line: line_number })?;

        let factory = factories
            .get(name)
            .ok_or_else(|| TemplateError::UnknownGenerator {
                line: line_number,
                name: name.to_string(),
            })?;

        let generator = factory(body).map_err(|error| error.at_line(line_number))?;
        generators.push(generator);
    }

    Ok(AggregateGenerator::new(generators))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Sentence, Token};
    use crate::features::hash::fnv32a;

    fn config_fixture(sentence: &Sentence) -> Configuration {
        let mut config = Configuration::new(sentence);
        config.shift();
        config
    }

    fn sentence() -> Sentence {
        let mut cat = Token::new("cat");
        cat.set_pos(Some("NN"));
        Sentence::new(vec![cat, Token::new("sleeps")])
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(u32, f64)>,
    }

    impl FeatureVectorBuilder for RecordingSink {
        fn add(&mut self, index: u32, value: f64) {
            self.writes.push((index, value));
        }
    }

    #[test]
    fn test_generate_names_and_values() {
        let sentence = sentence();
        let config = config_fixture(&sentence);

        let generator = AddressedValueGenerator::new(
            parse_templates("[STACK 0] TOKEN [STACK 0] TAG [STACK 0] DEPREL").unwrap(),
        );
        let features = generator.generate(&config);

        assert_eq!(features.len(), 2);
        assert_eq!(features.get("[STACK 0] TOKEN:cat"), Some(&1.0));
        assert_eq!(features.get("[STACK 0] TAG:NN"), Some(&1.0));
        // The DEPREL template is absent and contributes nothing.
        assert!(!features.keys().any(|name| name.contains("DEPREL")));
    }

    #[test]
    fn test_hashed_matches_named_features() {
        let sentence = sentence();
        let config = config_fixture(&sentence);
        let kernel_size = 1 << 20;

        let generator = AddressedValueGenerator::new(
            parse_templates("[STACK 0] TOKEN [BUFFER 0] TOKEN").unwrap(),
        );

        let mut sink = RecordingSink::default();
        generator.generate_hashed(&config, fnv32a, kernel_size, &mut sink);

        let expected: Vec<u32> = ["[STACK 0] TOKEN:cat", "[BUFFER 0] TOKEN:sleeps"]
            .iter()
            .map(|name| {
                let mut hasher = fnv32a();
                hasher.write(name.as_bytes());
                hasher.finish() % kernel_size
            })
            .collect();

        let buckets: Vec<u32> = sink.writes.iter().map(|&(index, _)| index).collect();
        assert_eq!(buckets, expected);
    }

    #[test]
    fn test_colliding_features_are_additive() {
        let sentence = sentence();
        let config = config_fixture(&sentence);

        let generator = AddressedValueGenerator::new(
            parse_templates("[STACK 0] TOKEN [BUFFER 0] TOKEN").unwrap(),
        );

        // Kernel size 1 forces every feature into the same bucket; the sink
        // must see one write per feature.
        let mut sink = RecordingSink::default();
        generator.generate_hashed(&config, fnv32a, 1, &mut sink);
        assert_eq!(sink.writes, vec![(0, 1.0), (0, 1.0)]);
    }

    #[test]
    fn test_aggregate_routes_in_insertion_order() {
        let sentence = sentence();
        let config = config_fixture(&sentence);

        let aggregate = read_feature_generators_default(
            "addr [STACK 0] TOKEN\n\naddr [BUFFER 0] TAG\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(aggregate.len(), 2);

        let features = aggregate.generate(&config);
        assert_eq!(features.get("[STACK 0] TOKEN:cat"), Some(&1.0));
        // The buffer front has no tag annotation in the fixture.
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn test_reader_reports_line_numbers() {
        let result = read_feature_generators_default("addr [STACK 0] TOKEN\naddr [STACK] X\n".as_bytes());
        match result {
            Err(TemplateError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a syntax error, got {:?}", other),
        }

        let result = read_feature_generators_default("dist [STACK 0]\n".as_bytes());
        assert!(matches!(
            result,
            Err(TemplateError::UnknownGenerator { line: 1, .. })
        ));

        let result = read_feature_generators_default("addr\n".as_bytes());
        assert!(matches!(result, Err(TemplateError::MissingBody { line: 1 })));
    }
}
