use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser;

use crate::features::addr::{AddressedValue, DepSource, Layer, Source};
use crate::features::TemplateError;

#[derive(Parser)]
#[grammar = "features.pest"]
pub struct TemplateParser;

/// Parse one or more addressed-value templates from a template body.
///
/// The grammar is whitespace-insensitive; several templates may share a
/// line. Syntax errors report 1-based line and column positions within the
/// parsed text.
pub fn parse_templates(input: &str) -> Result<Vec<AddressedValue>, TemplateError> {
    let mut pairs =
        TemplateParser::parse(Rule::templates, input).map_err(from_pest_error)?;

    let templates = pairs.next().expect("grammar yields a templates node");

    Ok(templates
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::addr_value)
        .map(build_template)
        .collect())
}

fn from_pest_error(error: pest::error::Error<Rule>) -> TemplateError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos((line, column)) => (line, column),
        LineColLocation::Span((line, column), _) => (line, column),
    };

    TemplateError::Syntax {
        line,
        column,
        message: error.variant.message().into_owned(),
    }
}

fn build_template(pair: pest::iterators::Pair<Rule>) -> AddressedValue {
    let mut source = None;
    let mut dep_path = Vec::new();
    let mut layer = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::source => source = Some(build_source(inner)),
            Rule::dep_source => dep_path.push(build_dep_source(inner)),
            Rule::layer => layer = Some(build_layer(inner)),
            _ => unreachable!("unexpected rule in addr_value: {:?}", inner.as_rule()),
        }
    }

    AddressedValue::new(
        source.expect("grammar requires a source"),
        dep_path,
        layer.expect("grammar requires a layer"),
    )
}

fn build_source(pair: pest::iterators::Pair<Rule>) -> Source {
    let inner = pair.into_inner().next().expect("source has a variant");
    let k = parse_index(&inner);
    match inner.as_rule() {
        Rule::stack_source => Source::Stack(k),
        Rule::buffer_source => Source::Buffer(k),
        rule => unreachable!("unexpected source variant: {:?}", rule),
    }
}

fn build_dep_source(pair: pest::iterators::Pair<Rule>) -> DepSource {
    let inner = pair.into_inner().next().expect("dep_source has a variant");
    let k = parse_index(&inner);
    match inner.as_rule() {
        Rule::ldep_source => DepSource::LeftDep(k),
        Rule::rdep_source => DepSource::RightDep(k),
        rule => unreachable!("unexpected dep_source variant: {:?}", rule),
    }
}

fn build_layer(pair: pest::iterators::Pair<Rule>) -> Layer {
    let inner = pair.into_inner().next().expect("layer has a variant");
    match inner.as_rule() {
        Rule::token_layer => Layer::Token,
        Rule::tag_layer => Layer::Tag,
        Rule::deprel_layer => Layer::DepRel,
        Rule::feature_layer => {
            let name = inner
                .into_inner()
                .next()
                .expect("feature layer carries a name");
            Layer::Feature(name.as_str().to_string())
        }
        rule => unreachable!("unexpected layer variant: {:?}", rule),
    }
}

fn parse_index(pair: &pest::iterators::Pair<Rule>) -> usize {
    let index = pair
        .clone()
        .into_inner()
        .next()
        .expect("positional rule carries an index");
    index
        .as_str()
        .parse()
        .expect("grammar restricts indices to digits")
}
