//! The greedy parser loop.

use crate::data::Sentence;
use crate::guide::Guide;
use crate::system::{ConfigScratch, Configuration, DependencySet, ParserError, TransitionSystem};

/// Parses a sentence into a set of dependency arcs.
pub trait Parse {
    fn parse(&mut self, sentence: &Sentence) -> Result<DependencySet, ParserError>;
}

/// A deterministic greedy parser.
///
/// Repeatedly applies the guide's best legal transition until the
/// configuration is terminal (Kübler, Nivre & McDonald, 2009, ch. 3).
/// Configuration allocations are recycled across sentences.
pub struct GreedyParser<'a, G> {
    system: &'a dyn TransitionSystem,
    guide: G,
    scratch: ConfigScratch,
}

impl<'a, G> GreedyParser<'a, G>
where
    G: Guide,
{
    pub fn new(system: &'a dyn TransitionSystem, guide: G) -> Self {
        GreedyParser {
            system,
            guide,
            scratch: ConfigScratch::default(),
        }
    }
}

impl<G> Parse for GreedyParser<'_, G>
where
    G: Guide,
{
    fn parse(&mut self, sentence: &Sentence) -> Result<DependencySet, ParserError> {
        let mut config =
            Configuration::with_scratch(sentence, std::mem::take(&mut self.scratch));

        let result = self.drive(&mut config);
        let dependencies = config.dependencies();
        self.scratch = config.into_scratch();

        result.map(|()| dependencies)
    }
}

impl<G> GreedyParser<'_, G>
where
    G: Guide,
{
    fn drive(&mut self, config: &mut Configuration) -> Result<(), ParserError> {
        while !self.system.is_terminal(config) {
            let transition = self.guide.best_transition(config)?;
            self.system.apply(config, &transition)?;
        }

        Ok(())
    }
}
