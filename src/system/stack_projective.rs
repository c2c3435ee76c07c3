use crate::system::{
    ArcStandard, Configuration, GoldArcs, ParserError, Transition, TransitionSystem,
};

/// The "stackproj" system: arc-standard over projectivized input.
///
/// Training corpora are projectivized before oracle runs and predicted arcs
/// are deprojectivized outside the core; the automaton itself is exactly
/// arc-standard. Lifted-label re-encoding is not performed here.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackProjective {
    inner: ArcStandard,
}

impl StackProjective {
    pub fn new() -> Self {
        StackProjective { inner: ArcStandard }
    }
}

impl TransitionSystem for StackProjective {
    fn name(&self) -> &'static str {
        "stackproj"
    }

    fn admits(&self, transition: &Transition) -> bool {
        self.inner.admits(transition)
    }

    fn is_possible(&self, config: &Configuration, transition: &Transition) -> bool {
        self.inner.is_possible(config, transition)
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        self.inner.is_terminal(config)
    }

    fn apply(
        &self,
        config: &mut Configuration,
        transition: &Transition,
    ) -> Result<(), ParserError> {
        self.inner.apply(config, transition)
    }

    fn oracle(&self, config: &Configuration, gold: &GoldArcs) -> Result<Transition, ParserError> {
        self.inner.oracle(config, gold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Sentence, Token};

    #[test]
    fn test_delegates_to_arc_standard() {
        let sentence: Sentence = ["dogs", "bark"].iter().map(|f| Token::new(*f)).collect();
        let mut config = Configuration::new(&sentence);
        let system = StackProjective::new();

        assert_eq!(system.name(), "stackproj");
        assert!(!system.admits(&Transition::Reduce));

        system.apply(&mut config, &Transition::Shift).unwrap();
        system.apply(&mut config, &Transition::Shift).unwrap();
        system
            .apply(&mut config, &Transition::LeftArc("nsubj".to_string()))
            .unwrap();
        system
            .apply(&mut config, &Transition::RightArc("root".to_string()))
            .unwrap();

        assert!(system.is_terminal(&config));
    }
}
