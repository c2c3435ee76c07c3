use crate::system::{Configuration, GoldArcs, ParserError, Transition, TransitionSystem};

/// The arc-standard transition system (Nivre, 2004).
///
/// Builds strictly projective trees bottom-up: a token is only attached to
/// its head once it has collected all of its own dependents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcStandard;

impl TransitionSystem for ArcStandard {
    fn name(&self) -> &'static str {
        "arcstandard"
    }

    fn admits(&self, transition: &Transition) -> bool {
        !matches!(transition, Transition::Reduce)
    }

    fn is_possible(&self, config: &Configuration, transition: &Transition) -> bool {
        match transition {
            Transition::Shift => !config.buffer_is_empty(),
            Transition::LeftArc(_) => {
                config.stack_len() >= 2 && config.stack_top(1) != Some(0)
            }
            Transition::RightArc(_) => config.stack_len() >= 2,
            Transition::Reduce => false,
        }
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        config.buffer_is_empty() && config.stack_len() == 1 && config.stack_top(0) == Some(0)
    }

    fn apply(
        &self,
        config: &mut Configuration,
        transition: &Transition,
    ) -> Result<(), ParserError> {
        if !self.is_possible(config, transition) {
            return Err(ParserError::PreconditionViolation {
                transition: transition.to_string(),
            });
        }

        match transition {
            Transition::Shift => {
                config.shift();
            }
            Transition::LeftArc(label) => {
                let top = config.stack_top(0).expect("checked by is_possible");
                let second = config.pop_second().expect("checked by is_possible");
                config.attach(top, second, label)?;
            }
            Transition::RightArc(label) => {
                let second = config.stack_top(1).expect("checked by is_possible");
                let top = config.pop().expect("checked by is_possible");
                config.attach(second, top, label)?;
            }
            Transition::Reduce => unreachable!("rejected by is_possible"),
        }

        Ok(())
    }

    fn oracle(&self, config: &Configuration, gold: &GoldArcs) -> Result<Transition, ParserError> {
        if let (Some(top), Some(second)) = (config.stack_top(0), config.stack_top(1)) {
            if second != 0 && gold.head(second) == Some(top) {
                let relation = gold.relation(second).ok_or(ParserError::UnreachableGold)?;
                return Ok(Transition::LeftArc(relation.to_string()));
            }

            // Attach top to its head only once all of its dependents are in
            // place; otherwise they would become unreachable.
            if gold.head(top) == Some(second) && config.attached_deps(top) == gold.dep_count(top) {
                let relation = gold.relation(top).ok_or(ParserError::UnreachableGold)?;
                return Ok(Transition::RightArc(relation.to_string()));
            }
        }

        if !config.buffer_is_empty() {
            return Ok(Transition::Shift);
        }

        Err(ParserError::UnreachableGold)
    }
}
