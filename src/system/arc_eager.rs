use crate::system::{Configuration, GoldArcs, ParserError, Transition, TransitionSystem};

/// The arc-eager transition system (Nivre, 2003).
///
/// Attaches arcs as early as possible; right dependents stay on the stack
/// until popped by REDUCE. Parsing ends when the buffer is exhausted, which
/// may leave tokens unattached.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcEager;

impl TransitionSystem for ArcEager {
    fn name(&self) -> &'static str {
        "arceager"
    }

    fn admits(&self, _transition: &Transition) -> bool {
        true
    }

    fn is_possible(&self, config: &Configuration, transition: &Transition) -> bool {
        match transition {
            Transition::Shift => !config.buffer_is_empty(),
            Transition::LeftArc(_) => match config.stack_top(0) {
                Some(top) => top != 0 && !config.has_head(top) && !config.buffer_is_empty(),
                None => false,
            },
            Transition::RightArc(_) => config.stack_len() >= 1 && !config.buffer_is_empty(),
            Transition::Reduce => match config.stack_top(0) {
                Some(top) => config.has_head(top),
                None => false,
            },
        }
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        config.buffer_is_empty()
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
                let front = config.buffer_front(0).expect("checked by is_possible");
                let top = config.pop().expect("checked by is_possible");
                config.attach(front, top, label)?;
            }
            Transition::RightArc(label) => {
                let top = config.stack_top(0).expect("checked by is_possible");
                let front = config.shift().expect("checked by is_possible");
                config.attach(top, front, label)?;
            }
            Transition::Reduce => {
                config.pop();
            }
        }

        Ok(())
    }

    fn oracle(&self, config: &Configuration, gold: &GoldArcs) -> Result<Transition, ParserError> {
        let front = match config.buffer_front(0) {
            Some(front) => front,
            None => return Err(ParserError::UnreachableGold),
        };

        if let Some(top) = config.stack_top(0) {
            if top != 0 && gold.head(top) == Some(front) {
                let relation = gold.relation(top).ok_or(ParserError::UnreachableGold)?;
                return Ok(Transition::LeftArc(relation.to_string()));
            }

            if gold.head(front) == Some(top) {
                let relation = gold.relation(front).ok_or(ParserError::UnreachableGold)?;
                return Ok(Transition::RightArc(relation.to_string()));
            }

            // Pop the top once the buffer front relates to something below
            // it; keeping the top would block that attachment.
            if config.has_head(top) && self.front_relates_below(config, gold, front, top) {
                return Ok(Transition::Reduce);
            }
        }

        Ok(Transition::Shift)
    }
}

impl ArcEager {
    fn front_relates_below(
        &self,
        config: &Configuration,
        gold: &GoldArcs,
        front: usize,
        top: usize,
    ) -> bool {
        for k in 1..config.stack_len() {
            let below = match config.stack_top(k) {
                Some(below) => below,
                None => break,
            };
            if gold.head(front) == Some(below) || gold.head(below) == Some(front) {
                return true;
            }
        }

        false
    }
}
