//! The guide: a classifier that picks the next transition.

use crate::features::{FeatureGenerator, HasherFactory};
use crate::ml::{RankingModel, SparseVector};
use crate::system::{Configuration, LabelNumberer, ParserError, Transition, TransitionSystem};

/// Chooses the next transition for a configuration.
pub trait Guide {
    fn best_transition(&mut self, config: &Configuration) -> Result<Transition, ParserError>;
}

/// A hash-kernel guide over a linear ranking model.
///
/// Features are hashed into a fixed-size kernel, the model ranks all known
/// transitions, and the best-ranked transition whose preconditions hold is
/// chosen. The scratch vector is reused across calls; everything else is
/// shared immutable state.
pub struct HashingGuide<'a, M> {
    system: &'a dyn TransitionSystem,
    generator: &'a dyn FeatureGenerator,
    numberer: &'a LabelNumberer,
    model: &'a M,
    hasher: HasherFactory,
    hash_kernel_size: u32,
    scratch: SparseVector,
}

impl<'a, M: RankingModel> HashingGuide<'a, M> {
    pub fn new(
        system: &'a dyn TransitionSystem,
        generator: &'a dyn FeatureGenerator,
        numberer: &'a LabelNumberer,
        model: &'a M,
        hasher: HasherFactory,
        hash_kernel_size: u32,
    ) -> Self {
        HashingGuide {
            system,
            generator,
            numberer,
            model,
            hasher,
            hash_kernel_size,
            scratch: SparseVector::new(),
        }
    }
}

impl<M: RankingModel> Guide for HashingGuide<'_, M> {
    fn best_transition(&mut self, config: &Configuration) -> Result<Transition, ParserError> {
        self.scratch.clear();
        self.generator.generate_hashed(
            config,
            self.hasher,
            self.hash_kernel_size,
            &mut self.scratch,
        );

        let ranking = self.model.predict_sorted(&self.scratch);
        let ranked = ranking.len();

        for id in ranking {
            let transition = self
                .numberer
                .transition(id)
                .ok_or(ParserError::UnknownTransition { id })?;

            if self.system.is_possible(config, transition) {
                return Ok(transition.clone());
            }

            log::trace!("Skipping illegal transition {}", transition);
        }

        Err(ParserError::NoLegalTransition { ranked })
    }
}
