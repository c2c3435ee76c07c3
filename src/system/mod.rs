//! Transition systems over parser configurations.
//!
//! This module is organized into the following submodules:
//! - `configuration`: the mutable parser state (stack, buffer, arc set)
//! - `arc_standard`: the arc-standard transition system
//! - `arc_eager`: the arc-eager transition system
//! - `stack_projective`: arc-standard over projectivized input
//! - `numberer`: the bijection between transitions and dense IDs

pub mod arc_eager;
pub mod arc_standard;
pub mod configuration;
pub mod numberer;
pub mod stack_projective;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use arc_eager::ArcEager;
pub use arc_standard::ArcStandard;
pub use configuration::{ConfigScratch, Configuration};
pub use numberer::LabelNumberer;
pub use stack_projective::StackProjective;

use crate::data::Sentence;

/// Errors surfaced while driving a parse.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("no legal transition among {ranked} ranked candidates")]
    NoLegalTransition { ranked: usize },

    #[error("transition {transition} violates its preconditions")]
    PreconditionViolation { transition: String },

    #[error("model ranked unknown transition ID {id}")]
    UnknownTransition { id: usize },

    #[error("token {dependent} already has a head")]
    DuplicateHead { dependent: usize },

    #[error("oracle cannot derive a transition (non-projective or inconsistent gold arcs)")]
    UnreachableGold,
}

/// Error parsing a serialized transition descriptor.
#[derive(Debug, Error)]
#[error("invalid transition descriptor: {descriptor}")]
pub struct TransitionParseError {
    pub descriptor: String,
}

/// A head-dependent edge with a relation label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyArc {
    pub head: usize,
    pub dependent: usize,
    pub relation: String,
}

impl DependencyArc {
    pub fn new(head: usize, dependent: usize, relation: impl Into<String>) -> Self {
        DependencyArc {
            head,
            dependent,
            relation: relation.into(),
        }
    }
}

/// The arcs decided for one sentence, in attachment order.
pub type DependencySet = Vec<DependencyArc>;

/// Returns true iff no two arcs cross when drawn above the sentence.
pub fn is_projective(arcs: &[DependencyArc]) -> bool {
    for (i, a) in arcs.iter().enumerate() {
        let (a_lo, a_hi) = span(a);
        for b in &arcs[i + 1..] {
            let (b_lo, b_hi) = span(b);
            if (a_lo < b_lo && b_lo < a_hi && a_hi < b_hi)
                || (b_lo < a_lo && a_lo < b_hi && b_hi < a_hi)
            {
                return false;
            }
        }
    }

    true
}

fn span(arc: &DependencyArc) -> (usize, usize) {
    if arc.head < arc.dependent {
        (arc.head, arc.dependent)
    } else {
        (arc.dependent, arc.head)
    }
}

/// An atomic move of the pushdown automaton.
///
/// The full family of transitions across all supported systems; each system
/// admits a subset of the variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transition {
    Shift,
    Reduce,
    LeftArc(String),
    RightArc(String),
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Transition::Shift => write!(f, "SHIFT"),
            Transition::Reduce => write!(f, "REDUCE"),
            Transition::LeftArc(label) => write!(f, "LEFT_ARC {}", label),
            Transition::RightArc(label) => write!(f, "RIGHT_ARC {}", label),
        }
    }
}

impl FromStr for Transition {
    type Err = TransitionParseError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let descriptor = descriptor.trim();
        match descriptor {
            "SHIFT" => return Ok(Transition::Shift),
            "REDUCE" => return Ok(Transition::Reduce),
            _ => (),
        }

        if let Some((kind, label)) = descriptor.split_once(' ') {
            let label = label.trim();
            if !label.is_empty() {
                match kind {
                    "LEFT_ARC" => return Ok(Transition::LeftArc(label.to_string())),
                    "RIGHT_ARC" => return Ok(Transition::RightArc(label.to_string())),
                    _ => (),
                }
            }
        }

        Err(TransitionParseError {
            descriptor: descriptor.to_string(),
        })
    }
}

/// A transition system: which moves exist, when they are legal, how they
/// mutate a configuration, and when a configuration is final.
pub trait TransitionSystem: Send + Sync {
    /// The name the configuration file selects this system by.
    fn name(&self) -> &'static str;

    /// Whether this system admits the transition variant at all,
    /// independent of any configuration.
    fn admits(&self, transition: &Transition) -> bool;

    /// Whether the transition's preconditions hold in the configuration.
    fn is_possible(&self, config: &Configuration, transition: &Transition) -> bool;

    /// True iff the configuration is final.
    fn is_terminal(&self, config: &Configuration) -> bool;

    /// Apply the transition. Preconditions are re-checked defensively;
    /// applying an illegal transition is a caller bug and reported as
    /// [`ParserError::PreconditionViolation`].
    fn apply(&self, config: &mut Configuration, transition: &Transition)
        -> Result<(), ParserError>;

    /// The correct next transition towards the gold arcs. Training only.
    fn oracle(&self, config: &Configuration, gold: &GoldArcs) -> Result<Transition, ParserError>;

    /// All transitions known to the numberer whose preconditions hold.
    fn possible(&self, config: &Configuration, numberer: &LabelNumberer) -> Vec<Transition> {
        numberer
            .transitions()
            .iter()
            .filter(|transition| self.is_possible(config, transition))
            .cloned()
            .collect()
    }
}

/// Look up a transition system by its configuration-file name.
pub fn transition_system(name: &str) -> Option<Box<dyn TransitionSystem>> {
    match name {
        "arcstandard" => Some(Box::new(ArcStandard)),
        "arceager" => Some(Box::new(ArcEager)),
        "stackproj" => Some(Box::new(StackProjective::new())),
        _ => None,
    }
}

/// Gold-standard arcs indexed for O(1) oracle lookups.
#[derive(Debug, Clone)]
pub struct GoldArcs {
    heads: Vec<Option<(usize, String)>>,
    dep_counts: Vec<usize>,
}

impl GoldArcs {
    /// Index the head annotations of a gold sentence.
    pub fn from_sentence(sentence: &Sentence) -> Self {
        let arcs: Vec<_> = sentence
            .tokens()
            .enumerate()
            .filter_map(|(offset, token)| {
                let head = token.head()?;
                let relation = token.head_rel()?;
                Some(DependencyArc::new(head, offset + 1, relation))
            })
            .collect();

        Self::from_arcs(sentence.len(), &arcs)
    }

    pub fn from_arcs(n_tokens: usize, arcs: &[DependencyArc]) -> Self {
        let mut heads = vec![None; n_tokens + 1];
        let mut dep_counts = vec![0; n_tokens + 1];

        for arc in arcs {
            heads[arc.dependent] = Some((arc.head, arc.relation.clone()));
            dep_counts[arc.head] += 1;
        }

        GoldArcs { heads, dep_counts }
    }

    /// The gold head of a dependent, if annotated.
    pub fn head(&self, dependent: usize) -> Option<usize> {
        self.heads.get(dependent)?.as_ref().map(|(head, _)| *head)
    }

    /// The gold relation of a dependent, if annotated.
    pub fn relation(&self, dependent: usize) -> Option<&str> {
        self.heads
            .get(dependent)?
            .as_ref()
            .map(|(_, relation)| relation.as_str())
    }

    /// The number of gold dependents of a head.
    pub fn dep_count(&self, head: usize) -> usize {
        self.dep_counts.get(head).copied().unwrap_or(0)
    }
}
