use crate::data::{Sentence, Token};
use crate::system::{DependencyArc, DependencySet, ParserError};

/// Reusable allocations for a [`Configuration`].
///
/// A worker parses many sentences; recycling the scratch between them avoids
/// per-parse allocation churn.
#[derive(Debug, Default)]
pub struct ConfigScratch {
    stack: Vec<usize>,
    arcs: Vec<DependencyArc>,
    heads: Vec<Option<usize>>,
    ldeps: Vec<Vec<usize>>,
    rdeps: Vec<Vec<usize>>,
}

/// The mutable state of a parse: stack, buffer, and the arcs decided so far.
///
/// The stack holds token indices with the top last and starts as `[0]` (the
/// artificial root); the buffer starts as `1..n` front first. Arcs are
/// append-only; left and right dependents per head are cached in token-index
/// order so that addressed features resolve in O(1).
#[derive(Debug)]
pub struct Configuration<'a> {
    sentence: &'a Sentence,
    stack: Vec<usize>,
    front: usize,
    arcs: Vec<DependencyArc>,
    heads: Vec<Option<usize>>,
    ldeps: Vec<Vec<usize>>,
    rdeps: Vec<Vec<usize>>,
}

impl<'a> Configuration<'a> {
    /// The initial configuration for a sentence.
    pub fn new(sentence: &'a Sentence) -> Self {
        Self::with_scratch(sentence, ConfigScratch::default())
    }

    /// The initial configuration for a sentence, reusing scratch allocations
    /// from an earlier parse.
    pub fn with_scratch(sentence: &'a Sentence, mut scratch: ConfigScratch) -> Self {
        let n_tokens = sentence.len();

        scratch.stack.clear();
        scratch.stack.push(0);
        scratch.arcs.clear();

        scratch.heads.clear();
        scratch.heads.resize(n_tokens + 1, None);

        for deps in &mut scratch.ldeps {
            deps.clear();
        }
        scratch.ldeps.resize_with(n_tokens + 1, Vec::new);
        for deps in &mut scratch.rdeps {
            deps.clear();
        }
        scratch.rdeps.resize_with(n_tokens + 1, Vec::new);

        Configuration {
            sentence,
            stack: scratch.stack,
            front: 1,
            arcs: scratch.arcs,
            heads: scratch.heads,
            ldeps: scratch.ldeps,
            rdeps: scratch.rdeps,
        }
    }

    /// Tear the configuration down into its reusable allocations.
    pub fn into_scratch(self) -> ConfigScratch {
        ConfigScratch {
            stack: self.stack,
            arcs: self.arcs,
            heads: self.heads,
            ldeps: self.ldeps,
            rdeps: self.rdeps,
        }
    }

    pub fn sentence(&self) -> &'a Sentence {
        self.sentence
    }

    /// Look up a token by index; 0 is the artificial root, indices past the
    /// sentence yield `None`.
    pub fn token(&self, index: usize) -> Option<&'a Token> {
        if index > self.sentence.len() {
            None
        } else {
            self.sentence.token(index)
        }
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn buffer_len(&self) -> usize {
        self.sentence.len() + 1 - self.front
    }

    pub fn buffer_is_empty(&self) -> bool {
        self.front > self.sentence.len()
    }

    /// The k-th stack element from the top (k = 0 is the top).
    pub fn stack_top(&self, k: usize) -> Option<usize> {
        if k < self.stack.len() {
            Some(self.stack[self.stack.len() - 1 - k])
        } else {
            None
        }
    }

    /// The k-th buffer element from the front (k = 0 is the front).
    pub fn buffer_front(&self, k: usize) -> Option<usize> {
        let index = self.front + k;
        if index <= self.sentence.len() {
            Some(index)
        } else {
            None
        }
    }

    /// Move the buffer front onto the stack.
    pub fn shift(&mut self) -> Option<usize> {
        let front = self.buffer_front(0)?;
        self.stack.push(front);
        self.front += 1;
        Some(front)
    }

    /// Pop the stack top.
    pub fn pop(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    /// Pop the element below the stack top.
    pub fn pop_second(&mut self) -> Option<usize> {
        if self.stack.len() < 2 {
            return None;
        }
        let index = self.stack.len() - 2;
        Some(self.stack.remove(index))
    }

    /// Record the arc `head -> dependent` and update the dependent caches.
    ///
    /// Attaching a dependent that already has a head is a caller bug.
    pub fn attach(
        &mut self,
        head: usize,
        dependent: usize,
        relation: &str,
    ) -> Result<(), ParserError> {
        if self.heads[dependent].is_some() {
            return Err(ParserError::DuplicateHead { dependent });
        }

        self.arcs
            .push(DependencyArc::new(head, dependent, relation));
        self.heads[dependent] = Some(self.arcs.len() - 1);

        let deps = if dependent < head {
            &mut self.ldeps[head]
        } else {
            &mut self.rdeps[head]
        };
        let position = deps.partition_point(|&existing| existing < dependent);
        deps.insert(position, dependent);

        Ok(())
    }

    /// The head assigned to a dependent so far, if any.
    pub fn head_of(&self, dependent: usize) -> Option<usize> {
        let arc = (*self.heads.get(dependent)?)?;
        Some(self.arcs[arc].head)
    }

    /// The relation assigned to a dependent so far, if any.
    pub fn deprel_of(&self, dependent: usize) -> Option<&str> {
        let arc = (*self.heads.get(dependent)?)?;
        Some(&self.arcs[arc].relation)
    }

    pub fn has_head(&self, dependent: usize) -> bool {
        self.head_of(dependent).is_some()
    }

    /// The k-th leftmost dependent attached to `head` (k = 0 is the
    /// outermost, i.e. leftmost).
    pub fn ldep(&self, head: usize, k: usize) -> Option<usize> {
        self.ldeps.get(head)?.get(k).copied()
    }

    /// The k-th rightmost dependent attached to `head` (k = 0 is the
    /// outermost, i.e. rightmost).
    pub fn rdep(&self, head: usize, k: usize) -> Option<usize> {
        let deps = self.rdeps.get(head)?;
        if k < deps.len() {
            Some(deps[deps.len() - 1 - k])
        } else {
            None
        }
    }

    /// The number of dependents attached to `head` so far.
    pub fn attached_deps(&self, head: usize) -> usize {
        self.ldeps[head].len() + self.rdeps[head].len()
    }

    /// The arcs decided so far, in attachment order.
    pub fn arcs(&self) -> &[DependencyArc] {
        &self.arcs
    }

    /// Clone the decided arcs out of the configuration.
    pub fn dependencies(&self) -> DependencySet {
        self.arcs.clone()
    }
}
