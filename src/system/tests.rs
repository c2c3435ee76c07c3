//! Cross-system invariant tests: tree shape, single-head, projectivity.

use std::collections::HashSet;

use crate::data::{Sentence, Token};
use crate::system::{
    is_projective, ArcEager, ArcStandard, Configuration, DependencyArc, DependencySet, GoldArcs,
    StackProjective, TransitionSystem,
};

fn sentence(forms: &[&str]) -> Sentence {
    forms.iter().map(|f| Token::new(*f)).collect()
}

/// det(2,1) nsubj(3,2) root(0,3) obj(3,4) advmod(3,5): a small projective
/// tree over five tokens.
fn gold_arcs() -> Vec<DependencyArc> {
    vec![
        DependencyArc::new(2, 1, "det"),
        DependencyArc::new(3, 2, "nsubj"),
        DependencyArc::new(0, 3, "root"),
        DependencyArc::new(3, 4, "obj"),
        DependencyArc::new(3, 5, "advmod"),
    ]
}

/// Assert the arc set is a tree over `1..=n` rooted at 0.
fn assert_tree_shape(arcs: &DependencySet, n_tokens: usize) {
    let mut head_of = vec![None; n_tokens + 1];
    for arc in arcs {
        assert!(
            head_of[arc.dependent].is_none(),
            "token {} has two heads",
            arc.dependent
        );
        head_of[arc.dependent] = Some(arc.head);
    }

    for dependent in 1..=n_tokens {
        assert!(
            head_of[dependent].is_some(),
            "token {} has no head",
            dependent
        );
    }

    // Every token must reach 0 without cycles.
    for mut current in 1..=n_tokens {
        let mut seen = HashSet::new();
        while current != 0 {
            assert!(seen.insert(current), "cycle through token {}", current);
            current = head_of[current].unwrap();
        }
    }
}

fn oracle_parse(system: &dyn TransitionSystem, sentence: &Sentence, gold: &GoldArcs) -> DependencySet {
    let mut config = Configuration::new(sentence);
    while !system.is_terminal(&config) {
        let transition = system.oracle(&config, gold).unwrap();
        system.apply(&mut config, &transition).unwrap();

        // Single-head must hold at every intermediate configuration.
        let mut dependents = HashSet::new();
        for arc in config.arcs() {
            assert!(dependents.insert(arc.dependent));
        }
    }

    config.dependencies()
}

#[test]
fn test_tree_shape_on_termination() {
    let sentence = sentence(&["the", "dogs", "eat", "fish", "today"]);
    let gold = GoldArcs::from_arcs(sentence.len(), &gold_arcs());

    for system in [
        &ArcStandard as &dyn TransitionSystem,
        &ArcEager,
        &StackProjective::new(),
    ] {
        let arcs = oracle_parse(system, &sentence, &gold);
        assert_tree_shape(&arcs, sentence.len());
    }
}

#[test]
fn test_projectivity_of_projective_systems() {
    let sentence = sentence(&["the", "dogs", "eat", "fish", "today"]);
    let gold = GoldArcs::from_arcs(sentence.len(), &gold_arcs());

    for system in [&ArcStandard as &dyn TransitionSystem, &StackProjective::new()] {
        let arcs = oracle_parse(system, &sentence, &gold);
        assert!(is_projective(&arcs));
    }
}

#[test]
fn test_oracle_is_deterministic() {
    let sentence = sentence(&["the", "dogs", "eat", "fish", "today"]);
    let gold = GoldArcs::from_arcs(sentence.len(), &gold_arcs());

    let first = oracle_parse(&ArcStandard, &sentence, &gold);
    let second = oracle_parse(&ArcStandard, &sentence, &gold);
    assert_eq!(first, second);
}

#[test]
fn test_empty_sentence_yields_no_arcs() {
    let empty = Sentence::default();
    let gold = GoldArcs::from_arcs(0, &[]);

    for system in [
        &ArcStandard as &dyn TransitionSystem,
        &ArcEager,
        &StackProjective::new(),
    ] {
        let config = Configuration::new(&empty);
        assert!(system.is_terminal(&config));
        let arcs = oracle_parse(system, &empty, &gold);
        assert!(arcs.is_empty());
    }
}

#[test]
fn test_possible_filters_the_numberer() {
    use crate::system::{LabelNumberer, Transition};

    let sentence = sentence(&["dogs", "bark"]);
    let config = Configuration::new(&sentence);
    let numberer = LabelNumberer::from_reader(
        "SHIFT\nLEFT_ARC nsubj\nRIGHT_ARC root\n".as_bytes(),
        &ArcStandard,
    )
    .unwrap();

    // Initial configuration: the stack holds only the root.
    let possible = ArcStandard.possible(&config, &numberer);
    assert_eq!(possible, vec![Transition::Shift]);
}

#[test]
fn test_gold_arcs_from_sentence() {
    let mut sentence = sentence(&["dogs", "bark"]);
    sentence.token_mut(1).unwrap().set_head(Some(2));
    sentence.token_mut(1).unwrap().set_head_rel(Some("nsubj"));
    sentence.token_mut(2).unwrap().set_head(Some(0));
    sentence.token_mut(2).unwrap().set_head_rel(Some("root"));

    let gold = GoldArcs::from_sentence(&sentence);
    assert_eq!(gold.head(1), Some(2));
    assert_eq!(gold.relation(2), Some("root"));
    assert_eq!(gold.dep_count(2), 1);
    assert_eq!(gold.dep_count(0), 1);
    assert_eq!(gold.dep_count(1), 0);
}
