//! Conversion of permutations into words over the generators, using a trained Minkwitz chain.
//!
//! A permutation `p` is sifted through the chain: on every level the representative `r` of the
//! coset containing `p` is looked up and `p` is replaced by `p · r⁻¹`, which fixes the level's
//! base point. Once the residue is the identity, `p` is the product of the representatives from
//! the deepest level up, and so is its word.

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    algebra::{DimensionMismatch, Permutation, Point},
    element::GroupElement,
    minkwitz::{ExtendedMinkwitzChain, MinkwitzChain},
    simplify::RuleSet,
    word::Word,
};

/// Errors that can occur while factoring a permutation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum FactorizationError {
    /// The chain is not trained well enough: the coset of `point` on `level` has no
    /// representative yet.
    #[error("no representative for point {point} on level {level}, the chain needs more training")]
    MissingRepresentative {
        /// Level of the chain.
        level: usize,
        /// Image of the level's base point.
        point: Point,
    },
    /// The permutation is not an element of the group.
    #[error("the permutation is not an element of the group")]
    NotInGroup,
    /// The permutation moves points outside the ground set of the group.
    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatch),
}

fn fit(permutation: &Permutation, degree: usize) -> Result<Permutation, FactorizationError> {
    permutation.resize(degree).ok_or_else(|| {
        DimensionMismatch {
            left: permutation.degree(),
            right: degree,
        }
        .into()
    })
}

/// Factors `permutation` with the representatives of `chain` and simplifies the resulting word.
pub fn factor(
    chain: &MinkwitzChain,
    permutation: &Permutation,
    rules: &RuleSet,
) -> Result<GroupElement, FactorizationError> {
    let permutation = fit(permutation, chain.degree())?;
    let mut residue = permutation.clone();
    let mut representatives = Vec::with_capacity(chain.depth());
    for (level, node) in chain.levels().iter().enumerate() {
        let omega = node.base_point();
        let gamma = residue.action(omega);
        if gamma == omega {
            continue;
        }
        if !node.orbit().contains(&gamma) {
            return Err(FactorizationError::NotInGroup);
        }
        let Some(rep) = node.representative(gamma) else {
            warn!("missing representative for {gamma} on level {level}");
            return Err(FactorizationError::MissingRepresentative { level, point: gamma });
        };
        residue = residue.multiply(&rep.permutation().inverse())?;
        representatives.push(rep);
    }
    if !residue.is_identity() {
        return Err(FactorizationError::NotInGroup);
    }

    let mut word = representatives
        .iter()
        .rev()
        .fold(Word::empty(), |word, rep| word.concat(rep.word()));
    let passes = rules.simplify(&mut word);
    trace!("factored {permutation} with {} letters after {passes} passes", word.len());
    Ok(GroupElement::new(permutation, word))
}

/// All words that an [`ExtendedMinkwitzChain`] produced for one permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedFactorization {
    candidates: Vec<GroupElement>,
    expansions: usize,
}

impl ExtendedFactorization {
    /// The distinct candidates, shortest first.
    pub fn candidates(&self) -> &[GroupElement] {
        &self.candidates
    }

    /// The shortest candidate.
    pub fn best(&self) -> Option<&GroupElement> {
        self.candidates.first()
    }

    /// Number of partial products that were formed.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Consumes the factorization, returning the candidates.
    pub fn into_candidates(self) -> Vec<GroupElement> {
        self.candidates
    }
}

struct Expansion<'a> {
    chain: &'a ExtendedMinkwitzChain,
    rules: &'a RuleSet,
    max_depth: usize,
    expansions: usize,
}

impl Expansion<'_> {
    fn words(&mut self, level: usize, residue: Permutation) -> Result<Vec<Word>, FactorizationError> {
        let Some(node) = self.chain.levels().get(level) else {
            return if residue.is_identity() {
                Ok(vec![Word::empty()])
            } else {
                Err(FactorizationError::NotInGroup)
            };
        };
        let omega = node.base_point();
        let gamma = residue.action(omega);
        if gamma == omega {
            return self.words(level + 1, residue);
        }
        if !node.orbit().contains(&gamma) {
            return Err(FactorizationError::NotInGroup);
        }
        let Some(reps) = node.representatives(gamma) else {
            return Err(FactorizationError::MissingRepresentative { level, point: gamma });
        };
        let take = if level < self.max_depth { reps.len() } else { 1 };

        let mut words = vec![];
        let mut missing = None;
        for rep in reps.iter().take(take) {
            let next = residue.multiply(&rep.permutation().inverse())?;
            match self.words(level + 1, next) {
                Ok(lower) => {
                    for lower in lower {
                        let mut word = lower.concat(rep.word());
                        self.rules.simplify(&mut word);
                        self.expansions += 1;
                        words.push(word);
                    }
                }
                Err(e @ FactorizationError::MissingRepresentative { .. }) => {
                    missing.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        match missing {
            Some(e) if words.is_empty() => Err(e),
            _ => Ok(words),
        }
    }
}

/// Factors `permutation` with every combination of representatives on the levels above
/// `max_depth` and the best representative below. Branches that run into a missing
/// representative are dropped; the error is only returned if no branch succeeds.
pub fn factor_extended(
    chain: &ExtendedMinkwitzChain,
    permutation: &Permutation,
    rules: &RuleSet,
    max_depth: usize,
) -> Result<ExtendedFactorization, FactorizationError> {
    let permutation = fit(permutation, chain.degree())?;
    let mut expansion = Expansion {
        chain,
        rules,
        max_depth,
        expansions: 0,
    };
    let words = expansion.words(0, permutation.clone())?;
    let mut candidates: Vec<GroupElement> = words
        .into_iter()
        .map(|word| GroupElement::new(permutation.clone(), word))
        .collect();
    candidates.sort();
    candidates.dedup();
    debug!(
        "{} candidate words for {permutation} from {} expansions",
        candidates.len(),
        expansion.expansions
    );
    Ok(ExtendedFactorization {
        candidates,
        expansions: expansion.expansions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        group::tests::{coxeter_b3, symmetric_group},
        minkwitz::TrainingContext,
        random::rng,
    };

    #[test_log::test]
    fn every_element_round_trips() {
        let group = symmetric_group();
        let rules = RuleSet::generate(&group, None);
        let mut chain = MinkwitzChain::new(group.stabilizer_chain());
        for element in group.cayley_graph(None) {
            chain.train(element, &rules);
        }
        for element in group.cayley_graph(None) {
            let factored = factor(&chain, element.permutation(), &rules).unwrap();
            assert_eq!(factored.permutation(), element.permutation());
            assert_eq!(
                group.word_to_element(factored.word()).permutation(),
                element.permutation()
            );
        }
        assert!(factor(&chain, &Permutation::identity(5), &rules)
            .unwrap()
            .word()
            .is_empty());
    }

    #[test]
    fn extended_candidates_round_trip() {
        let group = coxeter_b3();
        let rules = RuleSet::generate(&group, Some(10));
        let mut rng = rng(Some(23));
        let mut context = TrainingContext::new(&rules, &mut rng).with_branching(2);
        let mut chain = ExtendedMinkwitzChain::new(group.stabilizer_chain());
        for element in group.cayley_graph(None) {
            chain.train(element, &mut context);
        }
        for element in group.cayley_graph(None) {
            let factorization = factor_extended(&chain, element.permutation(), &rules, 2).unwrap();
            assert!(!factorization.candidates().is_empty());
            assert!(factorization
                .candidates()
                .windows(2)
                .all(|w| w[0].word_len() <= w[1].word_len()));
            for candidate in factorization.candidates() {
                assert_eq!(
                    group.word_to_element(candidate.word()).permutation(),
                    element.permutation()
                );
            }
            assert!(factorization.best().unwrap().word_len() >= element.word_len());
        }
    }

    #[test]
    fn untrained_chains_report_missing_representatives() {
        let group = symmetric_group();
        let rules = RuleSet::new();
        let element = group.parse_element("a").unwrap();
        let chain = MinkwitzChain::new(group.stabilizer_chain());
        assert_eq!(
            factor(&chain, element.permutation(), &rules),
            Err(FactorizationError::MissingRepresentative { level: 0, point: 1 })
        );
        let extended = ExtendedMinkwitzChain::new(group.stabilizer_chain());
        assert_eq!(
            factor_extended(&extended, element.permutation(), &rules, 2),
            Err(FactorizationError::MissingRepresentative { level: 0, point: 1 })
        );
    }

    #[test]
    fn foreign_permutations_are_rejected() {
        let group = coxeter_b3();
        let rules = RuleSet::new();
        let mut chain = MinkwitzChain::new(group.stabilizer_chain());
        for element in group.cayley_graph(None) {
            chain.train(element, &rules);
        }
        assert_eq!(
            factor(&chain, &"(1 2)".parse().unwrap(), &rules),
            Err(FactorizationError::NotInGroup)
        );
        assert!(matches!(
            factor(&chain, &"(1 20)".parse().unwrap(), &rules),
            Err(FactorizationError::DimensionMismatch(_))
        ));

        let padded: Permutation = "(1 5)(2 6)(3 7)(4 8)(20)".parse().unwrap();
        assert!(group.contains(&padded));
        let factored = factor(&chain, &padded, &rules).unwrap();
        assert_eq!(
            group.word_to_element(factored.word()).permutation(),
            &"(1 5)(2 6)(3 7)(4 8)".parse().unwrap()
        );
    }

    #[test]
    fn depth_bounds_the_expansion() {
        let group = symmetric_group();
        let rules = RuleSet::generate(&group, None);
        let mut chain = ExtendedMinkwitzChain::new(group.stabilizer_chain());
        chain.pre_train(group.cayley_graph(None));
        // AA and Ab both send 0 to 3
        assert!(chain.representatives(0, 3).is_some_and(|reps| reps.len() > 1));

        let element = group.parse_element("AA").unwrap();
        let shallow = factor_extended(&chain, element.permutation(), &rules, 0).unwrap();
        let deep = factor_extended(&chain, element.permutation(), &rules, 3).unwrap();
        assert_eq!(shallow.candidates().len(), 1);
        assert!(deep.expansions() > shallow.expansions());

        let (mut shallow_total, mut deep_total) = (0, 0);
        for element in group.cayley_graph(None) {
            let shallow = factor_extended(&chain, element.permutation(), &rules, 0).unwrap();
            let deep = factor_extended(&chain, element.permutation(), &rules, 3).unwrap();
            assert_eq!(shallow.candidates().len(), 1);
            assert!(deep.candidates().len() >= 1);
            assert!(deep.expansions() >= shallow.expansions());
            shallow_total += shallow.expansions();
            deep_total += deep.expansions();
        }
        assert!(deep_total > shallow_total);
    }
}
