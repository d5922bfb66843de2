use std::{cmp::Ordering, collections::BTreeSet};

use tracing::{debug, trace};

use super::training::{Trainable, TrainingContext};
use crate::{
    algebra::Point,
    alphabet::Alphabet,
    element::GroupElement,
    math::{Map, OrderedSet},
    random::sample_positions,
    simplify::RuleSet,
    stabilizer::StabilizerChain,
};

/// One level of an [`ExtendedMinkwitzChain`]. Every coset holds a set of representatives that all
/// have the shortest word length known for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedLevel {
    orbit: Vec<Point>,
    representatives: Map<Point, OrderedSet<GroupElement>>,
}

impl ExtendedLevel {
    pub(crate) fn new(
        orbit: Vec<Point>,
        representatives: Map<Point, OrderedSet<GroupElement>>,
    ) -> Self {
        Self {
            orbit,
            representatives,
        }
    }

    /// The base point of the level.
    pub fn base_point(&self) -> Point {
        self.orbit[0]
    }

    /// The orbit, in the order of the stabilizer chain.
    pub fn orbit(&self) -> &[Point] {
        &self.orbit
    }

    /// The representatives for `point`, shortest word first.
    pub fn representatives(&self, point: Point) -> Option<&OrderedSet<GroupElement>> {
        self.representatives.get(&point).filter(|set| !set.is_empty())
    }

    /// The first representative for `point`.
    pub fn best(&self, point: Point) -> Option<&GroupElement> {
        self.representatives(point)?.first()
    }

    /// Orbit points with their representatives in orbit order, an empty set stands for a missing
    /// representative.
    pub fn entries(&self) -> impl Iterator<Item = (Point, Vec<&GroupElement>)> + '_ {
        self.orbit.iter().map(|p| {
            (
                *p,
                self.representatives
                    .get(p)
                    .map(|set| set.iter().collect())
                    .unwrap_or_default(),
            )
        })
    }

    /// Number of orbit points without a representative.
    pub fn missing(&self) -> usize {
        self.orbit
            .iter()
            .filter(|p| self.representatives(**p).is_none())
            .count()
    }

    /// Adds `element` if its word is at most as long as the current ones. A strictly shorter word
    /// replaces all current representatives.
    fn add(&mut self, point: Point, element: GroupElement) -> bool {
        let set = self.representatives.entry(point).or_default();
        match set.first().map(|first| first.word_len().cmp(&element.word_len())) {
            None => set.insert(element),
            Some(Ordering::Greater) => {
                set.clear();
                set.insert(element)
            }
            Some(Ordering::Equal) => set.insert(element),
            Some(Ordering::Less) => false,
        }
    }
}

/// A Minkwitz chain that keeps several equally short representatives per coset.
///
/// Training with a branching factor explores a random sample of these alternatives, which finds
/// shorter representatives on deeper levels than the basic chain does. Factoring with it yields
/// many candidate words, of which the shortest can be chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedMinkwitzChain {
    degree: usize,
    levels: Vec<ExtendedLevel>,
}

impl ExtendedMinkwitzChain {
    /// Creates an untrained chain with the shape of `chain`.
    pub fn new(chain: &StabilizerChain) -> Self {
        let levels = chain
            .levels()
            .iter()
            .map(|level| {
                let mut representatives = Map::default();
                representatives.insert(
                    level.base_point(),
                    BTreeSet::from([GroupElement::identity(chain.degree())]),
                );
                ExtendedLevel::new(level.orbit().to_vec(), representatives)
            })
            .collect();
        Self {
            degree: chain.degree(),
            levels,
        }
    }

    pub(crate) fn from_levels(degree: usize, levels: Vec<ExtendedLevel>) -> Self {
        Self { degree, levels }
    }

    /// The degree of the represented permutations.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The levels from the top down.
    pub fn levels(&self) -> &[ExtendedLevel] {
        &self.levels
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// The representatives on `level` for the coset of `point`.
    pub fn representatives(&self, level: usize, point: Point) -> Option<&OrderedSet<GroupElement>> {
        self.levels.get(level)?.representatives(point)
    }

    /// The best representative on `level` for the coset of `point`.
    pub fn best(&self, level: usize, point: Point) -> Option<&GroupElement> {
        self.levels.get(level)?.best(point)
    }

    /// Returns true if the orbits agree with those of `chain`.
    pub fn fits(&self, chain: &StabilizerChain) -> bool {
        self.degree == chain.degree()
            && self.levels.len() == chain.depth()
            && self
                .levels
                .iter()
                .zip(chain.levels())
                .all(|(ours, theirs)| ours.orbit == theirs.orbit())
    }

    /// Number of cosets without a representative over all levels.
    pub fn missing(&self) -> usize {
        self.levels.iter().map(ExtendedLevel::missing).sum()
    }

    /// Returns true if every coset has a representative.
    pub fn is_complete(&self) -> bool {
        self.missing() == 0
    }

    /// Total number of stored representatives.
    pub fn size(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|level| level.representatives.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Average word length over all stored representatives apart from the identities at the
    /// base points.
    pub fn average_word_length(&self) -> f64 {
        let (count, letters) = self
            .levels
            .iter()
            .flat_map(|level| {
                level
                    .representatives
                    .iter()
                    .filter(move |(p, _)| **p != level.base_point())
                    .flat_map(|(_, set)| set.iter())
            })
            .fold((0usize, 0usize), |(count, letters), rep| {
                (count + 1, letters + rep.word_len())
            });
        if count == 0 {
            0.0
        } else {
            letters as f64 / count as f64
        }
    }

    /// Rewrites the words of all representatives with `rules`. Representatives that end up
    /// longer than others of their coset are dropped.
    pub fn apply_rules(&mut self, rules: &RuleSet) {
        for level in &mut self.levels {
            for set in level.representatives.values_mut() {
                let mut simplified = BTreeSet::new();
                for mut rep in std::mem::take(set) {
                    rep.simplify(rules);
                    simplified.insert(rep);
                }
                if let Some(shortest) = simplified.first().map(GroupElement::word_len) {
                    simplified.retain(|rep| rep.word_len() == shortest);
                }
                *set = simplified;
            }
        }
    }

    /// Offers the elements to the first level they move, without exploring stabilizer candidates.
    /// This fills the chain cheaply with the short words at the start of the enumeration. Returns
    /// the number of elements that were added.
    pub fn pre_train<I: IntoIterator<Item = GroupElement>>(&mut self, elements: I) -> usize {
        let mut added = 0;
        for element in elements {
            if self.pre_train_element(element) {
                added += 1;
            }
        }
        debug!("pre-training added {added} representatives");
        added
    }

    fn pre_train_element(&mut self, element: GroupElement) -> bool {
        for level in &mut self.levels {
            let omega = level.base_point();
            let gamma = element.permutation().action(omega);
            if gamma != omega {
                return level.add(gamma, element);
            }
        }
        false
    }

    /// Offers `element` to the chain, exploring up to the context's branching of alternative
    /// representatives per coset. Returns the deepest orbit point whose representatives changed.
    pub fn train(&mut self, element: GroupElement, context: &mut TrainingContext<'_>) -> Option<Point> {
        let branching = context.branching;
        self.train_level(0, element, branching, context)
    }

    fn train_level(
        &mut self,
        level: usize,
        g: GroupElement,
        branching: usize,
        context: &mut TrainingContext<'_>,
    ) -> Option<Point> {
        let branching = branching.max(1);
        let node = self.levels.get_mut(level)?;
        let omega = node.base_point();
        let gamma = g.permutation().action(omega);
        if gamma == omega {
            return self.train_level(level + 1, g, branching - 1, context);
        }

        let Some(best) = node.best(gamma).map(GroupElement::word_len) else {
            trace!("level {level}: installing representative for {gamma}");
            node.add(gamma, g);
            return Some(gamma);
        };
        let reps = &node.representatives[&gamma];
        let positions = sample_positions(context.rng, reps.len(), branching);
        let sampled: Vec<GroupElement> = reps
            .iter()
            .enumerate()
            .filter(|(i, _)| positions.binary_search(i).is_ok())
            .map(|(_, rep)| rep.clone())
            .collect();

        if best > g.word_len() {
            debug!(
                "level {level}: shortening representatives for {gamma} from {best} to {}",
                g.word_len()
            );
            for rep in &sampled {
                for candidate in context.policy.candidates(context.rng) {
                    let element = candidate.build(&g, rep, context.rules);
                    self.train_level(level + 1, element, branching - 1, context);
                }
            }
            self.levels[level].add(gamma, g);
            Some(gamma)
        } else {
            let mut result = None;
            for rep in &sampled {
                for candidate in context.policy.candidates(context.rng) {
                    let element = candidate.build(&g, rep, context.rules);
                    result = result.max(self.train_level(level + 1, element, branching, context));
                }
            }
            if self.levels[level].add(gamma, g) {
                trace!("level {level}: another representative for {gamma}");
            }
            result
        }
    }

    /// Checks that every representative replays to its permutation, maps the base point of its
    /// level to its orbit point and that all representatives of a coset have the same length.
    pub fn is_consistent(&self, alphabet: &Alphabet) -> bool {
        self.levels.iter().all(|level| {
            level.representatives.iter().all(|(&point, set)| {
                let shortest = set.first().map_or(0, GroupElement::word_len);
                set.iter().all(|rep| {
                    rep.word_len() == shortest
                        && rep.permutation().action(level.base_point()) == point
                        && rep.is_consistent(alphabet)
                })
            })
        })
    }
}

impl Trainable for ExtendedMinkwitzChain {
    fn train_element(&mut self, element: GroupElement, context: &mut TrainingContext<'_>) -> Option<Point> {
        self.train(element, context)
    }

    fn missing(&self) -> usize {
        ExtendedMinkwitzChain::missing(self)
    }

    fn average_word_length(&self) -> f64 {
        ExtendedMinkwitzChain::average_word_length(self)
    }
}
