use tracing::{debug, trace};

use crate::{
    algebra::Point,
    alphabet::Alphabet,
    element::GroupElement,
    math::Map,
    simplify::RuleSet,
    stabilizer::StabilizerChain,
};

mod extended;
pub use extended::{ExtendedLevel, ExtendedMinkwitzChain};

mod training;
pub use training::{Candidate, CandidatePolicy, Session, Trainable, TrainingContext, TrainingReport};

/// One level of a [`MinkwitzChain`], it has the same orbit as the corresponding level of the
/// stabilizer chain but stores the shortest known word for every coset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinkwitzLevel {
    orbit: Vec<Point>,
    representatives: Map<Point, GroupElement>,
}

impl MinkwitzLevel {
    pub(crate) fn new(orbit: Vec<Point>, representatives: Map<Point, GroupElement>) -> Self {
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

    /// The representative of the coset in which the base point is mapped to `point`.
    pub fn representative(&self, point: Point) -> Option<&GroupElement> {
        self.representatives.get(&point)
    }

    /// Orbit points together with their representative, in orbit order.
    pub fn entries(&self) -> impl Iterator<Item = (Point, Option<&GroupElement>)> + '_ {
        self.orbit.iter().map(|p| (*p, self.representatives.get(p)))
    }

    /// Number of orbit points without a representative.
    pub fn missing(&self) -> usize {
        self.orbit
            .iter()
            .filter(|p| !self.representatives.contains_key(p))
            .count()
    }
}

/// A chain of coset representatives with short words, shaped like a [`StabilizerChain`].
///
/// Representatives start out missing, except for the identity at every base point, and are
/// filled in and improved by training with group elements. A complete chain factors every group
/// element: it is the product of one representative per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinkwitzChain {
    degree: usize,
    levels: Vec<MinkwitzLevel>,
}

impl MinkwitzChain {
    /// Creates an untrained chain with the shape of `chain`.
    pub fn new(chain: &StabilizerChain) -> Self {
        let levels = chain
            .levels()
            .iter()
            .map(|level| {
                let mut representatives = Map::default();
                representatives.insert(
                    level.base_point(),
                    GroupElement::identity(chain.degree()),
                );
                MinkwitzLevel::new(level.orbit().to_vec(), representatives)
            })
            .collect();
        Self {
            degree: chain.degree(),
            levels,
        }
    }

    pub(crate) fn from_levels(degree: usize, levels: Vec<MinkwitzLevel>) -> Self {
        Self { degree, levels }
    }

    /// The degree of the represented permutations.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The levels from the top down.
    pub fn levels(&self) -> &[MinkwitzLevel] {
        &self.levels
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// The representative on `level` for the coset of `point`.
    pub fn representative(&self, level: usize, point: Point) -> Option<&GroupElement> {
        self.levels.get(level)?.representative(point)
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
        self.levels.iter().map(MinkwitzLevel::missing).sum()
    }

    /// Returns true if every coset has a representative.
    pub fn is_complete(&self) -> bool {
        self.missing() == 0
    }

    /// Average word length over all installed representatives apart from the identities at the
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
            })
            .fold((0usize, 0usize), |(count, letters), (_, rep)| {
                (count + 1, letters + rep.word_len())
            });
        if count == 0 {
            0.0
        } else {
            letters as f64 / count as f64
        }
    }

    /// Rewrites the words of all representatives with `rules`.
    pub fn apply_rules(&mut self, rules: &RuleSet) {
        for level in &mut self.levels {
            for rep in level.representatives.values_mut() {
                rep.simplify(rules);
            }
        }
    }

    /// Offers `element` to the chain. Returns the deepest orbit point whose representative was
    /// installed or replaced, if any.
    pub fn train(&mut self, element: GroupElement, rules: &RuleSet) -> Option<Point> {
        self.train_level(0, element, rules)
    }

    fn train_level(&mut self, level: usize, g: GroupElement, rules: &RuleSet) -> Option<Point> {
        let node = self.levels.get_mut(level)?;
        let omega = node.base_point();
        let gamma = g.permutation().action(omega);
        if gamma == omega {
            return self.train_level(level + 1, g, rules);
        }

        match node.representatives.get(&gamma).map(GroupElement::word_len) {
            None => {
                trace!("level {level}: installing representative for {gamma}");
                node.representatives.insert(gamma, g);
                Some(gamma)
            }
            Some(current) if current > g.word_len() => {
                debug!(
                    "level {level}: shortening representative for {gamma} from {current} to {}",
                    g.word_len()
                );
                node.representatives.insert(gamma, g);
                Some(gamma)
            }
            Some(_) => {
                let rep = node.representatives[&gamma].clone();
                let left = Candidate::Left.build(&g, &rep, rules);
                let right = Candidate::Right.build(&g, &rep, rules);
                let first = self.train_level(level + 1, left, rules);
                let second = self.train_level(level + 1, right, rules);
                first.max(second)
            }
        }
    }

    /// Checks that every representative replays to its permutation and maps the base point of
    /// its level to its orbit point.
    pub fn is_consistent(&self, alphabet: &Alphabet) -> bool {
        self.levels.iter().all(|level| {
            level.representatives.iter().all(|(&point, rep)| {
                rep.permutation().action(level.base_point()) == point
                    && rep.is_consistent(alphabet)
            })
        })
    }
}

impl Trainable for MinkwitzChain {
    fn train_element(&mut self, element: GroupElement, context: &mut TrainingContext<'_>) -> Option<Point> {
        self.train(element, context.rules)
    }

    fn missing(&self) -> usize {
        MinkwitzChain::missing(self)
    }

    fn average_word_length(&self) -> f64 {
        MinkwitzChain::average_word_length(self)
    }
}
