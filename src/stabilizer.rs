use bit_set::BitSet;
use num_bigint::BigUint;
use tracing::{debug, trace};

use crate::{
    algebra::{Base, Permutation, Point},
    math::Map,
};

/// A predicate on points, used to prefer certain points when choosing base points.
pub type BasePreference = Box<dyn Fn(Point) -> bool + Send + Sync>;

/// One level of a [`StabilizerChain`]: the orbit of the level's base point under the level's
/// generators together with a coset representative for every orbit point.
#[derive(Debug, Clone)]
pub struct StabilizerLevel {
    generators: Vec<Permutation>,
    orbit: Vec<Point>,
    in_orbit: BitSet,
    representatives: Map<Point, Permutation>,
}

impl StabilizerLevel {
    fn new(degree: usize, base_point: Point) -> Self {
        let mut level = Self {
            generators: vec![],
            orbit: vec![],
            in_orbit: BitSet::with_capacity(degree),
            representatives: Map::default(),
        };
        level.insert(base_point, Permutation::identity(degree));
        level
    }

    fn insert(&mut self, point: Point, representative: Permutation) {
        self.orbit.push(point);
        self.in_orbit.insert(point as usize);
        self.representatives.insert(point, representative);
    }

    /// The point that is stabilized by all deeper levels.
    pub fn base_point(&self) -> Point {
        self.orbit[0]
    }

    /// The orbit in discovery order, starting with the base point.
    pub fn orbit(&self) -> &[Point] {
        &self.orbit
    }

    /// Returns true if `point` lies in the orbit.
    pub fn contains_point(&self, point: Point) -> bool {
        self.in_orbit.contains(point as usize)
    }

    /// The generators absorbed by this level.
    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    /// The coset representative mapping the base point to `point`.
    pub fn representative(&self, point: Point) -> Option<&Permutation> {
        self.representatives.get(&point)
    }
}

/// A stabilizer chain computed with the Schreier-Sims algorithm.
///
/// The levels are kept in a vector, level `i + 1` describes the pointwise stabilizer of the base
/// points of levels `0..=i`. The trivial group sits implicitly one past the last level. Adding a
/// generator mutates levels strictly from the top down: a level only ever hands Schreier
/// generators to the next one.
#[derive(Debug, Clone)]
pub struct StabilizerChain {
    degree: usize,
    preferred: Vec<Point>,
    levels: Vec<StabilizerLevel>,
}

impl StabilizerChain {
    /// The chain of the trivial group.
    pub fn trivial(degree: usize, preferences: &[BasePreference]) -> Self {
        Self {
            degree,
            preferred: (0..degree)
                .map(|p| p as Point)
                .filter(|&p| preferences.iter().all(|prefer| prefer(p)))
                .collect(),
            levels: vec![],
        }
    }

    /// Builds the chain of the group generated by `generators`, which must all have the given
    /// degree. Base points are chosen among the points accepted by all `preferences` first.
    pub fn build<'a, I>(degree: usize, generators: I, preferences: &[BasePreference]) -> Self
    where
        I: IntoIterator<Item = &'a Permutation>,
    {
        let mut chain = Self::trivial(degree, preferences);
        for generator in generators {
            chain.add_generator(generator.clone());
        }
        debug!(
            "built stabilizer chain with base {} and order {}",
            chain.base(),
            chain.order()
        );
        chain
    }

    /// Extends the group by another generator.
    pub fn add_generator(&mut self, generator: Permutation) {
        debug_assert_eq!(generator.degree(), self.degree);
        self.absorb(0, generator);
    }

    fn absorb(&mut self, level: usize, g: Permutation) {
        if self.contains_from(level, &g) {
            return;
        }

        if level == self.levels.len() {
            let beta = self.base_point(&g);
            trace!("opening level {level} with base point {beta} for {g}");
            let mut node = StabilizerLevel::new(self.degree, beta);
            node.generators.push(g.clone());
            let mut power = g.clone();
            let mut delta = power.action(beta);
            while delta != beta {
                node.insert(delta, power.clone());
                power = power * &g;
                delta = power.action(beta);
            }
            self.levels.push(node);
            if !power.is_identity() {
                self.absorb(level + 1, power);
            }
            return;
        }

        let old_size = self.levels[level].orbit.len();
        for i in 0..old_size {
            let node = &mut self.levels[level];
            let delta = node.orbit[i];
            let gamma = g.action(delta);
            let rep_delta = &node.representatives[&delta];
            if node.contains_point(gamma) {
                let schreier = rep_delta * &g * &node.representatives[&gamma].inverse();
                self.absorb(level + 1, schreier);
            } else {
                let rep = rep_delta * &g;
                node.insert(gamma, rep);
            }
        }

        self.levels[level].generators.push(g);
        let mut i = old_size;
        while i < self.levels[level].orbit.len() {
            let delta = self.levels[level].orbit[i];
            for j in 0..self.levels[level].generators.len() {
                let node = &mut self.levels[level];
                let h = &node.generators[j];
                let gamma = h.action(delta);
                let rep_delta = &node.representatives[&delta];
                if node.contains_point(gamma) {
                    let schreier = rep_delta * h * &node.representatives[&gamma].inverse();
                    self.absorb(level + 1, schreier);
                } else {
                    let rep = rep_delta * h;
                    node.insert(gamma, rep);
                }
            }
            i += 1;
        }
    }

    /// The least preferred point moved by `g`, falling back to the least moved point overall.
    fn base_point(&self, g: &Permutation) -> Point {
        self.preferred
            .iter()
            .copied()
            .find(|&p| g.action(p) != p)
            .or_else(|| g.moved_points().next())
            .unwrap_or(0)
    }

    /// Strips `element` through the levels starting at `level`. Returns the residue and the
    /// index of the level at which stripping stopped, which is one past the last level if it
    /// went all the way through.
    fn strip_from(&self, level: usize, element: &Permutation) -> (Permutation, usize) {
        let mut residue = element.clone();
        for (index, node) in self.levels.iter().enumerate().skip(level) {
            if residue.is_identity() {
                return (residue, index);
            }
            let delta = residue.action(node.base_point());
            match node.representatives.get(&delta) {
                Some(rep) => residue = residue * &rep.inverse(),
                None => return (residue, index),
            }
        }
        (residue, self.levels.len())
    }

    fn contains_from(&self, level: usize, element: &Permutation) -> bool {
        self.strip_from(level, element).0.is_identity()
    }

    /// Strips an element through the whole chain, see [`StabilizerChain::contains`].
    pub fn strip(&self, element: &Permutation) -> (Permutation, usize) {
        self.strip_from(0, element)
    }

    /// Decides membership. Permutations of a different degree are compared on the common points,
    /// any point moved outside of the ground set rules out membership.
    pub fn contains(&self, element: &Permutation) -> bool {
        element
            .resize(self.degree)
            .is_some_and(|element| self.contains_from(0, &element))
    }

    /// The degree of the permutations in the chain.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The levels from the top down.
    pub fn levels(&self) -> &[StabilizerLevel] {
        &self.levels
    }

    /// Number of levels, which equals the length of the base.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// The base points of all levels.
    pub fn base(&self) -> Base {
        Base::new(self.levels.iter().map(StabilizerLevel::base_point).collect())
    }

    /// The group order, the product of all orbit sizes.
    pub fn order(&self) -> BigUint {
        self.levels
            .iter()
            .map(|level| BigUint::from(level.orbit.len()))
            .product()
    }

    /// A uniformly distributed group element, obtained by picking a random coset representative
    /// on every level.
    pub fn random_element(&self, rng: &mut fastrand::Rng) -> Permutation {
        let mut element = Permutation::identity(self.degree);
        for level in self.levels.iter().rev() {
            let point = level.orbit[rng.usize(..level.orbit.len())];
            element = element * &level.representatives[&point];
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn perms(texts: &[&str]) -> Vec<Permutation> {
        texts.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn chain(texts: &[&str]) -> StabilizerChain {
        let generators = perms(texts);
        StabilizerChain::build(generators[0].degree(), &generators, &[])
    }

    #[test_log::test]
    fn symmetric_group_on_five_points() {
        let chain = chain(&["(0 1 2 3 4)", "(3 4)"]);
        assert_eq!(chain.order(), BigUint::from(120u32));
        assert_eq!(chain.base(), Base::new(vec![0, 3, 2, 1]));
        assert_eq!(chain.degree(), 5);
        assert_eq!(
            chain.levels().iter().map(|l| l.orbit().len()).collect_vec(),
            vec![5, 4, 3, 2]
        );
    }

    #[test_log::test]
    fn coxeter_b3() {
        let chain = chain(&["(1 5)(2 6)(3 7)(4 8)", "(1 6)(3 8)", "(1 4)(5 8)"]);
        assert_eq!(chain.order(), BigUint::from(48u32));
        assert_eq!(chain.base(), Base::new(vec![1, 2, 3]));
        assert_eq!(chain.degree(), 9);
        assert!(!chain.contains(&"(1 2)".parse().unwrap()));
    }

    #[test]
    fn representatives_map_base_point_to_orbit_point() {
        let chain = chain(&["(1 5)(2 6)(3 7)(4 8)", "(1 6)(3 8)", "(1 4)(5 8)"]);
        for level in chain.levels() {
            for &point in level.orbit() {
                let rep = level.representative(point).unwrap();
                assert_eq!(rep.action(level.base_point()), point);
            }
        }
    }

    #[test]
    fn alternating_group_excludes_transpositions() {
        let chain = chain(&["(0 1 2)(4)", "(2 3 4)"]);
        assert_eq!(chain.order(), BigUint::from(60u32));
        assert!(!chain.contains(&"(0 1)(4)".parse().unwrap()));
        assert!(chain.contains(&"(0 1)(2 3)".parse().unwrap()));
        assert!(chain.contains(&"(0 1 2)".parse().unwrap()));
    }

    #[test]
    fn trivial_group() {
        let chain = chain(&["(3)"]);
        assert_eq!(chain.order(), BigUint::from(1u32));
        assert!(chain.base().is_empty());
        assert!(chain.contains(&Permutation::identity(4)));
        assert!(!chain.contains(&"(0 1)(3)".parse().unwrap()));
    }

    #[test]
    fn preferences_decide_base_points() {
        let generators = perms(&["(0 1 2 3 4)", "(3 4)"]);
        let odd: BasePreference = Box::new(|p| p % 2 == 1);
        let chain = StabilizerChain::build(5, &generators, &[odd]);
        assert_eq!(chain.base().points()[0], 1);
        assert_eq!(chain.order(), BigUint::from(120u32));
    }

    #[test]
    fn random_elements_are_members() {
        let chain = chain(&["(1 5)(2 6)(3 7)(4 8)", "(1 6)(3 8)", "(1 4)(5 8)"]);
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let element = chain.random_element(&mut rng);
            assert!(chain.contains(&element));
        }
    }
}
