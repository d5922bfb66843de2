use std::{fmt::Display, str::FromStr};

use itertools::Itertools;

use super::{parse_point_list, Cycle, ParseError, Permutation, Point};

/// An ordered sequence of points. For a base of a group, the sequence of images under a group
/// element determines that element uniquely, which makes the image a cheap fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Base(Vec<Point>);

impl Base {
    /// Creates a base from the given points.
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// The natural ordering `0, 1, ..., degree - 1` of the whole ground set, which is a base of
    /// every group of that degree.
    pub fn full(degree: usize) -> Self {
        Self((0..degree).map(|p| p as Point).collect())
    }

    /// The points in order.
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the base has no points, which is only the case for the trivial group.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Maps every point through `permutation`. Acting with `a` and then with `b` gives the same
    /// as acting with the product `a * b`.
    pub fn action(&self, permutation: &Permutation) -> Base {
        Self(self.0.iter().map(|&p| permutation.action(p)).collect())
    }

    /// Maps every point through a single cycle.
    pub fn action_cycle(&self, cycle: &Cycle) -> Base {
        Self(
            self.0
                .iter()
                .map(|&p| cycle.image(p).unwrap_or(p))
                .collect(),
        )
    }
}

impl Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

impl FromStr for Base {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_point_list(s).map(Self)
    }
}

impl From<Vec<Point>> for Base {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(s: &str) -> Permutation {
        s.parse().unwrap()
    }

    #[test]
    fn action_of_a_single_cycle() {
        let base: Base = "[1,2,3,4,7,8]".parse().unwrap();
        assert_eq!(
            base.action(&perm("(1 3 7)(2)")),
            Base::new(vec![3, 2, 7, 4, 1, 8])
        );
        assert_eq!(
            base.action_cycle(&"(1 3 7)".parse().unwrap()),
            Base::new(vec![3, 2, 7, 4, 1, 8])
        );
    }

    #[test]
    fn action_is_compatible_with_products() {
        let base: Base = "[1, 2, 3, 4, 7, 8]".parse().unwrap();
        let a = perm("(1 3 7 8)(9)");
        let b = perm("(9 2 4)(1 5 3)");

        let first = base.action(&a);
        assert_eq!(first, Base::new(vec![3, 2, 7, 4, 8, 1]));
        let second = first.action(&b);
        assert_eq!(second, Base::new(vec![1, 4, 7, 9, 8, 5]));
        assert_eq!(base.action(&(&a * &b)), second);
        assert_eq!(second.action(&(&a * &b).inverse()), base);
    }

    #[test]
    fn text_form() {
        let base = Base::full(4);
        assert_eq!(base.to_string(), "[0, 1, 2, 3]");
        assert_eq!(base.to_string().parse::<Base>(), Ok(base));
        assert!("[0, 1".parse::<Base>().is_err());
    }
}
