use std::{fmt::Display, str::FromStr};

use itertools::Itertools;

use super::{parse_cycles, ParseError, Point};
use crate::math::Set;

/// A cycle is an ordered sequence of distinct points, each of which is sent to its successor
/// while the last one wraps around to the first. Cycles of length zero or one act trivially.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cycle(Vec<Point>);

impl Cycle {
    /// Creates a cycle, failing if a point occurs more than once.
    pub fn new(points: Vec<Point>) -> Result<Self, ParseError> {
        let mut seen = Set::default();
        for &p in &points {
            if !seen.insert(p) {
                return Err(ParseError::RepeatedPoint(p));
            }
        }
        Ok(Self(points))
    }

    pub(crate) fn from_distinct(points: Vec<Point>) -> Self {
        debug_assert!(points.iter().all_unique());
        Self(points)
    }

    /// Returns the points of the cycle in traversal order.
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// The number of points in the cycle.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the cycle contains no points at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A cycle with fewer than two points does not move anything.
    pub fn is_trivial(&self) -> bool {
        self.0.len() < 2
    }

    /// Returns true if `point` appears in the cycle.
    pub fn contains(&self, point: Point) -> bool {
        self.0.contains(&point)
    }

    /// The largest point mentioned by the cycle.
    pub fn max_point(&self) -> Option<Point> {
        self.0.iter().copied().max()
    }

    /// Applies the cycle to `point`, returning `None` if the point is not part of the cycle.
    pub fn image(&self, point: Point) -> Option<Point> {
        let pos = self.0.iter().position(|&p| p == point)?;
        Some(self.0[(pos + 1) % self.0.len()])
    }

    /// The inverse cycle keeps its first point and traverses the remaining ones backwards.
    /// Cycles of length below three are their own inverse.
    pub fn inverse(&self) -> Self {
        if self.0.len() < 3 {
            return self.clone();
        }
        let mut points = Vec::with_capacity(self.0.len());
        points.push(self.0[0]);
        points.extend(self.0[1..].iter().rev());
        Self(points)
    }

    /// Rotates the cycle such that it starts with its least point.
    pub fn canonical(&self) -> Self {
        match self.0.iter().position_min() {
            Some(pos) => {
                let mut points = self.0.clone();
                points.rotate_left(pos);
                Self(points)
            }
            None => self.clone(),
        }
    }
}

impl Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.0.iter().join(" "))
    }
}

impl FromStr for Cycle {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cycles = parse_cycles(s)?;
        match cycles.len() {
            1 => Ok(cycles.remove(0)),
            _ => Err(ParseError::Unexpected {
                found: '(',
                position: s.find(")(").map(|p| p + 1).unwrap_or(0),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_reverses_tail() {
        let c: Cycle = "(1 3 7 8)".parse().unwrap();
        assert_eq!(c.inverse().points(), &[1, 8, 7, 3]);
        assert_eq!(c.inverse().inverse(), c);

        let t: Cycle = "(4 9)".parse().unwrap();
        assert_eq!(t.inverse(), t);
    }

    #[test]
    fn image_wraps_around() {
        let c: Cycle = "(1 3 7)".parse().unwrap();
        assert_eq!(c.image(1), Some(3));
        assert_eq!(c.image(7), Some(1));
        assert_eq!(c.image(2), None);
        assert!("(5)".parse::<Cycle>().unwrap().is_trivial());
    }

    #[test]
    fn rejects_repetitions_and_multiple_cycles() {
        assert_eq!(
            "(1 2 1)".parse::<Cycle>(),
            Err(ParseError::RepeatedPoint(1))
        );
        assert!("(1 2)(3 4)".parse::<Cycle>().is_err());
    }

    #[test]
    fn canonical_rotation() {
        let c: Cycle = "(7 1 3)".parse().unwrap();
        assert_eq!(c.canonical().to_string(), "(1 3 7)");
    }
}
