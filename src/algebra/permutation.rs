use std::{fmt::Display, ops::Mul, str::FromStr};

use itertools::Itertools;

use super::{parse_cycles, Cycle, DimensionMismatch, ParseError, Point, MAX_DEGREE};

/// A bijection on the ground set `{0, ..., degree - 1}`, stored as its table of images.
///
/// Products are read from left to right: in `a * b` the permutation `a` is applied first, so
/// `(a * b).action(p) == b.action(a.action(p))`. The textual form is cycle notation, see
/// [`Permutation::cycles`] for the canonical ordering.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permutation {
    images: Vec<Point>,
}

impl Permutation {
    /// The identity on `degree` points.
    pub fn identity(degree: usize) -> Self {
        debug_assert!(degree <= MAX_DEGREE);
        Self {
            images: (0..degree).map(|p| p as Point).collect(),
        }
    }

    /// Builds a permutation from its image table, which has to be a bijection.
    pub fn from_images(images: Vec<Point>) -> Result<Self, ParseError> {
        if images.len() > MAX_DEGREE {
            return Err(ParseError::PointOutOfRange(images.len() as u64));
        }
        let mut hit = vec![false; images.len()];
        for &image in &images {
            match hit.get_mut(image as usize) {
                None => return Err(ParseError::PointOutOfRange(image as u64)),
                Some(true) => return Err(ParseError::RepeatedPoint(image)),
                Some(flag) => *flag = true,
            }
        }
        Ok(Self { images })
    }

    /// Builds a permutation from disjoint cycles. The degree is one more than the largest point
    /// that is mentioned, which is why a trailing singleton such as `(48)` may be used to fix the
    /// degree.
    pub fn from_cycles<'a, I: IntoIterator<Item = &'a Cycle>>(cycles: I) -> Result<Self, ParseError> {
        let cycles = cycles.into_iter().collect_vec();
        let degree = cycles
            .iter()
            .filter_map(|c| c.max_point())
            .max()
            .map(|p| p as usize + 1)
            .unwrap_or(0);
        Self::from_cycles_with_degree(degree, cycles)
    }

    /// Like [`Permutation::from_cycles`] but with an explicit degree, which must cover every point.
    pub fn from_cycles_with_degree<'a, I: IntoIterator<Item = &'a Cycle>>(
        degree: usize,
        cycles: I,
    ) -> Result<Self, ParseError> {
        let mut images = Self::identity(degree).images;
        let mut touched = vec![false; degree];
        for cycle in cycles {
            for &p in cycle.points() {
                match touched.get_mut(p as usize) {
                    None => return Err(ParseError::PointOutOfRange(p as u64)),
                    Some(true) => return Err(ParseError::RepeatedPoint(p)),
                    Some(flag) => *flag = true,
                }
                if let Some(image) = cycle.image(p) {
                    images[p as usize] = image;
                }
            }
        }
        Ok(Self { images })
    }

    /// The number of points the permutation acts on.
    pub fn degree(&self) -> usize {
        self.images.len()
    }

    /// The image table, position `i` holds the image of point `i`.
    pub fn images(&self) -> &[Point] {
        &self.images
    }

    /// Applies the permutation to a point. Points outside of the ground set are fixed.
    pub fn action(&self, point: Point) -> Point {
        self.images.get(point as usize).copied().unwrap_or(point)
    }

    /// Returns true if every point is fixed.
    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(i, &p)| i == p as usize)
    }

    /// Iterates over all points that are not fixed, in increasing order.
    pub fn moved_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.images
            .iter()
            .enumerate()
            .filter(|&(i, &p)| i != p as usize)
            .map(|(i, _)| i as Point)
    }

    /// Checked composition, `self` is applied first.
    pub fn multiply(&self, other: &Permutation) -> Result<Permutation, DimensionMismatch> {
        if self.degree() != other.degree() {
            return Err(DimensionMismatch {
                left: self.degree(),
                right: other.degree(),
            });
        }
        Ok(Self {
            images: self
                .images
                .iter()
                .map(|&p| other.images[p as usize])
                .collect(),
        })
    }

    /// The inverse permutation.
    pub fn inverse(&self) -> Self {
        let mut images = vec![0; self.degree()];
        for (i, &p) in self.images.iter().enumerate() {
            images[p as usize] = i as Point;
        }
        Self { images }
    }

    /// Embeds the permutation into a larger ground set, new points are fixed. Returns a copy if
    /// `degree` does not exceed the current degree.
    pub fn extend(&self, degree: usize) -> Self {
        let mut images = self.images.clone();
        images.extend((self.degree()..degree.min(MAX_DEGREE)).map(|p| p as Point));
        Self { images }
    }

    /// The same permutation on a ground set of `degree` points. Growing fixes the new points,
    /// shrinking is only possible if every dropped point is fixed, otherwise `None` is returned.
    pub fn resize(&self, degree: usize) -> Option<Self> {
        if degree >= self.degree() {
            return Some(self.extend(degree));
        }
        if self.moved_points().any(|p| p as usize >= degree) {
            return None;
        }
        Some(Self {
            images: self.images[..degree].to_vec(),
        })
    }

    /// The non-trivial cycles in canonical order: every cycle starts with its least point and the
    /// cycles are sorted by their least point.
    pub fn cycles(&self) -> Vec<Cycle> {
        let mut visited = vec![false; self.degree()];
        let mut cycles = vec![];
        for start in 0..self.degree() {
            if visited[start] {
                continue;
            }
            let mut points = vec![];
            let mut current = start;
            while !visited[current] {
                visited[current] = true;
                points.push(current as Point);
                current = self.images[current] as usize;
            }
            if points.len() > 1 {
                cycles.push(Cycle::from_distinct(points));
            }
        }
        cycles
    }

    /// The sign is `-1` raised to the sum of `length - 1` over all cycles.
    pub fn sign(&self) -> i8 {
        let exponent: usize = self.cycles().iter().map(|c| c.len() - 1).sum();
        if exponent % 2 == 0 {
            1
        } else {
            -1
        }
    }

    /// The order of the permutation as a group element.
    pub fn order(&self) -> usize {
        crate::math::lcm(self.cycles().iter().map(Cycle::len))
    }
}

impl Display for Permutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.degree() == 0 {
            return write!(f, "()");
        }
        for cycle in self.cycles() {
            write!(f, "{cycle}")?;
        }
        let last = self.degree() - 1;
        if self.images[last] as usize == last {
            write!(f, "({last})")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Permutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Permutation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_cycles(&parse_cycles(s)?)
    }
}

impl Mul<&Permutation> for &Permutation {
    type Output = Permutation;

    /// Composes two permutations, the left one is applied first.
    ///
    /// # Panics
    /// If the degrees differ, use [`Permutation::multiply`] for a checked variant.
    fn mul(self, rhs: &Permutation) -> Permutation {
        assert_eq!(
            self.degree(),
            rhs.degree(),
            "cannot compose permutations of different degree"
        );
        Permutation {
            images: self
                .images
                .iter()
                .map(|&p| rhs.images[p as usize])
                .collect(),
        }
    }
}

impl Mul<&Permutation> for Permutation {
    type Output = Permutation;

    fn mul(self, rhs: &Permutation) -> Permutation {
        &self * rhs
    }
}
