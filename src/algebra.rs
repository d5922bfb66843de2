use thiserror::Error;

mod base;
pub use base::Base;

mod cycle;
pub use cycle::Cycle;

mod permutation;
pub use permutation::Permutation;

/// A point of the ground set. Points are stored in a single byte, so a ground set has at most
/// [`MAX_DEGREE`] elements.
pub type Point = u8;

/// The largest degree a permutation can have, points range over `0..MAX_DEGREE`.
pub const MAX_DEGREE: usize = 255;

/// Errors that can occur when parsing cycles, permutations, point lists or words.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,
    #[error("expected `{expected}` at position {position}")]
    Expected { expected: char, position: usize },
    #[error("unexpected `{found}` at position {position}")]
    Unexpected { found: char, position: usize },
    #[error("`{0}` is not a point")]
    InvalidPoint(String),
    #[error("point {0} is out of range, points must be below 255")]
    PointOutOfRange(u64),
    #[error("point {0} occurs more than once")]
    RepeatedPoint(Point),
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(char),
}

/// Raised when two permutations of different degree are combined.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("cannot combine permutations of degree {left} and {right}")]
pub struct DimensionMismatch {
    /// Degree of the left operand.
    pub left: usize,
    /// Degree of the right operand.
    pub right: usize,
}

/// Parses a single point, rejecting anything that does not fit into a [`Point`].
pub fn parse_point(token: &str) -> Result<Point, ParseError> {
    let value: u64 = token
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidPoint(token.trim().to_string()))?;
    if value >= MAX_DEGREE as u64 {
        return Err(ParseError::PointOutOfRange(value));
    }
    Ok(value as Point)
}

/// Parses a bracketed, comma separated list of points such as `[1, 2, 3]` or `[]`.
pub fn parse_point_list(input: &str) -> Result<Vec<Point>, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let inner = trimmed
        .strip_prefix('[')
        .ok_or(ParseError::Expected {
            expected: '[',
            position: 0,
        })?
        .strip_suffix(']')
        .ok_or(ParseError::Expected {
            expected: ']',
            position: trimmed.len(),
        })?;
    if inner.trim().is_empty() {
        return Ok(vec![]);
    }
    inner.split(',').map(parse_point).collect()
}

/// Scans cycle notation such as `(1 3 7)(2)` into its cycles. Cycles may be separated by
/// whitespace, points within a cycle by whitespace or commas.
pub(crate) fn parse_cycles(input: &str) -> Result<Vec<Cycle>, ParseError> {
    let mut cycles = vec![];
    let mut chars = input.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some((_, '(')) => {}
            Some((position, found)) => return Err(ParseError::Unexpected { found, position }),
        }

        let mut points = vec![];
        let mut token = String::new();
        loop {
            match chars.next() {
                None => {
                    return Err(ParseError::Expected {
                        expected: ')',
                        position: input.len(),
                    })
                }
                Some((_, ')')) => {
                    if !token.is_empty() {
                        points.push(parse_point(&token)?);
                    }
                    break;
                }
                Some((_, c)) if c.is_whitespace() || c == ',' => {
                    if !token.is_empty() {
                        points.push(parse_point(&token)?);
                        token.clear();
                    }
                }
                Some((position, '(')) => {
                    return Err(ParseError::Unexpected {
                        found: '(',
                        position,
                    })
                }
                Some((_, c)) => token.push(c),
            }
        }
        cycles.push(Cycle::new(points)?);
    }

    if cycles.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(cycles)
}
