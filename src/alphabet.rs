use itertools::Itertools;
use thiserror::Error;

use crate::{
    algebra::{ParseError, Permutation},
    math::Bijection,
    word::Word,
};

/// A letter of a word over the generators of a group. It refers to a generator by its index and
/// additionally records whether the generator or its inverse is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(u8, bool);

impl Letter {
    /// The letter standing for the generator with the given index.
    pub fn forward(generator: usize) -> Self {
        Self(generator as u8, false)
    }

    /// The letter standing for the inverse of the generator with the given index.
    pub fn inverted(generator: usize) -> Self {
        Self(generator as u8, true)
    }

    /// Index of the underlying generator.
    pub fn generator(&self) -> usize {
        self.0 as usize
    }

    /// Returns true if this letter stands for an inverse generator.
    pub fn is_inverted(&self) -> bool {
        self.1
    }

    /// The letter of the inverse element.
    pub fn inverse(&self) -> Self {
        Self(self.0, !self.1)
    }
}

/// A generator of a permutation group together with its inverse and the two printable symbols
/// used for them in words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    symbol: char,
    inverse_symbol: char,
    permutation: Permutation,
    inverse: Permutation,
}

impl Generator {
    /// The symbol of the generator itself.
    pub fn symbol(&self) -> char {
        self.symbol
    }
    /// The symbol of the inverse generator.
    pub fn inverse_symbol(&self) -> char {
        self.inverse_symbol
    }
    /// The generating permutation.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }
    /// The inverse of the generating permutation.
    pub fn inverse(&self) -> &Permutation {
        &self.inverse
    }
}

/// Errors that can occur when setting up an [`Alphabet`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum AlphabetError {
    #[error("symbol `{0}` is used more than once")]
    DuplicateSymbol(char),
    #[error("symbol `{0}` has no case counterpart that could denote its inverse")]
    NoInverseSymbol(char),
    #[error("at most 256 generators are supported, got {0}")]
    TooManyGenerators(usize),
}

/// Toggles the case of a symbol, returns `None` if the symbol has no single character
/// counterpart in the other case.
pub fn toggle_case(symbol: char) -> Option<char> {
    let mut toggled = if symbol.is_lowercase() {
        symbol.to_uppercase().collect_vec()
    } else if symbol.is_uppercase() {
        symbol.to_lowercase().collect_vec()
    } else {
        return None;
    };
    match toggled.len() {
        1 => toggled.pop(),
        _ => None,
    }
}

/// The generators of a group together with the symbols naming them and their inverses. Words
/// are sequences of [`Letter`]s, the alphabet translates between those and strings.
#[derive(Debug, Clone)]
pub struct Alphabet {
    generators: Vec<Generator>,
    symbols: Bijection<char, Letter>,
}

impl Alphabet {
    /// Creates an alphabet in which the inverse of a generator is denoted by its symbol with the
    /// case toggled, so `a` has inverse `A` and `T` has inverse `t`.
    pub fn new<I>(generators: I) -> Result<Self, AlphabetError>
    where
        I: IntoIterator<Item = (char, Permutation)>,
    {
        let generators: Vec<_> = generators
            .into_iter()
            .map(|(symbol, permutation)| {
                toggle_case(symbol)
                    .map(|inverse| (symbol, inverse, permutation))
                    .ok_or(AlphabetError::NoInverseSymbol(symbol))
            })
            .collect::<Result<_, _>>()?;
        Self::with_inverse_symbols(generators)
    }

    /// Creates an alphabet where the symbol for each inverse is given explicitly.
    pub fn with_inverse_symbols<I>(generators: I) -> Result<Self, AlphabetError>
    where
        I: IntoIterator<Item = (char, char, Permutation)>,
    {
        let mut symbols = Bijection::new();
        let mut out = vec![];
        for (index, (symbol, inverse_symbol, permutation)) in generators.into_iter().enumerate() {
            if index > u8::MAX as usize {
                return Err(AlphabetError::TooManyGenerators(index + 1));
            }
            for (sym, letter) in [
                (symbol, Letter::forward(index)),
                (inverse_symbol, Letter::inverted(index)),
            ] {
                if symbols.insert_no_overwrite(sym, letter).is_err() {
                    return Err(AlphabetError::DuplicateSymbol(sym));
                }
            }
            let inverse = permutation.inverse();
            out.push(Generator {
                symbol,
                inverse_symbol,
                permutation,
                inverse,
            });
        }
        Ok(Self {
            generators: out,
            symbols,
        })
    }

    /// The number of generators, inverses are not counted separately.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns true if there are no generators.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// The generators in the order in which they were given.
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// All letters, first the generators in order and then their inverses in the same order.
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        (0..self.len())
            .map(Letter::forward)
            .chain((0..self.len()).map(Letter::inverted))
    }

    /// The permutation a letter stands for.
    pub fn permutation(&self, letter: Letter) -> &Permutation {
        let generator = &self.generators[letter.generator()];
        if letter.is_inverted() {
            &generator.inverse
        } else {
            &generator.permutation
        }
    }

    /// The printable symbol of a letter.
    pub fn symbol(&self, letter: Letter) -> char {
        let generator = &self.generators[letter.generator()];
        if letter.is_inverted() {
            generator.inverse_symbol
        } else {
            generator.symbol
        }
    }

    /// Looks up the letter that is printed as `symbol`.
    pub fn letter(&self, symbol: char) -> Option<Letter> {
        self.symbols.get_by_left(&symbol).copied()
    }

    /// Parses a string of symbols into a word, whitespace is ignored.
    pub fn parse_word(&self, input: &str) -> Result<Word, ParseError> {
        input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| self.letter(c).ok_or(ParseError::UnknownSymbol(c)))
            .collect()
    }

    /// Renders a word as a string of symbols.
    pub fn render(&self, word: &Word) -> String {
        word.iter().map(|&l| self.symbol(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet() -> Alphabet {
        Alphabet::new([
            ('a', "(0 1 2 3 4)".parse().unwrap()),
            ('b', "(3 4)".parse().unwrap()),
        ])
        .unwrap()
    }

    #[test]
    fn letters_and_symbols() {
        let alphabet = alphabet();
        let symbols: String = alphabet.letters().map(|l| alphabet.symbol(l)).collect();
        assert_eq!(symbols, "abAB");
        assert_eq!(alphabet.letter('A'), Some(Letter::inverted(0)));
        assert_eq!(
            alphabet.permutation(Letter::inverted(0)),
            &alphabet.permutation(Letter::forward(0)).inverse()
        );
    }

    #[test]
    fn word_round_trip() {
        let alphabet = alphabet();
        let word = alphabet.parse_word("abBA a").unwrap();
        assert_eq!(word.len(), 5);
        assert_eq!(alphabet.render(&word), "abBAa");
        assert_eq!(
            alphabet.parse_word("abc"),
            Err(ParseError::UnknownSymbol('c'))
        );
    }

    #[test]
    fn invalid_symbols() {
        let p: Permutation = "(0 1)".parse().unwrap();
        assert_eq!(
            Alphabet::new([('1', p.clone())]).unwrap_err(),
            AlphabetError::NoInverseSymbol('1')
        );
        assert_eq!(
            Alphabet::new([('a', p.clone()), ('A', p)]).unwrap_err(),
            AlphabetError::DuplicateSymbol('A')
        );
        assert_eq!(toggle_case('T'), Some('t'));
        assert_eq!(toggle_case('ß'), None);
    }
}
