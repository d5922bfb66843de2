use std::fmt::Display;

use itertools::Itertools;
use num_bigint::BigUint;
use thiserror::Error;
use tracing::info;

use crate::{
    algebra::{Base, ParseError, Permutation, Point},
    alphabet::{Alphabet, AlphabetError, Letter},
    cayley::CayleyIterator,
    element::GroupElement,
    stabilizer::{BasePreference, StabilizerChain},
    word::{Rewrite, Word},
};

/// Errors that can occur when setting up a [`PermutationGroup`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum GroupError {
    #[error("a group needs at least one generator")]
    NoGenerators,
    #[error(transparent)]
    Alphabet(#[from] AlphabetError),
    #[error("invalid shortcut rule: {0}")]
    Shortcut(#[from] ParseError),
    #[error("only 26 generators can be named automatically, {0} were given")]
    TooManyGenerators(usize),
}

/// Symbols handed out by [`PermutationGroupBuilder::generators`].
const DEFAULT_SYMBOLS: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Collects the definition of a [`PermutationGroup`]: its generators with their symbols,
/// preferences for the choice of base points and shortcut rules for words.
pub struct PermutationGroupBuilder {
    name: String,
    generators: Vec<(char, Permutation)>,
    preferences: Vec<BasePreference>,
    shortcuts: Vec<(String, String)>,
    unnamed: usize,
}

impl PermutationGroupBuilder {
    /// Adds a generator printed as `symbol`, its inverse is printed with the case toggled.
    pub fn generator(mut self, symbol: char, permutation: Permutation) -> Self {
        self.generators.push((symbol, permutation));
        self
    }

    /// Adds generators that are named `a`, `b`, `c`, ... in order. Only the 26 letters of the
    /// alphabet are available, building fails if more generators are added this way.
    pub fn generators<I: IntoIterator<Item = Permutation>>(mut self, permutations: I) -> Self {
        for permutation in permutations {
            match DEFAULT_SYMBOLS.get(self.generators.len()) {
                Some(&symbol) => self.generators.push((symbol, permutation)),
                None => self.unnamed += 1,
            }
        }
        self
    }

    /// Base points are picked among the points accepted by all preferences first.
    pub fn prefer<F>(mut self, preference: F) -> Self
    where
        F: Fn(Point) -> bool + Send + Sync + 'static,
    {
        self.preferences.push(Box::new(preference));
        self
    }

    /// Adds a shortcut rule, given as symbol strings, that is applied when simplifying words of
    /// random elements. Both sides have to denote the same group element.
    pub fn shortcut(mut self, pattern: &str, replacement: &str) -> Self {
        self.shortcuts
            .push((pattern.to_string(), replacement.to_string()));
        self
    }

    /// Builds the group, computing its stabilizer chain. Generators of smaller degree are
    /// extended to the largest degree.
    pub fn build(self) -> Result<PermutationGroup, GroupError> {
        if self.unnamed > 0 {
            return Err(GroupError::TooManyGenerators(
                self.generators.len() + self.unnamed,
            ));
        }
        let degree = self
            .generators
            .iter()
            .map(|(_, p)| p.degree())
            .max()
            .ok_or(GroupError::NoGenerators)?;
        let alphabet = Alphabet::new(
            self.generators
                .into_iter()
                .map(|(symbol, p)| (symbol, p.extend(degree))),
        )?;
        let shortcuts = self
            .shortcuts
            .iter()
            .map(|(pattern, replacement)| {
                Ok(Rewrite::new(
                    alphabet.parse_word(pattern)?,
                    alphabet.parse_word(replacement)?,
                ))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        let chain = StabilizerChain::build(
            degree,
            alphabet.generators().iter().map(|g| g.permutation()),
            &self.preferences,
        );
        info!(
            "built group \"{}\" of degree {degree} and order {}",
            self.name,
            chain.order()
        );
        Ok(PermutationGroup {
            name: self.name,
            degree,
            alphabet,
            shortcuts,
            chain,
        })
    }
}

/// A permutation group given by generators, together with its stabilizer chain. The chain is
/// computed once on construction and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct PermutationGroup {
    name: String,
    degree: usize,
    alphabet: Alphabet,
    shortcuts: Vec<Rewrite>,
    chain: StabilizerChain,
}

impl PermutationGroup {
    /// Starts the definition of a group with the given name, which is also used to name files
    /// that store data for the group.
    pub fn builder<S: Into<String>>(name: S) -> PermutationGroupBuilder {
        PermutationGroupBuilder {
            name: name.into(),
            generators: vec![],
            preferences: vec![],
            shortcuts: vec![],
            unnamed: 0,
        }
    }

    /// Builds a group from named generators without preferences or shortcuts.
    pub fn new<S, I>(name: S, generators: I) -> Result<Self, GroupError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (char, Permutation)>,
    {
        generators
            .into_iter()
            .fold(Self::builder(name), |builder, (symbol, p)| {
                builder.generator(symbol, p)
            })
            .build()
    }

    /// The name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The degree of all elements.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The generators and their symbols.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The shortcut rules.
    pub fn shortcuts(&self) -> &[Rewrite] {
        &self.shortcuts
    }

    /// The stabilizer chain.
    pub fn stabilizer_chain(&self) -> &StabilizerChain {
        &self.chain
    }

    /// The base of the stabilizer chain. Distinct group elements have distinct images of it.
    pub fn base(&self) -> Base {
        self.chain.base()
    }

    /// The number of elements.
    pub fn order(&self) -> BigUint {
        self.chain.order()
    }

    /// Decides whether `permutation` is an element of the group.
    pub fn contains(&self, permutation: &Permutation) -> bool {
        self.chain.contains(permutation)
    }

    /// The identity with the empty word.
    pub fn identity(&self) -> GroupElement {
        GroupElement::identity(self.degree)
    }

    /// The element of a single letter.
    pub fn letter(&self, letter: Letter) -> GroupElement {
        GroupElement::letter(&self.alphabet, letter)
    }

    /// Replays a word from the identity.
    pub fn word_to_element(&self, word: &Word) -> GroupElement {
        GroupElement::from_word(&self.alphabet, self.degree, word.clone())
    }

    /// Parses a string of generator symbols and replays it.
    pub fn parse_element(&self, word: &str) -> Result<GroupElement, ParseError> {
        Ok(self.word_to_element(&self.alphabet.parse_word(word)?))
    }

    /// Cancels inverse pairs and applies the shortcut rules until the word no longer shrinks.
    pub fn simplify_word(&self, word: &Word) -> Word {
        let mut word = word.clone();
        loop {
            let before = word.len();
            word = word.free_reduce();
            for shortcut in &self.shortcuts {
                word = shortcut.apply_exhaustively(&word);
            }
            if word.len() >= before {
                return word;
            }
        }
    }

    /// Multiplies `length` uniformly chosen letters and simplifies the resulting word.
    pub fn random_element(&self, rng: &mut fastrand::Rng, length: usize) -> GroupElement {
        let mut element = self.word_to_element(&crate::random::random_word(
            rng,
            &self.alphabet,
            length,
        ));
        let simplified = self.simplify_word(element.word());
        element.set_word(simplified);
        element
    }

    /// A uniformly distributed element without a word.
    pub fn random_permutation(&self, rng: &mut fastrand::Rng) -> Permutation {
        self.chain.random_element(rng)
    }

    /// Breadth-first enumeration of the Cayley graph, visiting at most `cap` elements.
    pub fn cayley_graph(&self, cap: Option<usize>) -> CayleyIterator<'_> {
        CayleyIterator::new(self, cap)
    }
}

impl Display for PermutationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} of order {}", self.name, self.order())?;
        write!(
            f,
            "{}",
            self.alphabet
                .generators()
                .iter()
                .map(|g| format!("{} = {}", g.symbol(), g.permutation()))
                .join("\n")
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn symmetric_group() -> PermutationGroup {
        PermutationGroup::builder("S5")
            .generators(["(0 1 2 3 4)", "(3 4)"].map(|t| t.parse().unwrap()))
            .build()
            .unwrap()
    }

    pub fn coxeter_b3() -> PermutationGroup {
        PermutationGroup::builder("CoxB3")
            .generators(
                ["(1 5)(2 6)(3 7)(4 8)", "(1 6)(3 8)", "(1 4)(5 8)"].map(|t| t.parse().unwrap()),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn default_symbols() {
        let group = coxeter_b3();
        let symbols: String = group
            .alphabet()
            .letters()
            .map(|l| group.alphabet().symbol(l))
            .collect();
        assert_eq!(symbols, "abcABC");
        assert_eq!(group.degree(), 9);
        assert_eq!(group.order(), BigUint::from(48u32));
    }

    #[test]
    fn generators_are_extended() {
        let group = PermutationGroup::new(
            "mixed",
            [
                ('x', "(0 1)".parse().unwrap()),
                ('y', "(0 1 2 3)".parse().unwrap()),
            ],
        )
        .unwrap();
        assert_eq!(group.degree(), 4);
        assert_eq!(group.order(), BigUint::from(24u32));
        assert_eq!(
            PermutationGroup::builder("empty").build().unwrap_err(),
            GroupError::NoGenerators
        );
    }

    #[test]
    fn default_symbols_run_out() {
        let transpositions =
            |n: usize| (1..=n).map(|i| format!("(0 {i})").parse::<Permutation>().unwrap());
        let group = PermutationGroup::builder("S27")
            .generators(transpositions(26))
            .build()
            .unwrap();
        assert_eq!(group.alphabet().symbol(Letter::forward(25)), 'z');
        assert_eq!(
            PermutationGroup::builder("S28")
                .generators(transpositions(27))
                .build()
                .unwrap_err(),
            GroupError::TooManyGenerators(27)
        );
        assert_eq!(
            PermutationGroup::builder("S201")
                .generators(transpositions(200))
                .build()
                .unwrap_err(),
            GroupError::TooManyGenerators(200)
        );
    }

    #[test_log::test]
    fn membership_of_random_products() {
        let group = coxeter_b3();
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..200 {
            let length = rng.usize(1..=20);
            let element = group.random_element(&mut rng, length);
            assert!(group.contains(element.permutation()));
            assert!(element.is_consistent(group.alphabet()));
        }
        assert!(!group.contains(&"(1 2)".parse().unwrap()));
    }

    #[test]
    fn shortcuts_shorten_words() {
        let group = PermutationGroup::builder("square")
            .generator('T', "(0 1 2 3)".parse().unwrap())
            .shortcut("TTT", "t")
            .shortcut("ttt", "T")
            .build()
            .unwrap();
        let word = group.alphabet().parse_word("TTTTTtT").unwrap();
        let simplified = group.simplify_word(&word);
        assert_eq!(group.alphabet().render(&simplified), "T");
        assert_eq!(
            group.word_to_element(&word).permutation(),
            group.word_to_element(&simplified).permutation()
        );
        assert!(PermutationGroup::builder("bad")
            .generator('T', "(0 1)".parse().unwrap())
            .shortcut("TX", "")
            .build()
            .is_err());
    }
}
