use std::{cmp::Ordering, ops::Mul};

use crate::{
    algebra::Permutation,
    alphabet::{Alphabet, Letter},
    simplify::RuleSet,
    word::Word,
};

/// A permutation together with a word over the generators whose product is that permutation.
///
/// Elements are ordered by the length of their word first, then by the word itself and finally by
/// the permutation, so the first element of an ordered collection is one with a shortest word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupElement {
    permutation: Permutation,
    word: Word,
}

impl GroupElement {
    /// Pairs a permutation with a word. The caller guarantees that the word replays to the
    /// permutation.
    pub fn new(permutation: Permutation, word: Word) -> Self {
        Self { permutation, word }
    }

    /// The identity of the given degree, represented by the empty word.
    pub fn identity(degree: usize) -> Self {
        Self::new(Permutation::identity(degree), Word::empty())
    }

    /// The element consisting of a single letter.
    pub fn letter(alphabet: &Alphabet, letter: Letter) -> Self {
        Self::new(alphabet.permutation(letter).clone(), Word::new(vec![letter]))
    }

    /// Replays `word` letter by letter from the identity.
    pub fn from_word(alphabet: &Alphabet, degree: usize, word: Word) -> Self {
        let mut permutation = Permutation::identity(degree);
        for &letter in &word {
            permutation = permutation * alphabet.permutation(letter);
        }
        Self { permutation, word }
    }

    /// The permutation.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// The word.
    pub fn word(&self) -> &Word {
        &self.word
    }

    /// Length of the word.
    pub fn word_len(&self) -> usize {
        self.word.len()
    }

    /// Splits the element into permutation and word.
    pub fn into_parts(self) -> (Permutation, Word) {
        (self.permutation, self.word)
    }

    /// Right multiplication by a single letter.
    pub fn push(&self, alphabet: &Alphabet, letter: Letter) -> Self {
        let mut word = self.word.clone();
        word.push(letter);
        Self::new(&self.permutation * alphabet.permutation(letter), word)
    }

    /// The inverse element: the word is reversed with all letters inverted.
    pub fn inverse(&self) -> Self {
        Self::new(self.permutation.inverse(), self.word.inverse())
    }

    /// Multiplies and rewrites the word of the product with `rules`.
    pub fn multiply_simplified(&self, other: &GroupElement, rules: &RuleSet) -> Self {
        let mut product = self * other;
        product.simplify(rules);
        product
    }

    /// Rewrites the word with `rules`, returning the number of passes that were needed.
    pub fn simplify(&mut self, rules: &RuleSet) -> usize {
        rules.simplify(&mut self.word)
    }

    /// Replaces the word by another one for the same permutation.
    pub fn set_word(&mut self, word: Word) {
        self.word = word;
    }

    /// Checks that the word replays to the permutation.
    pub fn is_consistent(&self, alphabet: &Alphabet) -> bool {
        Self::from_word(alphabet, self.permutation.degree(), self.word.clone()).permutation
            == self.permutation
    }
}

impl Mul<&GroupElement> for &GroupElement {
    type Output = GroupElement;

    /// Concatenates the words and composes the permutations, the left factor acts first.
    fn mul(self, rhs: &GroupElement) -> GroupElement {
        GroupElement::new(
            &self.permutation * &rhs.permutation,
            self.word.concat(&rhs.word),
        )
    }
}

impl Ord for GroupElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.word
            .len()
            .cmp(&other.word.len())
            .then_with(|| self.word.cmp(&other.word))
            .then_with(|| self.permutation.cmp(&other.permutation))
    }
}

impl PartialOrd for GroupElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
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
    fn products_keep_words_consistent() {
        let alphabet = alphabet();
        let a = GroupElement::letter(&alphabet, Letter::forward(0));
        let b = GroupElement::letter(&alphabet, Letter::forward(1));
        let ab = &a * &b;
        assert_eq!(alphabet.render(ab.word()), "ab");
        assert!(ab.is_consistent(&alphabet));
        assert_eq!(ab.permutation().action(0), 1);
        assert_eq!(ab.permutation().action(2), 4);

        let inverse = ab.inverse();
        assert_eq!(alphabet.render(inverse.word()), "BA");
        assert!(inverse.is_consistent(&alphabet));
        assert!((&ab * &inverse).permutation().is_identity());
    }

    #[test]
    fn replay_from_word() {
        let alphabet = alphabet();
        let word = alphabet.parse_word("aaaaa").unwrap();
        assert!(GroupElement::from_word(&alphabet, 5, word)
            .permutation()
            .is_identity());
    }

    #[test]
    fn ordering_prefers_short_words() {
        let alphabet = alphabet();
        let a = GroupElement::letter(&alphabet, Letter::forward(0));
        let long = GroupElement::from_word(&alphabet, 5, alphabet.parse_word("AAAA").unwrap());
        assert_eq!(a.permutation(), long.permutation());
        assert!(a < long);
    }
}
