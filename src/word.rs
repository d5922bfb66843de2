use std::ops::{Deref, Mul};

use crate::alphabet::Letter;

/// A finite sequence of [`Letter`]s, read from left to right. Replaying a word means
/// multiplying the permutations of its letters in that order, starting from the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(Vec<Letter>);

impl Word {
    /// Creates a word from its letters.
    pub fn new(letters: Vec<Letter>) -> Self {
        Self(letters)
    }

    /// The empty word, which stands for the identity.
    pub fn empty() -> Self {
        Self(vec![])
    }

    /// Appends a letter.
    pub fn push(&mut self, letter: Letter) {
        self.0.push(letter)
    }

    /// Concatenates two words.
    pub fn concat(&self, other: &Word) -> Word {
        let mut letters = Vec::with_capacity(self.len() + other.len());
        letters.extend_from_slice(&self.0);
        letters.extend_from_slice(&other.0);
        Self(letters)
    }

    /// The word of the inverse element: reversed, with every letter inverted.
    pub fn inverse(&self) -> Word {
        Self(self.0.iter().rev().map(Letter::inverse).collect())
    }

    /// Position of the first occurrence of `pattern` at or after `from`.
    pub fn find(&self, pattern: &[Letter], from: usize) -> Option<usize> {
        if pattern.is_empty() || pattern.len() > self.len() {
            return None;
        }
        (from..=self.len() - pattern.len()).find(|&i| &self.0[i..i + pattern.len()] == pattern)
    }

    /// Replaces all non-overlapping occurrences of `pattern`, scanning from the left. Returns the
    /// new word together with the number of replacements.
    pub fn replace_all(&self, pattern: &[Letter], replacement: &[Letter]) -> (Word, usize) {
        let mut count = 0;
        if pattern.is_empty() || pattern.len() > self.len() {
            return (self.clone(), count);
        }
        let mut letters = Vec::with_capacity(self.len());
        let mut i = 0;
        while i < self.len() {
            if self.0[i..].starts_with(pattern) {
                letters.extend_from_slice(replacement);
                i += pattern.len();
                count += 1;
            } else {
                letters.push(self.0[i]);
                i += 1;
            }
        }
        (Self(letters), count)
    }

    /// Cancels adjacent pairs of a letter and its inverse until none are left.
    pub fn free_reduce(&self) -> Word {
        let mut letters: Vec<Letter> = Vec::with_capacity(self.len());
        for &letter in &self.0 {
            if letters.last() == Some(&letter.inverse()) {
                letters.pop();
            } else {
                letters.push(letter);
            }
        }
        Self(letters)
    }
}

impl Deref for Word {
    type Target = [Letter];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Letter> for Word {
    fn from_iter<I: IntoIterator<Item = Letter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Letter>> for Word {
    fn from(letters: Vec<Letter>) -> Self {
        Self(letters)
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Letter;
    type IntoIter = std::slice::Iter<'a, Letter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Mul<&Word> for &Word {
    type Output = Word;
    fn mul(self, rhs: &Word) -> Word {
        self.concat(rhs)
    }
}

/// A rewrite rule replacing every occurrence of a pattern by a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rewrite {
    pattern: Word,
    replacement: Word,
}

impl Rewrite {
    /// Creates a rewrite rule.
    pub fn new(pattern: Word, replacement: Word) -> Self {
        Self {
            pattern,
            replacement,
        }
    }

    /// The word that is searched for.
    pub fn pattern(&self) -> &Word {
        &self.pattern
    }

    /// The word that replaces the pattern.
    pub fn replacement(&self) -> &Word {
        &self.replacement
    }

    /// Replaces all occurrences once.
    pub fn apply(&self, word: &Word) -> Word {
        word.replace_all(&self.pattern, &self.replacement).0
    }

    /// Applies the rule until it no longer matches. A rule that does not shorten is applied
    /// exactly once.
    pub fn apply_exhaustively(&self, word: &Word) -> Word {
        let mut current = self.apply(word);
        if self.replacement.len() >= self.pattern.len() {
            return current;
        }
        loop {
            let (next, count) = current.replace_all(&self.pattern, &self.replacement);
            if count == 0 {
                return current;
            }
            current = next;
        }
    }
}
