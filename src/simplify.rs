use std::{cmp::Ordering, collections::BTreeMap, collections::VecDeque};

use tracing::{debug, info, trace, warn};

use crate::{
    algebra::Base,
    group::PermutationGroup,
    math::Map,
    word::Word,
};

/// Orders patterns longest first, ties are broken lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern(Word);

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .len()
            .cmp(&self.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A rewriting system on words. Every rule replaces a pattern by a strictly shorter word for the
/// same group element, so rewriting always terminates.
///
/// Rules are tried longest pattern first, which lets long reductions fire before shorter rules
/// could break up their pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<Pattern, Word>,
    pass_limit: Option<usize>,
}

impl RuleSet {
    /// An empty rule set, which leaves every word unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of passes a single simplification may take. Hitting the bound is
    /// logged and the partially simplified word is kept.
    pub fn with_pass_limit(mut self, pass_limit: Option<usize>) -> Self {
        self.pass_limit = pass_limit;
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Adds a rule, replacing any rule with the same pattern. Rules that would not shorten a word
    /// are rejected and `false` is returned.
    pub fn insert(&mut self, pattern: Word, replacement: Word) -> bool {
        if pattern.is_empty() || replacement.len() >= pattern.len() {
            return false;
        }
        self.rules.insert(Pattern(pattern), replacement);
        true
    }

    /// The replacement for `pattern`, if there is a rule for it.
    pub fn get(&self, pattern: &Word) -> Option<&Word> {
        self.rules.get(&Pattern(pattern.clone()))
    }

    /// Iterates over all rules in the order in which they are applied.
    pub fn iter(&self) -> impl Iterator<Item = (&Word, &Word)> + '_ {
        self.rules.iter().map(|(p, r)| (&p.0, r))
    }

    /// Rewrites `word` in place. A pass substitutes every rule in order; passes are repeated as
    /// long as the word gets shorter. Returns the number of passes.
    pub fn simplify(&self, word: &mut Word) -> usize {
        let mut passes = 0;
        loop {
            let before = word.len();
            for (pattern, replacement) in self.rules.iter().skip_while(|(p, _)| p.0.len() > before) {
                if pattern.0.len() > word.len() {
                    continue;
                }
                let (next, count) = word.replace_all(&pattern.0, replacement);
                if count > 0 {
                    *word = next;
                }
            }
            passes += 1;
            if passes % 100 == 0 {
                debug!("simplification pass {passes}, word length {}", word.len());
            }
            if word.len() >= before {
                return passes;
            }
            if self.pass_limit.is_some_and(|limit| passes >= limit) {
                warn!("simplification stopped after {passes} passes");
                return passes;
            }
        }
    }

    /// Returns a simplified copy of `word`.
    pub fn simplified(&self, word: &Word) -> Word {
        let mut word = word.clone();
        self.simplify(&mut word);
        word
    }

    /// Discovers rules by a breadth-first search from the identity. Whenever a product reaches a
    /// base image that was recorded before, its word is simplified with the rules known so far
    /// and, if it is still longer than the recorded word, turned into a rule. The search stops
    /// expanding once more than `limit` rules are known.
    pub fn generate(group: &PermutationGroup, limit: Option<usize>) -> Self {
        info!(
            "generating simplification rules for \"{}\" with limit {limit:?}",
            group.name()
        );
        let alphabet = group.alphabet();
        let base = group.base();
        let identity = group.identity();
        let mut recorded: Map<Base, Word> = Map::default();
        recorded.insert(base.action(identity.permutation()), Word::empty());
        let mut queue = VecDeque::from([identity]);
        let mut rules = Self::new();

        while let Some(element) = queue.pop_front() {
            if limit.is_some_and(|limit| rules.len() > limit) {
                break;
            }
            for letter in alphabet.letters() {
                let next = element.push(alphabet, letter);
                let image = base.action(next.permutation());
                match recorded.get(&image) {
                    None => {
                        recorded.insert(image, next.word().clone());
                        queue.push_back(next);
                    }
                    Some(known) => {
                        let word = rules.simplified(next.word());
                        if word.len() > known.len() {
                            trace!(
                                "new rule {} -> {}",
                                alphabet.render(&word),
                                alphabet.render(known)
                            );
                            rules.insert(word, known.clone());
                        }
                    }
                }
            }
        }
        info!("found {} simplification rules", rules.len());
        rules
    }
}

/// Maps base images to the shortest known words, taken from a prefix of the Cayley graph
/// enumeration. It is used to shorten words by replacing sub-words with shorter equivalents.
#[derive(Debug, Clone)]
pub struct ShortWordIndex {
    base: Base,
    words: Map<Base, Word>,
}

impl ShortWordIndex {
    /// Indexes the first `size` elements of the enumeration.
    pub fn new(group: &PermutationGroup, size: usize) -> Self {
        let base = group.base();
        let words = group
            .cayley_graph(Some(size))
            .map(|element| {
                let (permutation, word) = element.into_parts();
                (base.action(&permutation), word)
            })
            .collect();
        Self { base, words }
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The shortest indexed word for the element of `word`, if it is indexed.
    pub fn lookup(&self, group: &PermutationGroup, word: &Word) -> Option<&Word> {
        self.words
            .get(&self.base.action(group.word_to_element(word).permutation()))
    }

    /// Replaces sub-words by shorter indexed words until no sub-word can be shortened.
    pub fn shorten(&self, group: &PermutationGroup, word: &Word) -> Word {
        let alphabet = group.alphabet();
        let mut current = word.clone();
        'improve: loop {
            for start in 0..current.len() {
                let mut element = group.identity();
                for end in start..current.len() {
                    element = element.push(alphabet, current[end]);
                    let Some(short) = self.words.get(&self.base.action(element.permutation()))
                    else {
                        continue;
                    };
                    if short.len() < end + 1 - start {
                        let mut letters = current[..start].to_vec();
                        letters.extend_from_slice(short);
                        letters.extend_from_slice(&current[end + 1..]);
                        current = Word::new(letters);
                        continue 'improve;
                    }
                }
            }
            return current;
        }
    }
}
