use std::ops::Range;

use tracing::{info, trace};

use crate::{algebra::Point, element::GroupElement, simplify::RuleSet};

/// The two ways of turning a group element `g` and a coset representative `rep` with the same
/// image of the base point into an element of the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candidate {
    /// `g · rep⁻¹`
    Left,
    /// `rep · g⁻¹`
    Right,
}

impl Candidate {
    /// Builds the stabilizer element and simplifies its word with `rules`.
    pub fn build(self, g: &GroupElement, rep: &GroupElement, rules: &RuleSet) -> GroupElement {
        match self {
            Candidate::Left => g.multiply_simplified(&rep.inverse(), rules),
            Candidate::Right => rep.multiply_simplified(&g.inverse(), rules),
        }
    }
}

/// Decides which [`Candidate`]s the extended training explores for a sampled representative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CandidatePolicy {
    /// One of the two candidates, picked by a fair coin.
    #[default]
    CoinFlip,
    /// Both candidates, which doubles the branching factor.
    Both,
}

impl CandidatePolicy {
    /// The candidates to explore next.
    pub fn candidates(self, rng: &mut fastrand::Rng) -> &'static [Candidate] {
        match self {
            CandidatePolicy::CoinFlip => {
                if rng.bool() {
                    &[Candidate::Left]
                } else {
                    &[Candidate::Right]
                }
            }
            CandidatePolicy::Both => &[Candidate::Left, Candidate::Right],
        }
    }
}

/// Everything a training step needs besides the chain itself.
pub struct TrainingContext<'a> {
    pub(crate) rules: &'a RuleSet,
    pub(crate) rng: &'a mut fastrand::Rng,
    pub(crate) policy: CandidatePolicy,
    pub(crate) branching: usize,
}

impl<'a> TrainingContext<'a> {
    /// A context with the coin flip policy and a branching of one.
    pub fn new(rules: &'a RuleSet, rng: &'a mut fastrand::Rng) -> Self {
        Self {
            rules,
            rng,
            policy: CandidatePolicy::default(),
            branching: 1,
        }
    }

    /// Sets the candidate policy.
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the maximal number of representatives explored per coset, at least one.
    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching.max(1);
        self
    }

    /// The rules used to simplify candidate words.
    pub fn rules(&self) -> &RuleSet {
        self.rules
    }
}

/// A chain that can be improved by offering it group elements.
pub trait Trainable {
    /// Offers one element. Returns the orbit point of the last representative that changed, if
    /// any did.
    fn train_element(&mut self, element: GroupElement, context: &mut TrainingContext<'_>) -> Option<Point>;

    /// Number of cosets without a representative.
    fn missing(&self) -> usize;

    /// Average word length of the representatives.
    fn average_word_length(&self) -> f64;
}

/// Summary of a finished [`Session`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    /// Elements that were offered to the chain.
    pub offered: usize,
    /// Offered elements that changed at least one representative.
    pub improved: usize,
    /// Index one past the last element that was looked at.
    pub end: usize,
    /// Missing representatives after the session.
    pub missing: usize,
    /// Average word length after the session.
    pub average_word_length: f64,
}

/// A training run over the elements with index in a half-open range of an enumeration. Training
/// can be resumed by running a session over a later range on the same chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    range: Range<usize>,
    checkpoint_every: Option<usize>,
}

impl Session {
    /// Trains with the elements `range.start..range.end` of the enumeration.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            range,
            checkpoint_every: None,
        }
    }

    /// Calls the checkpoint hook every `every` elements of the enumeration.
    pub fn with_checkpoints(mut self, every: Option<usize>) -> Self {
        self.checkpoint_every = every.filter(|every| *every > 0);
        self
    }

    /// The range of enumeration indices.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Runs the session. `elements` has to start at index zero of the enumeration; the elements
    /// before the range are skipped. The hook receives the chain and the number of enumerated
    /// elements whenever a checkpoint is due.
    pub fn run<T, I, F>(
        &self,
        chain: &mut T,
        elements: I,
        context: &mut TrainingContext<'_>,
        mut checkpoint: F,
    ) -> TrainingReport
    where
        T: Trainable,
        I: IntoIterator<Item = GroupElement>,
        F: FnMut(&T, usize),
    {
        info!(
            "training with elements {}..{}, {} representatives missing",
            self.range.start,
            self.range.end,
            chain.missing()
        );
        let mut offered = 0;
        let mut improved = 0;
        let mut end = 0;
        for (index, element) in elements.into_iter().enumerate().take(self.range.end) {
            end = index + 1;
            if index >= self.range.start {
                trace!("training element {index} of word length {}", element.word_len());
                offered += 1;
                if chain.train_element(element, context).is_some() {
                    improved += 1;
                }
            }
            if self.checkpoint_every.is_some_and(|every| end % every == 0) {
                info!(
                    "checkpoint after {end} elements, {} representatives missing, average word length {:.2}",
                    chain.missing(),
                    chain.average_word_length()
                );
                checkpoint(chain, end);
            }
        }

        let report = TrainingReport {
            offered,
            improved,
            end,
            missing: chain.missing(),
            average_word_length: chain.average_word_length(),
        };
        info!(
            "training finished after {end} elements, {improved} of {offered} improved the chain, {} missing, average word length {:.2}",
            report.missing, report.average_word_length
        );
        report
    }
}
