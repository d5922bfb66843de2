//! Library for computing with finite permutation groups that are given by a list of generators.
//!
//! A [`PermutationGroup`] is built from named generators. On construction its stabilizer chain
//! is computed with the Schreier-Sims algorithm, which decides membership and yields the exact
//! order of the group, even for groups as large as the group of the Rubik's cube with roughly
//! $4.3 \cdot 10^{19}$ elements. Points are single bytes, so groups act on at most 255 points.
//!
//! The second concern of the crate is writing group elements as short products of the
//! generators, which are called words. Finding shortest words is infeasible for large groups, so
//! the crate follows Minkwitz' approach: a [`minkwitz::MinkwitzChain`] has the shape of the
//! stabilizer chain and stores one word per coset, which is improved by training with the
//! elements of a breadth-first enumeration of the Cayley graph ([`cayley::CayleyIterator`]).
//! Every element then factors into a product of one representative per level. The
//! [`minkwitz::ExtendedMinkwitzChain`] keeps several equally short words per coset, explores
//! them with bounded random branching during training and produces many candidate words when
//! factoring. Words are shortened with rewriting rules ([`simplify::RuleSet`]) that are
//! discovered from short relations in the Cayley graph.
//!
//! Trained chains, rules and recorded enumerations can be stored in a [`persist::Storage`], and
//! a [`solver::Solver`] ties everything together by loading or computing what it needs on
//! demand.
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use permgroup::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        algebra::{Base, Cycle, DimensionMismatch, ParseError, Permutation, Point, MAX_DEGREE},
        alphabet::{Alphabet, Letter},
        cayley::{CayleyIterator, Enumeration, Replay},
        config::TrainingParameters,
        element::GroupElement,
        factorization::{factor, factor_extended, ExtendedFactorization, FactorizationError},
        group::{GroupError, PermutationGroup, PermutationGroupBuilder},
        minkwitz::{
            CandidatePolicy, ExtendedMinkwitzChain, MinkwitzChain, Session, Trainable,
            TrainingContext, TrainingReport,
        },
        persist::{PersistenceError, Storage, WriteXml},
        simplify::{RuleSet, ShortWordIndex},
        solver::Solver,
        stabilizer::{StabilizerChain, StabilizerLevel},
        word::{Rewrite, Word},
    };
}

/// Collection types and small arithmetic helpers used throughout the crate.
pub mod math;

/// Points, cycles, permutations and bases, together with their text forms.
pub mod algebra;
pub use algebra::{Permutation, Point};

/// Letters and the alphabet that maps them to generators and symbols.
pub mod alphabet;

/// Words over an alphabet and plain rewriting of words.
pub mod word;

/// Permutations paired with a word that evaluates to them.
pub mod element;

/// Stabilizer chains computed with the Schreier-Sims algorithm.
pub mod stabilizer;

/// Groups given by generators.
pub mod group;
pub use group::PermutationGroup;

/// Breadth-first enumeration of the Cayley graph.
pub mod cayley;

/// Rewriting rules that shorten words.
pub mod simplify;

/// Minkwitz chains and their training.
pub mod minkwitz;

pub mod factorization;

/// Parameters for rule generation and training.
pub mod config;

pub mod persist;

/// Seeded randomness for random words, elements and sampling.
pub mod random;

/// Tabular overviews of chains.
pub mod render;

/// On-demand computation of rules and chains for converting between permutations and words.
pub mod solver;
