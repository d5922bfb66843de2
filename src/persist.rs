//! Storage of simplification rules, trained chains and recorded enumerations.
//!
//! Everything is stored below a root directory, one sub-directory per kind of data. File names
//! are derived from the group name and the parameters the data was computed with. Loading a
//! chain never fails hard: a missing or damaged file means that the chain has to be trained.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    algebra::ParseError,
    cayley::{Enumeration, Replay},
    group::PermutationGroup,
    minkwitz::{ExtendedMinkwitzChain, MinkwitzChain},
    simplify::RuleSet,
};

mod text;
pub use text::{read_rules, write_rules};

mod xml;
pub use xml::{read_extended, read_minkwitz, WriteXml};

/// Errors that can occur while storing or loading data.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not well-formed xml.
    #[error("invalid xml: {0}")]
    Xml(String),
    /// The content does not describe data for the group.
    #[error("malformed content: {0}")]
    Malformed(String),
    /// A permutation, point list or word could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn count(value: Option<usize>) -> String {
    value.map_or_else(|| "all".to_string(), |value| value.to_string())
}

fn checkpoint(index: Option<usize>) -> String {
    index.map(|index| format!("_{index}")).unwrap_or_default()
}

/// A directory holding the files for any number of groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Uses `root` as the base directory. Nothing is created until something is saved.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The base directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `rules/{name}_{count}.txt`
    pub fn rules_path(&self, group: &PermutationGroup, rules: Option<usize>) -> PathBuf {
        self.root
            .join("rules")
            .join(format!("{}_{}.txt", group.name(), count(rules)))
    }

    /// `minkwitz/{name}_{elements}.xml`, with `_{index}` appended for a checkpoint.
    pub fn minkwitz_path(
        &self,
        group: &PermutationGroup,
        elements: usize,
        checkpoint_index: Option<usize>,
    ) -> PathBuf {
        self.root.join("minkwitz").join(format!(
            "{}_{elements}{}.xml",
            group.name(),
            checkpoint(checkpoint_index)
        ))
    }

    /// `extended_minkwitz/{name}_{pre}_{elements}_{branching}.xml`, with `_{index}` appended
    /// for a checkpoint.
    pub fn extended_path(
        &self,
        group: &PermutationGroup,
        pre_training: usize,
        elements: usize,
        branching: usize,
        checkpoint_index: Option<usize>,
    ) -> PathBuf {
        self.root.join("extended_minkwitz").join(format!(
            "{}_{pre_training}_{elements}_{branching}{}.xml",
            group.name(),
            checkpoint(checkpoint_index)
        ))
    }

    /// `shortest_words/{name}_{cap}.txt`
    pub fn words_path(&self, group: &PermutationGroup, cap: Option<usize>) -> PathBuf {
        self.root
            .join("shortest_words")
            .join(format!("{}_{}.txt", group.name(), count(cap)))
    }

    fn create(path: &Path) -> Result<BufWriter<File>, PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(BufWriter::new(File::create(path)?))
    }

    fn save_text(path: &Path, content: &str) -> Result<(), PersistenceError> {
        let mut writer = Self::create(path)?;
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        info!("saved {}", path.display());
        Ok(())
    }

    /// Saves rules that were generated with the budget `rules`.
    pub fn save_rules(
        &self,
        group: &PermutationGroup,
        rules: &RuleSet,
        budget: Option<usize>,
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.rules_path(group, budget);
        write_rules(rules, group.alphabet(), Self::create(&path)?)?;
        info!("saved {} rules to {}", rules.len(), path.display());
        Ok(path)
    }

    /// Loads rules that were generated with the budget `rules`.
    pub fn load_rules(
        &self,
        group: &PermutationGroup,
        budget: Option<usize>,
    ) -> Result<RuleSet, PersistenceError> {
        let path = self.rules_path(group, budget);
        let rules = read_rules(BufReader::new(File::open(&path)?), group.alphabet())?;
        debug!("loaded {} rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Saves a chain trained with `elements` elements.
    pub fn save_minkwitz(
        &self,
        group: &PermutationGroup,
        chain: &MinkwitzChain,
        elements: usize,
        checkpoint_index: Option<usize>,
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.minkwitz_path(group, elements, checkpoint_index);
        Self::save_text(&path, &chain.to_xml(group))?;
        Ok(path)
    }

    /// Loads a chain trained with `elements` elements. Returns `None` if there is no usable file.
    pub fn load_minkwitz(&self, group: &PermutationGroup, elements: usize) -> Option<MinkwitzChain> {
        let path = self.minkwitz_path(group, elements, None);
        match fs::read_to_string(&path)
            .map_err(PersistenceError::from)
            .and_then(|content| read_minkwitz(group, &content))
        {
            Ok(chain) => {
                info!("loaded minkwitz chain from {}", path.display());
                Some(chain)
            }
            Err(e) => {
                info!("no minkwitz chain at {}: {e}", path.display());
                None
            }
        }
    }

    /// Saves an extended chain.
    pub fn save_extended(
        &self,
        group: &PermutationGroup,
        chain: &ExtendedMinkwitzChain,
        pre_training: usize,
        elements: usize,
        branching: usize,
        checkpoint_index: Option<usize>,
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.extended_path(group, pre_training, elements, branching, checkpoint_index);
        Self::save_text(&path, &chain.to_xml(group))?;
        Ok(path)
    }

    /// Loads an extended chain. Returns `None` if there is no usable file.
    pub fn load_extended(
        &self,
        group: &PermutationGroup,
        pre_training: usize,
        elements: usize,
        branching: usize,
    ) -> Option<ExtendedMinkwitzChain> {
        let path = self.extended_path(group, pre_training, elements, branching, None);
        match fs::read_to_string(&path)
            .map_err(PersistenceError::from)
            .and_then(|content| read_extended(group, &content))
        {
            Ok(chain) => {
                info!("loaded extended minkwitz chain from {}", path.display());
                Some(chain)
            }
            Err(e) => {
                info!("no extended minkwitz chain at {}: {e}", path.display());
                None
            }
        }
    }

    /// Enumerates the Cayley graph up to `cap` elements and records the words. Returns the
    /// number of enumerated elements.
    pub fn record_words(
        &self,
        group: &PermutationGroup,
        cap: Option<usize>,
    ) -> Result<usize, PersistenceError> {
        let path = self.words_path(group, cap);
        let partial = path.with_extension("partial");
        let mut writer = Self::create(&partial)?;
        let count = group.cayley_graph(cap).record_to(&mut writer).count();
        writer.flush()?;
        drop(writer);
        fs::rename(&partial, &path)?;
        info!("recorded {count} elements to {}", path.display());
        Ok(count)
    }

    /// Replays recorded words.
    pub fn replay_words<'g>(
        &self,
        group: &'g PermutationGroup,
        cap: Option<usize>,
    ) -> Result<Replay<'g>, PersistenceError> {
        let file = File::open(self.words_path(group, cap))?;
        Ok(Replay::new(group, BufReader::new(file)))
    }

    /// The enumeration up to `cap` elements, replayed if it was recorded and computed otherwise.
    pub fn enumeration<'g>(&self, group: &'g PermutationGroup, cap: Option<usize>) -> Enumeration<'g> {
        match self.replay_words(group, cap) {
            Ok(replay) => {
                debug!("replaying recorded enumeration of {}", group.name());
                Enumeration::Replay(replay)
            }
            Err(_) => Enumeration::Search(group.cayley_graph(cap)),
        }
    }

    /// Like [`Storage::enumeration`], but an enumeration that was not recorded yet is recorded
    /// first. If recording fails, the enumeration is computed on the fly.
    pub fn recorded_enumeration<'g>(
        &self,
        group: &'g PermutationGroup,
        cap: Option<usize>,
    ) -> Enumeration<'g> {
        if !self.words_path(group, cap).exists() {
            if let Err(e) = self.record_words(group, cap) {
                warn!("could not record the enumeration of {}: {e}", group.name());
            }
        }
        self.enumeration(group, cap)
    }
}
