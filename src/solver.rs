use std::ops::Range;

use tracing::{info, warn};

use crate::{
    algebra::Permutation,
    cayley::Enumeration,
    config::TrainingParameters,
    element::GroupElement,
    factorization::{factor, factor_extended, ExtendedFactorization, FactorizationError},
    group::PermutationGroup,
    minkwitz::{ExtendedMinkwitzChain, MinkwitzChain, Session, TrainingContext, TrainingReport},
    persist::Storage,
    random,
    simplify::RuleSet,
    word::Word,
};

/// Converts between permutations and words of a group.
///
/// The simplification rules and the chains are computed when they are first needed. With a
/// [`Storage`], they are loaded if they were stored before and saved after they were computed,
/// together with checkpoints during training.
pub struct Solver<'g> {
    group: &'g PermutationGroup,
    parameters: TrainingParameters,
    storage: Option<Storage>,
    rng: fastrand::Rng,
    rules: Option<RuleSet>,
    chain: Option<MinkwitzChain>,
    extended: Option<ExtendedMinkwitzChain>,
}

fn enumeration<'g>(
    storage: Option<&Storage>,
    group: &'g PermutationGroup,
    cap: usize,
) -> Enumeration<'g> {
    match storage {
        Some(storage) => storage.recorded_enumeration(group, Some(cap)),
        None => Enumeration::Search(group.cayley_graph(Some(cap))),
    }
}

impl<'g> Solver<'g> {
    /// A solver for `group` that keeps everything in memory.
    pub fn new(group: &'g PermutationGroup, parameters: TrainingParameters) -> Self {
        let rng = random::rng(parameters.seed);
        Self {
            group,
            parameters,
            storage: None,
            rng,
            rules: None,
            chain: None,
            extended: None,
        }
    }

    /// Loads and saves rules and chains in `storage`.
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// The group.
    pub fn group(&self) -> &'g PermutationGroup {
        self.group
    }

    /// The parameters.
    pub fn parameters(&self) -> &TrainingParameters {
        &self.parameters
    }

    fn ensure_rules(&mut self) {
        if self.rules.is_some() {
            return;
        }
        let budget = self.parameters.rules;
        let loaded = self.storage.as_ref().and_then(|storage| {
            storage
                .load_rules(self.group, budget)
                .map_err(|e| info!("generating rules, none stored: {e}"))
                .ok()
        });
        let rules = loaded.unwrap_or_else(|| {
            let rules = RuleSet::generate(self.group, budget);
            if let Some(storage) = &self.storage {
                if let Err(e) = storage.save_rules(self.group, &rules, budget) {
                    warn!("could not save rules: {e}");
                }
            }
            rules
        });
        self.rules = Some(rules.with_pass_limit(self.parameters.pass_limit));
    }

    /// The simplification rules.
    pub fn rules(&mut self) -> &RuleSet {
        self.ensure_rules();
        self.rules.get_or_insert_with(RuleSet::new)
    }

    fn train_chain(&mut self, chain: &mut MinkwitzChain, range: Range<usize>) -> TrainingReport {
        self.ensure_rules();
        let Self {
            group,
            parameters,
            storage,
            rng,
            rules,
            ..
        } = self;
        let group = *group;
        let rules = rules.get_or_insert_with(RuleSet::new);
        let elements = range.end;
        let mut context = TrainingContext::new(rules, rng);
        let report = Session::new(range)
            .with_checkpoints(parameters.checkpoint_every)
            .run(
                chain,
                enumeration(storage.as_ref(), group, elements),
                &mut context,
                |chain, index| {
                    if let Some(storage) = storage.as_ref() {
                        if let Err(e) = storage.save_minkwitz(group, chain, elements, Some(index)) {
                            warn!("could not save checkpoint {index}: {e}");
                        }
                    }
                },
            );
        if let Some(storage) = storage.as_ref() {
            if let Err(e) = storage.save_minkwitz(group, chain, elements, None) {
                warn!("could not save minkwitz chain: {e}");
            }
        }
        report
    }

    fn ensure_chain(&mut self) {
        if self.chain.is_some() {
            return;
        }
        let elements = self.parameters.elements;
        let loaded = self
            .storage
            .as_ref()
            .and_then(|storage| storage.load_minkwitz(self.group, elements))
            .filter(|chain| chain.fits(self.group.stabilizer_chain()));
        let chain = match loaded {
            Some(chain) => chain,
            None => {
                let mut chain = MinkwitzChain::new(self.group.stabilizer_chain());
                self.train_chain(&mut chain, 0..elements);
                chain
            }
        };
        self.chain = Some(chain);
    }

    /// The Minkwitz chain, trained with the first `elements` enumerated elements.
    pub fn chain(&mut self) -> &MinkwitzChain {
        self.ensure_chain();
        let group = self.group;
        self.chain
            .get_or_insert_with(|| MinkwitzChain::new(group.stabilizer_chain()))
    }

    /// Continues training the chain with the enumerated elements in `range`. The chain is then
    /// stored under the end of the range.
    pub fn resume(&mut self, range: Range<usize>) -> TrainingReport {
        self.ensure_chain();
        let group = self.group;
        let mut chain = self
            .chain
            .take()
            .unwrap_or_else(|| MinkwitzChain::new(group.stabilizer_chain()));
        info!("resuming training of {} at {}", group.name(), range.start);
        self.parameters.elements = self.parameters.elements.max(range.end);
        let report = self.train_chain(&mut chain, range);
        self.chain = Some(chain);
        report
    }

    fn ensure_extended(&mut self) {
        if self.extended.is_some() {
            return;
        }
        let TrainingParameters {
            elements,
            branching,
            pre_training,
            checkpoint_every,
            policy,
            ..
        } = self.parameters.clone();
        let group = self.group;
        if let Some(chain) = self
            .storage
            .as_ref()
            .and_then(|storage| storage.load_extended(group, pre_training, elements, branching))
            .filter(|chain| chain.fits(group.stabilizer_chain()))
        {
            self.extended = Some(chain);
            return;
        }

        self.ensure_rules();
        let storage = self.storage.as_ref();
        let rules = self.rules.get_or_insert_with(RuleSet::new);
        let mut chain = ExtendedMinkwitzChain::new(group.stabilizer_chain());
        if pre_training > 0 {
            chain.pre_train(enumeration(storage, group, pre_training));
        }
        let mut context = TrainingContext::new(rules, &mut self.rng)
            .with_policy(policy)
            .with_branching(branching);
        Session::new(0..elements)
            .with_checkpoints(checkpoint_every)
            .run(
                &mut chain,
                enumeration(storage, group, elements),
                &mut context,
                |chain, index| {
                    if let Some(storage) = storage {
                        if let Err(e) = storage.save_extended(
                            group,
                            chain,
                            pre_training,
                            elements,
                            branching,
                            Some(index),
                        ) {
                            warn!("could not save checkpoint {index}: {e}");
                        }
                    }
                },
            );
        if let Some(storage) = storage {
            if let Err(e) =
                storage.save_extended(group, &chain, pre_training, elements, branching, None)
            {
                warn!("could not save extended minkwitz chain: {e}");
            }
        }
        self.extended = Some(chain);
    }

    /// The extended Minkwitz chain, pre-trained and trained as the parameters say.
    pub fn extended_chain(&mut self) -> &ExtendedMinkwitzChain {
        self.ensure_extended();
        let group = self.group;
        self.extended
            .get_or_insert_with(|| ExtendedMinkwitzChain::new(group.stabilizer_chain()))
    }

    /// Factors `permutation` with the Minkwitz chain.
    pub fn element_to_word(&mut self, permutation: &Permutation) -> Result<GroupElement, FactorizationError> {
        self.ensure_chain();
        self.ensure_rules();
        let (Some(chain), Some(rules)) = (&self.chain, &self.rules) else {
            return Err(FactorizationError::NotInGroup);
        };
        factor(chain, permutation, rules)
    }

    /// All candidate words from the extended chain, shortest first.
    pub fn element_to_word_extended(
        &mut self,
        permutation: &Permutation,
    ) -> Result<ExtendedFactorization, FactorizationError> {
        self.ensure_extended();
        self.ensure_rules();
        let (Some(chain), Some(rules)) = (&self.extended, &self.rules) else {
            return Err(FactorizationError::NotInGroup);
        };
        factor_extended(chain, permutation, rules, self.parameters.factor_depth)
    }

    /// The shortest word the extended chain finds for `permutation`.
    pub fn shortest_word(&mut self, permutation: &Permutation) -> Result<GroupElement, FactorizationError> {
        self.element_to_word_extended(permutation)?
            .into_candidates()
            .into_iter()
            .next()
            .ok_or(FactorizationError::NotInGroup)
    }

    /// Replays `word`.
    pub fn word_to_element(&self, word: &Word) -> GroupElement {
        self.group.word_to_element(word)
    }

    /// A random element of the group, given by a simplified random word of `length` letters.
    pub fn random_element(&mut self, length: usize) -> GroupElement {
        self.group.random_element(&mut self.rng, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::tests::{coxeter_b3, symmetric_group};

    fn parameters() -> TrainingParameters {
        TrainingParameters::default()
            .with_elements(120)
            .with_rules(Some(30))
            .with_branching(2)
            .with_pre_training(20)
            .with_seed(3)
    }

    #[test_log::test]
    fn factors_random_elements() {
        let group = symmetric_group();
        let mut solver = Solver::new(&group, parameters());
        assert!(solver.chain().is_complete());
        for _ in 0..50 {
            let element = solver.random_element(12);
            let word = solver.element_to_word(element.permutation()).unwrap();
            assert_eq!(solver.word_to_element(word.word()).permutation(), element.permutation());

            let shortest = solver.shortest_word(element.permutation()).unwrap();
            assert_eq!(
                solver.word_to_element(shortest.word()).permutation(),
                element.permutation()
            );
        }
        assert!(solver.rules().len() > 30);
    }

    #[test]
    fn resumes_partial_training() {
        let group = coxeter_b3();
        let mut solver = Solver::new(&group, parameters().with_elements(10));
        let missing = solver.chain().missing();
        let report = solver.resume(10..48);
        assert_eq!(report.offered, 38);
        assert!(report.missing <= missing);
        assert!(solver.chain().is_complete());
        assert_eq!(solver.parameters().elements, 48);
    }

    #[test_log::test]
    fn stored_chains_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let group = coxeter_b3();
        let parameters = parameters().with_elements(48).with_checkpoint_every(Some(20));

        let mut first = Solver::new(&group, parameters.clone()).with_storage(Storage::new(dir.path()));
        let chain = first.chain().clone();
        let extended = first.extended_chain().clone();
        let storage = Storage::new(dir.path());
        assert!(storage.minkwitz_path(&group, 48, Some(20)).exists());
        assert!(storage.extended_path(&group, 20, 48, 2, None).exists());
        assert!(storage.rules_path(&group, Some(30)).exists());
        assert!(storage.words_path(&group, Some(48)).exists());
        assert!(storage.words_path(&group, Some(20)).exists());

        let mut second = Solver::new(&group, parameters).with_storage(storage);
        assert_eq!(second.chain(), &chain);
        assert_eq!(second.extended_chain(), &extended);
    }
}
