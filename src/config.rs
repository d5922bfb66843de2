use crate::minkwitz::CandidatePolicy;

/// Parameters for computing simplification rules and training Minkwitz chains.
///
/// The element counts and the branching also determine the file names under which trained
/// chains are stored, so chains trained with different parameters do not overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingParameters {
    /// Number of enumerated elements used for training.
    pub elements: usize,
    /// Budget for the number of simplification rules, `None` for all rules.
    pub rules: Option<usize>,
    /// Maximal number of representatives explored per coset by the extended training.
    pub branching: usize,
    /// Number of enumerated elements used for pre-training the extended chain.
    pub pre_training: usize,
    /// Number of levels on which extended factorization combines all representatives.
    pub factor_depth: usize,
    /// Distance between checkpoints, `None` disables them.
    pub checkpoint_every: Option<usize>,
    /// Seed for the pseudo random generator, `None` seeds from the environment.
    pub seed: Option<u64>,
    /// Which stabilizer candidates the extended training explores.
    pub policy: CandidatePolicy,
    /// Upper bound on the passes of a single word simplification.
    pub pass_limit: Option<usize>,
}

impl Default for TrainingParameters {
    fn default() -> Self {
        Self {
            elements: 10_000,
            rules: Some(1_000),
            branching: 1,
            pre_training: 0,
            factor_depth: 2,
            checkpoint_every: Some(20_000),
            seed: None,
            policy: CandidatePolicy::default(),
            pass_limit: Some(10_000),
        }
    }
}

impl TrainingParameters {
    /// Sets the number of training elements.
    pub fn with_elements(mut self, elements: usize) -> Self {
        self.elements = elements;
        self
    }

    /// Sets the rule budget.
    pub fn with_rules(mut self, rules: Option<usize>) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the branching, which is at least one.
    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching.max(1);
        self
    }

    /// Sets the pre-training size.
    pub fn with_pre_training(mut self, pre_training: usize) -> Self {
        self.pre_training = pre_training;
        self
    }

    /// Sets the depth of extended factorization.
    pub fn with_factor_depth(mut self, factor_depth: usize) -> Self {
        self.factor_depth = factor_depth;
        self
    }

    /// Sets the checkpoint distance.
    pub fn with_checkpoint_every(mut self, checkpoint_every: Option<usize>) -> Self {
        self.checkpoint_every = checkpoint_every;
        self
    }

    /// Fixes the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the candidate policy.
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the pass limit for simplification.
    pub fn with_pass_limit(mut self, pass_limit: Option<usize>) -> Self {
        self.pass_limit = pass_limit;
        self
    }
}
