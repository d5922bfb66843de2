use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::{
    group::PermutationGroup,
    minkwitz::{ExtendedMinkwitzChain, MinkwitzChain},
    stabilizer::StabilizerChain,
};

/// One row per level with the base point, the orbit size and the orbit.
pub fn stabilizer_table(chain: &StabilizerChain) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Level", "Base point", "Orbit size", "Orbit"].map(String::from));
    for (index, level) in chain.levels().iter().enumerate() {
        builder.push_record([
            index.to_string(),
            level.base_point().bold().to_string(),
            level.orbit().len().to_string(),
            format!("[{}]", level.orbit().iter().join(", ")),
        ]);
    }
    builder
        .build()
        .with(tabled::settings::Style::rounded())
        .to_string()
}

/// One row per level and orbit point with the word of its representative, missing
/// representatives are dimmed.
pub fn minkwitz_table(group: &PermutationGroup, chain: &MinkwitzChain) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Level", "Point", "Length", "Word"].map(String::from));
    for (index, level) in chain.levels().iter().enumerate() {
        for (point, rep) in level.entries() {
            let (length, word) = match rep {
                Some(rep) => (
                    rep.word_len().to_string(),
                    group.alphabet().render(rep.word()),
                ),
                None => ("-".to_string(), "missing".dimmed().to_string()),
            };
            builder.push_record([index.to_string(), point.to_string(), length, word]);
        }
    }
    builder
        .build()
        .with(tabled::settings::Style::ascii())
        .to_string()
}

/// Like [`minkwitz_table`], listing all representatives of a coset in one cell.
pub fn extended_minkwitz_table(group: &PermutationGroup, chain: &ExtendedMinkwitzChain) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["Level", "Point", "Length", "Words"].map(String::from));
    for (index, level) in chain.levels().iter().enumerate() {
        for (point, reps) in level.entries() {
            let (length, words) = match reps.first() {
                Some(first) => (
                    first.word_len().to_string(),
                    reps.iter()
                        .map(|rep| group.alphabet().render(rep.word()))
                        .join("\n"),
                ),
                None => ("-".to_string(), "missing".dimmed().to_string()),
            };
            builder.push_record([index.to_string(), point.to_string(), length, words]);
        }
    }
    builder
        .build()
        .with(tabled::settings::Style::ascii())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{group::tests::symmetric_group, simplify::RuleSet};

    #[test]
    fn tables_list_every_level() {
        let group = symmetric_group();
        let table = stabilizer_table(group.stabilizer_chain());
        assert!(table.contains("Orbit size"));
        assert_eq!(table.lines().filter(|line| line.contains('[')).count(), 4);

        let mut chain = MinkwitzChain::new(group.stabilizer_chain());
        let untrained = minkwitz_table(&group, &chain);
        assert!(untrained.contains("missing"));
        for element in group.cayley_graph(None) {
            chain.train(element, &RuleSet::new());
        }
        assert!(!minkwitz_table(&group, &chain).contains("missing"));

        let extended = ExtendedMinkwitzChain::new(group.stabilizer_chain());
        assert!(extended_minkwitz_table(&group, &extended).contains("missing"));
    }
}
