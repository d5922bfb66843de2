use std::io::{BufRead, Write};

use tracing::warn;

use super::PersistenceError;
use crate::{alphabet::Alphabet, simplify::RuleSet};

/// Writes one rule per line as `pattern->replacement`, in the order in which the rules are
/// applied.
pub fn write_rules<W: Write>(rules: &RuleSet, alphabet: &Alphabet, mut w: W) -> std::io::Result<()> {
    for (pattern, replacement) in rules.iter() {
        writeln!(w, "{}->{}", alphabet.render(pattern), alphabet.render(replacement))?;
    }
    w.flush()
}

/// Reads rules written by [`write_rules`]. Empty lines are ignored and rules that do not shorten
/// words are skipped.
pub fn read_rules<R: BufRead>(reader: R, alphabet: &Alphabet) -> Result<RuleSet, PersistenceError> {
    let mut rules = RuleSet::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (pattern, replacement) = line.split_once("->").ok_or_else(|| {
            PersistenceError::Malformed(format!("line {} is not a rule: {line}", number + 1))
        })?;
        let pattern = alphabet.parse_word(pattern)?;
        let replacement = alphabet.parse_word(replacement)?;
        if !rules.insert(pattern, replacement) {
            warn!("skipping rule {line} which does not shorten words");
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::tests::coxeter_b3;

    #[test]
    fn rules_survive_a_round_trip() {
        let group = coxeter_b3();
        let rules = RuleSet::generate(&group, Some(10));
        let mut buffer = vec![];
        write_rules(&rules, group.alphabet(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), rules.len());
        assert!(text.lines().all(|line| line.contains("->")));

        let read = read_rules(text.as_bytes(), group.alphabet()).unwrap();
        assert_eq!(read, rules);
    }

    #[test]
    fn bad_lines_are_reported() {
        let group = coxeter_b3();
        let alphabet = group.alphabet();
        assert!(matches!(
            read_rules("aa->\nab".as_bytes(), alphabet),
            Err(PersistenceError::Malformed(_))
        ));
        assert!(matches!(
            read_rules("az->".as_bytes(), alphabet),
            Err(PersistenceError::Parse(_))
        ));
        let rules = read_rules("\naa->\nab->ba\n".as_bytes(), alphabet).unwrap();
        assert_eq!(rules.len(), 1);
    }
}
