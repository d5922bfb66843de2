use std::fmt::{Result, Write};

use itertools::Itertools;
use quick_xml::{escape::escape, events::Event, Reader};
use tracing::trace;

use super::PersistenceError;
use crate::{
    algebra::{parse_point, parse_point_list, Permutation, Point},
    element::GroupElement,
    group::PermutationGroup,
    math::{Map, OrderedSet},
    minkwitz::{ExtendedLevel, ExtendedMinkwitzChain, MinkwitzChain, MinkwitzLevel},
};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serializes a chain as nested `stabilizer` elements, one per level, each holding the orbit and
/// the representatives of the level. Words are written with the symbols of the group's alphabet.
pub trait WriteXml {
    /// Writes the document to `w`.
    fn write_xml<W: Write>(&self, group: &PermutationGroup, w: &mut W) -> Result;

    /// Returns the document as a string.
    fn to_xml(&self, group: &PermutationGroup) -> String {
        let mut out = String::new();
        self.write_xml(group, &mut out)
            .expect("writing into a String does not fail");
        trace!("produced xml document of {} bytes", out.len());
        out
    }
}

fn tabs<W: Write>(w: &mut W, depth: usize) -> Result {
    for _ in 0..depth {
        w.write_char('\t')?;
    }
    Ok(())
}

fn open_level<W: Write>(w: &mut W, depth: usize, orbit: &[Point]) -> Result {
    tabs(w, depth)?;
    w.write_str("<stabilizer>\n")?;
    tabs(w, depth + 1)?;
    w.write_str("<orbit>\n")?;
    tabs(w, depth + 2)?;
    writeln!(w, "[{}]", orbit.iter().join(","))?;
    tabs(w, depth + 1)?;
    w.write_str("</orbit>\n")?;
    tabs(w, depth + 1)?;
    w.write_str("<representatives>\n")
}

fn close_representatives<W: Write>(w: &mut W, depth: usize) -> Result {
    tabs(w, depth + 1)?;
    w.write_str("</representatives>\n")
}

/// Writes the empty terminal level and closes all open levels.
fn close_chain<W: Write>(w: &mut W, levels: usize) -> Result {
    open_level(w, levels, &[])?;
    close_representatives(w, levels)?;
    for depth in (0..=levels).rev() {
        tabs(w, depth)?;
        w.write_str("</stabilizer>\n")?;
    }
    Ok(())
}

fn write_text_element<W: Write>(w: &mut W, depth: usize, tag: &str, text: Option<&str>) -> Result {
    tabs(w, depth)?;
    writeln!(w, "<{tag}>")?;
    if let Some(text) = text {
        tabs(w, depth + 1)?;
        writeln!(w, "{}", escape(text))?;
    }
    tabs(w, depth)?;
    writeln!(w, "</{tag}>")
}

/// Writes one `representative` element with a permutation and word pair per entry. A `None`
/// entry produces an empty pair.
fn write_representative<'a, W, I>(
    w: &mut W,
    group: &PermutationGroup,
    depth: usize,
    point: Point,
    entries: I,
) -> Result
where
    W: Write,
    I: IntoIterator<Item = Option<&'a GroupElement>>,
{
    tabs(w, depth)?;
    writeln!(w, "<representative of='{point}'>")?;
    for entry in entries {
        let permutation = entry.map(|rep| rep.permutation().to_string());
        let word = entry.map(|rep| group.alphabet().render(rep.word()));
        write_text_element(w, depth + 1, "permutation", permutation.as_deref())?;
        write_text_element(w, depth + 1, "word", word.as_deref())?;
    }
    tabs(w, depth)?;
    w.write_str("</representative>\n")
}

impl WriteXml for MinkwitzChain {
    fn write_xml<W: Write>(&self, group: &PermutationGroup, w: &mut W) -> Result {
        w.write_str(XML_HEADER)?;
        for (depth, level) in self.levels().iter().enumerate() {
            open_level(w, depth, level.orbit())?;
            for (point, rep) in level.entries() {
                write_representative(w, group, depth + 2, point, [rep])?;
            }
            close_representatives(w, depth)?;
        }
        close_chain(w, self.depth())
    }
}

impl WriteXml for ExtendedMinkwitzChain {
    fn write_xml<W: Write>(&self, group: &PermutationGroup, w: &mut W) -> Result {
        w.write_str(XML_HEADER)?;
        for (depth, level) in self.levels().iter().enumerate() {
            open_level(w, depth, level.orbit())?;
            for (point, reps) in level.entries() {
                write_representative(w, group, depth + 2, point, reps.into_iter().map(Some))?;
            }
            close_representatives(w, depth)?;
        }
        close_chain(w, self.depth())
    }
}

/// A level as it is stored, before its contents are checked against a group.
#[derive(Debug, Default)]
struct RawLevel {
    orbit: Vec<Point>,
    representatives: Vec<(Point, Vec<(String, String)>)>,
}

fn xml_error<E: std::fmt::Display>(e: E) -> PersistenceError {
    PersistenceError::Xml(e.to_string())
}

fn malformed<S: Into<String>>(message: S) -> PersistenceError {
    PersistenceError::Malformed(message.into())
}

/// Reads the levels of a document, from the top down. Levels with an empty orbit are dropped.
fn read_levels(input: &str) -> std::result::Result<Vec<RawLevel>, PersistenceError> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut levels: Vec<RawLevel> = vec![];
    let mut collecting = false;
    let mut text = String::new();
    let mut permutation = None;
    let mut representative: Option<(Point, Vec<(String, String)>)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"stabilizer" => levels.push(RawLevel::default()),
                b"representatives" => {}
                b"representative" => {
                    let point = e
                        .try_get_attribute("of")
                        .map_err(xml_error)?
                        .ok_or_else(|| malformed("representative without orbit point"))?
                        .unescape_value()
                        .map_err(xml_error)?;
                    representative = Some((parse_point(point.trim())?, vec![]));
                }
                b"orbit" | b"permutation" | b"word" => {
                    collecting = true;
                    text.clear();
                }
                other => {
                    return Err(malformed(format!(
                        "unexpected element <{}>",
                        String::from_utf8_lossy(other)
                    )))
                }
            },
            Event::Text(t) => {
                if collecting {
                    text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::End(e) => {
                let level = levels
                    .last_mut()
                    .ok_or_else(|| malformed("content outside of a stabilizer"))?;
                match e.name().as_ref() {
                    b"orbit" => level.orbit = parse_point_list(text.trim())?,
                    b"permutation" => permutation = Some(text.trim().to_string()),
                    b"word" => {
                        let (_, pairs) = representative
                            .as_mut()
                            .ok_or_else(|| malformed("word outside of a representative"))?;
                        let permutation = permutation
                            .take()
                            .ok_or_else(|| malformed("word without permutation"))?;
                        pairs.push((permutation, text.trim().to_string()));
                    }
                    b"representative" => {
                        let entry = representative
                            .take()
                            .ok_or_else(|| malformed("unbalanced representative"))?;
                        level.representatives.push(entry);
                    }
                    _ => {}
                }
                collecting = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    levels.retain(|level| !level.orbit.is_empty());
    Ok(levels)
}

/// Checks a stored representative against the group and the level it belongs to. Empty
/// permutation texts stand for missing representatives.
fn stored_representative(
    group: &PermutationGroup,
    base_point: Point,
    point: Point,
    permutation: &str,
    word: &str,
) -> std::result::Result<Option<GroupElement>, PersistenceError> {
    if permutation.is_empty() {
        return Ok(None);
    }
    let permutation: Permutation = permutation.parse()?;
    if permutation.degree() > group.degree() {
        return Err(malformed(format!(
            "representative of {point} has degree {}",
            permutation.degree()
        )));
    }
    let element = GroupElement::new(
        permutation.extend(group.degree()),
        group.alphabet().parse_word(word)?,
    );
    if element.permutation().action(base_point) != point || !element.is_consistent(group.alphabet())
    {
        return Err(malformed(format!(
            "representative of {point} does not match its word"
        )));
    }
    Ok(Some(element))
}

fn check_shape(
    group: &PermutationGroup,
    levels: &[RawLevel],
) -> std::result::Result<(), PersistenceError> {
    let chain = group.stabilizer_chain();
    if levels.len() != chain.depth()
        || levels
            .iter()
            .zip(chain.levels())
            .any(|(raw, level)| raw.orbit != level.orbit())
    {
        return Err(malformed(format!(
            "stored orbits do not belong to group {}",
            group.name()
        )));
    }
    Ok(())
}

/// Reads a [`MinkwitzChain`] for `group`.
pub fn read_minkwitz(
    group: &PermutationGroup,
    input: &str,
) -> std::result::Result<MinkwitzChain, PersistenceError> {
    let raw = read_levels(input)?;
    check_shape(group, &raw)?;
    let levels = raw
        .into_iter()
        .map(|level| {
            let base_point = level.orbit[0];
            let mut representatives = Map::default();
            for (point, pairs) in level.representatives {
                for (permutation, word) in pairs {
                    if let Some(rep) = stored_representative(group, base_point, point, &permutation, &word)? {
                        representatives.insert(point, rep);
                    }
                }
            }
            Ok(MinkwitzLevel::new(level.orbit, representatives))
        })
        .collect::<std::result::Result<Vec<_>, PersistenceError>>()?;
    Ok(MinkwitzChain::from_levels(group.degree(), levels))
}

/// Reads an [`ExtendedMinkwitzChain`] for `group`.
pub fn read_extended(
    group: &PermutationGroup,
    input: &str,
) -> std::result::Result<ExtendedMinkwitzChain, PersistenceError> {
    let raw = read_levels(input)?;
    check_shape(group, &raw)?;
    let levels = raw
        .into_iter()
        .map(|level| {
            let base_point = level.orbit[0];
            let mut representatives: Map<Point, OrderedSet<GroupElement>> = Map::default();
            for (point, pairs) in level.representatives {
                let mut set = OrderedSet::new();
                for (permutation, word) in pairs {
                    if let Some(rep) = stored_representative(group, base_point, point, &permutation, &word)? {
                        set.insert(rep);
                    }
                }
                if !set.is_empty() {
                    representatives.insert(point, set);
                }
            }
            Ok(ExtendedLevel::new(level.orbit, representatives))
        })
        .collect::<std::result::Result<Vec<_>, PersistenceError>>()?;
    Ok(ExtendedMinkwitzChain::from_levels(group.degree(), levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        group::tests::{coxeter_b3, symmetric_group},
        minkwitz::TrainingContext,
        random::rng,
        simplify::RuleSet,
    };

    #[test]
    fn untrained_chains_keep_their_gaps() {
        let group = symmetric_group();
        let chain = MinkwitzChain::new(group.stabilizer_chain());
        let xml = chain.to_xml(&group);
        let mut written = String::new();
        chain.write_xml(&group, &mut written).unwrap();
        assert_eq!(written, xml);
        assert!(xml.starts_with(XML_HEADER));
        assert!(xml.contains("\t\t[0,"));
        assert!(xml.contains("<representative of='0'>"));
        assert!(xml.contains("[]"));
        let loaded = read_minkwitz(&group, &xml).unwrap();
        assert_eq!(loaded, chain);
        assert_eq!(loaded.missing(), 10);
    }

    #[test_log::test]
    fn trained_chains_are_restored() {
        let group = coxeter_b3();
        let rules = RuleSet::generate(&group, None);
        let mut chain = MinkwitzChain::new(group.stabilizer_chain());
        let mut extended = ExtendedMinkwitzChain::new(group.stabilizer_chain());
        let mut rng = rng(Some(2));
        let mut context = TrainingContext::new(&rules, &mut rng).with_branching(2);
        for element in group.cayley_graph(Some(30)) {
            chain.train(element.clone(), &rules);
            extended.train(element, &mut context);
        }
        assert_eq!(read_minkwitz(&group, &chain.to_xml(&group)).unwrap(), chain);
        assert_eq!(read_extended(&group, &extended.to_xml(&group)).unwrap(), extended);
    }

    #[test]
    fn documents_of_other_groups_are_rejected() {
        let chain = MinkwitzChain::new(coxeter_b3().stabilizer_chain());
        let xml = chain.to_xml(&coxeter_b3());
        assert!(matches!(
            read_minkwitz(&symmetric_group(), &xml),
            Err(PersistenceError::Malformed(_))
        ));
        assert!(read_minkwitz(&symmetric_group(), "<stabilizer><orbit>[0,1]").is_err());
        assert!(matches!(
            read_minkwitz(&symmetric_group(), "<stabilizer><table/></stabilizer>"),
            Err(PersistenceError::Malformed(_))
        ));
    }

    #[test]
    fn tampered_words_are_detected() {
        let group = symmetric_group();
        let mut chain = MinkwitzChain::new(group.stabilizer_chain());
        chain.train(group.parse_element("a").unwrap(), &RuleSet::new());
        let xml = chain.to_xml(&group).replace("\t\t\t\ta\n", "\t\t\t\tb\n");
        assert!(matches!(
            read_minkwitz(&group, &xml),
            Err(PersistenceError::Malformed(_))
        ));
    }
}
