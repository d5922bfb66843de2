use std::{
    collections::VecDeque,
    io::{BufRead, Lines, Write},
};

use tracing::{debug, warn};

use crate::{algebra::Base, element::GroupElement, group::PermutationGroup, math::Set};

/// Breadth-first enumeration of the Cayley graph of a group, starting from the identity.
///
/// Elements are deduplicated by the image of the group's base, which identifies group elements
/// uniquely. Consequently every element is produced exactly once, with a word that is as short as
/// possible. With a cap, at most that many elements are discovered; everything that was already
/// queued is still produced.
pub struct CayleyIterator<'a> {
    group: &'a PermutationGroup,
    base: Base,
    seen: Set<Base>,
    queue: VecDeque<GroupElement>,
    cap: Option<usize>,
    limit_reached: bool,
    recorder: Option<Box<dyn Write + 'a>>,
}

impl<'a> CayleyIterator<'a> {
    /// Starts the enumeration at the identity of `group`.
    pub fn new(group: &'a PermutationGroup, cap: Option<usize>) -> Self {
        let base = group.base();
        let identity = group.identity();
        let seen = Set::from_iter([base.action(identity.permutation())]);
        let limit_reached = cap.is_some_and(|cap| seen.len() >= cap);
        Self {
            group,
            base,
            seen,
            queue: VecDeque::from([identity]),
            cap,
            limit_reached,
            recorder: None,
        }
    }

    /// Writes the word of every produced element except the leading identity to `writer`, one
    /// per line. Failing writes are logged and end the recording.
    pub fn record_to<W: Write + 'a>(mut self, writer: W) -> Self {
        self.recorder = Some(Box::new(writer));
        self
    }

    /// Number of distinct elements discovered so far.
    pub fn discovered(&self) -> usize {
        self.seen.len()
    }

    /// Returns true once the cap prevents further discoveries.
    pub fn is_limit_reached(&self) -> bool {
        self.limit_reached
    }

    fn record(&mut self, element: &GroupElement) {
        if element.word().is_empty() {
            return;
        }
        if let Some(recorder) = self.recorder.as_mut() {
            let line = self.group.alphabet().render(element.word());
            if let Err(e) = writeln!(recorder, "{line}") {
                warn!("stopped recording the enumeration: {e}");
                self.recorder = None;
            }
        }
    }
}

impl<'a> Iterator for CayleyIterator<'a> {
    type Item = GroupElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.queue.pop_front()?;
        if !self.limit_reached {
            let group = self.group;
            for letter in group.alphabet().letters() {
                let next = element.push(group.alphabet(), letter);
                if self.seen.insert(self.base.action(next.permutation())) {
                    self.queue.push_back(next);
                    if self.cap.is_some_and(|cap| self.seen.len() >= cap) {
                        debug!("enumeration reached its cap of {} elements", self.seen.len());
                        self.limit_reached = true;
                        break;
                    }
                }
            }
        }
        self.record(&element);
        Some(element)
    }
}

/// Replays a previously recorded enumeration: first the identity, then the element of every
/// recorded word in order. Lines that cannot be parsed are logged and skipped.
pub struct Replay<'a> {
    group: &'a PermutationGroup,
    lines: Lines<Box<dyn BufRead + 'a>>,
    started: bool,
}

impl<'a> Replay<'a> {
    /// Replays the words read from `reader`.
    pub fn new<R: BufRead + 'a>(group: &'a PermutationGroup, reader: R) -> Self {
        let boxed: Box<dyn BufRead + 'a> = Box::new(reader);
        Self {
            group,
            lines: boxed.lines(),
            started: false,
        }
    }
}

impl<'a> Iterator for Replay<'a> {
    type Item = GroupElement;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(self.group.identity());
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!("could not read recorded enumeration: {e}");
                    return None;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.group.parse_element(line) {
                Ok(element) => return Some(element),
                Err(e) => warn!("skipping recorded word \"{line}\": {e}"),
            }
        }
    }
}

/// An enumeration of group elements, either computed by breadth-first search or replayed.
pub enum Enumeration<'a> {
    /// Computed on the fly.
    Search(CayleyIterator<'a>),
    /// Read back from a recording.
    Replay(Replay<'a>),
}

impl<'a> Iterator for Enumeration<'a> {
    type Item = GroupElement;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Enumeration::Search(search) => search.next(),
            Enumeration::Replay(replay) => replay.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::group::tests::{coxeter_b3, symmetric_group};

    #[test_log::test]
    fn enumerates_every_element_once() {
        let group = symmetric_group();
        let elements = group.cayley_graph(None).collect_vec();
        assert_eq!(elements.len(), 120);
        assert!(elements[0].word().is_empty());
        assert!(elements
            .iter()
            .map(|e| e.permutation())
            .all_unique());
        assert!(elements
            .windows(2)
            .all(|w| w[0].word_len() <= w[1].word_len()));
        assert!(elements.iter().all(|e| e.is_consistent(group.alphabet())));
    }

    #[test]
    fn base_images_are_injective() {
        let group = coxeter_b3();
        let base = group.base();
        let elements = group.cayley_graph(Some(40)).collect_vec();
        assert_eq!(elements.len(), 40);
        assert!(elements
            .iter()
            .map(|e| base.action(e.permutation()))
            .all_unique());
        assert_eq!(group.cayley_graph(None).count(), 48);
    }

    #[test]
    fn cap_bounds_discoveries() {
        let group = symmetric_group();
        let mut search = group.cayley_graph(Some(10));
        assert_eq!(search.by_ref().count(), 10);
        assert!(search.is_limit_reached());
        assert_eq!(search.discovered(), 10);
        assert_eq!(group.cayley_graph(Some(1)).count(), 1);
    }

    #[test]
    fn recorded_enumeration_replays() {
        let group = symmetric_group();
        let mut buffer = vec![];
        let original = group
            .cayley_graph(Some(30))
            .record_to(&mut buffer)
            .collect_vec();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 29);

        let replayed = Replay::new(&group, text.as_bytes()).collect_vec();
        assert_eq!(replayed, original);

        let noisy = format!("ab\n\nxyz\n{}", text.lines().next().unwrap());
        assert_eq!(Replay::new(&group, noisy.as_bytes()).count(), 3);
    }
}
