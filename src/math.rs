use std::collections::BTreeSet;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// An ordered set, used where iteration order carries meaning, e.g. for ranked representatives.
pub type OrderedSet<S> = BTreeSet<S>;

/// Computes the least common multiple of the given numbers, `1` for an empty iterator. Zeros
/// are skipped.
pub fn lcm<I: IntoIterator<Item = usize>>(numbers: I) -> usize {
    numbers
        .into_iter()
        .filter(|&n| n != 0)
        .fold(1, |acc, n| num_integer::lcm(acc, n))
}

#[cfg(test)]
mod tests {
    #[test]
    fn lcm_of_cycle_lengths() {
        assert_eq!(super::lcm([2, 3, 4]), 12);
        assert_eq!(super::lcm([5]), 5);
        assert_eq!(super::lcm(std::iter::empty()), 1);
        assert_eq!(super::lcm([0, 4, 6]), 12);
    }
}
