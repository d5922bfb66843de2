use tracing::debug;

use crate::{
    algebra::{Permutation, Point},
    alphabet::{Alphabet, Letter},
    word::Word,
};

/// Creates the pseudo random generator that is threaded through all randomized computations.
/// Without a seed, the generator is seeded from the environment.
pub fn rng(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => {
            debug!("using fixed seed {seed}");
            fastrand::Rng::with_seed(seed)
        }
        None => fastrand::Rng::new(),
    }
}

/// Draws a uniformly random letter, that is a random generator which is inverted on a coin flip.
pub fn random_letter(rng: &mut fastrand::Rng, alphabet: &Alphabet) -> Letter {
    let generator = rng.usize(..alphabet.len());
    if rng.bool() {
        Letter::inverted(generator)
    } else {
        Letter::forward(generator)
    }
}

/// A word of exactly `length` random letters.
pub fn random_word(rng: &mut fastrand::Rng, alphabet: &Alphabet, length: usize) -> Word {
    (0..length).map(|_| random_letter(rng, alphabet)).collect()
}

/// A uniformly random permutation of the given degree, not necessarily in any particular group.
pub fn random_permutation(rng: &mut fastrand::Rng, degree: usize) -> Permutation {
    let mut images: Vec<Point> = (0..degree).map(|p| p as Point).collect();
    rng.shuffle(&mut images);
    Permutation::from_images(images).unwrap_or_else(|_| Permutation::identity(degree))
}

/// Picks `amount` distinct positions out of `0..len` uniformly at random and returns them in
/// increasing order. If `amount` is at least `len`, all positions are returned.
pub fn sample_positions(rng: &mut fastrand::Rng, len: usize, amount: usize) -> Vec<usize> {
    let mut positions = rng.choose_multiple(0..len, amount);
    positions.sort_unstable();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Set;

    #[test]
    fn seeded_generators_repeat() {
        let alphabet = Alphabet::new([
            ('a', "(0 1 2)".parse().unwrap()),
            ('b', "(1 2)".parse().unwrap()),
        ])
        .unwrap();
        let first = random_word(&mut rng(Some(3)), &alphabet, 30);
        let second = random_word(&mut rng(Some(3)), &alphabet, 30);
        assert_eq!(first, second);
        assert_eq!(first.len(), 30);
    }

    #[test]
    fn samples_are_distinct() {
        let mut rng = rng(Some(11));
        for len in 0..8 {
            for amount in 0..10 {
                let sample = sample_positions(&mut rng, len, amount);
                assert_eq!(sample.len(), amount.min(len));
                assert!(sample.windows(2).all(|w| w[0] < w[1]));
                assert!(sample.iter().all(|&p| p < len));
            }
        }
    }

    #[test]
    fn random_permutations_are_bijections() {
        let mut rng = rng(Some(5));
        let mut seen = Set::default();
        for _ in 0..50 {
            let p = random_permutation(&mut rng, 6);
            assert_eq!(p.degree(), 6);
            assert!((&p * &p.inverse()).is_identity());
            seen.insert(p);
        }
        assert!(seen.len() > 1);
    }
}
