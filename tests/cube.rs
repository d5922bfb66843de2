use lazy_static::lazy_static;
use num_bigint::BigUint;
use permgroup::prelude::*;

const FACES: [(char, &str); 6] = [
    ('T', "(1 3 7 5)(2 6 8 4)(9 33 25 17)(10 34 26 18)(11 35 27 19)(48)"),
    ('D', "(13 21 29 37)(15 23 31 39)(16 24 32 40)(41 43 47 45)(42 46 48 44)"),
    ('L', "(1 17 41 39)(4 20 44 38)(5 21 45 35)(9 11 15 13)(10 14 16 12)(48)"),
    ('R', "(3 37 43 19)(6 36 46 22)(7 33 47 23)(25 27 31 29)(26 30 32 28)(48)"),
    ('F', "(5 25 43 15)(7 29 41 11)(8 28 42 14)(17 19 23 21)(18 22 24 20)(48)"),
    ('B', "(1 13 47 27)(2 12 48 30)(3 9 45 31)(33 35 39 37)(34 38 40 36)"),
];

const SUPERFLIP: &str =
    "(2 34)(4 10)(6 26)(8 18)(12 38)(14 20)(16 44)(22 28)(24 42)(30 36)(32 46)(40 48)";

fn cube() -> PermutationGroup {
    let builder = FACES.iter().fold(
        PermutationGroup::builder("Rubik's Cube Group").prefer(|p| p % 2 == 1),
        |builder, (symbol, text)| {
            let inverse = symbol.to_ascii_lowercase().to_string();
            let quarter = symbol.to_string();
            builder
                .generator(*symbol, text.parse().unwrap())
                .shortcut(&quarter.repeat(3), &inverse)
                .shortcut(&inverse.repeat(3), &quarter)
        },
    );
    builder.build().unwrap()
}

lazy_static! {
    static ref CUBE: PermutationGroup = cube();
}

#[test_log::test]
fn cube_group_has_the_expected_order() {
    assert_eq!(CUBE.degree(), 49);
    assert_eq!(
        CUBE.order(),
        "43252003274489856000".parse::<BigUint>().unwrap()
    );
    assert_eq!(
        CUBE.base().to_string(),
        "[1, 13, 5, 7, 23, 15, 12, 8, 14, 24, 16, 3, 6, 4, 2, 22, 30, 32]"
    );
}

#[test]
fn membership() {
    assert!(CUBE.contains(&SUPERFLIP.parse().unwrap()));
    // a single edge flip, and swapping facelets of different pieces
    assert!(!CUBE.contains(&"(2 34)".parse().unwrap()));
    assert!(!CUBE.contains(&"(1 3)(2 4)".parse().unwrap()));

    let mut rng = permgroup::random::rng(Some(12));
    for _ in 0..20 {
        let element = CUBE.random_element(&mut rng, 40);
        assert!(CUBE.contains(element.permutation()));
        assert!(element.is_consistent(CUBE.alphabet()));
        assert!(CUBE.contains(&CUBE.random_permutation(&mut rng)));
    }
}

#[test]
fn quarter_turn_shortcuts() {
    let alphabet = CUBE.alphabet();
    let word = alphabet.parse_word("TTTT RRR Ff").unwrap();
    let simplified = CUBE.simplify_word(&word);
    assert_eq!(alphabet.render(&simplified), "r");
    assert_eq!(
        CUBE.word_to_element(&word).permutation(),
        CUBE.word_to_element(&simplified).permutation()
    );
}

#[test_log::test]
fn short_training_factors_reliably() {
    let rules = RuleSet::generate(&CUBE, Some(100));
    let mut rng = permgroup::random::rng(Some(4));
    let mut context = TrainingContext::new(&rules, &mut rng).with_branching(1);
    let mut chain = ExtendedMinkwitzChain::new(CUBE.stabilizer_chain());
    let missing = chain.missing();
    for element in CUBE.cayley_graph(Some(500)) {
        chain.train(element, &mut context);
    }
    assert!(chain.missing() < missing);
    assert!(chain.is_consistent(CUBE.alphabet()));

    let mut factored = 0;
    for element in CUBE.cayley_graph(Some(200)) {
        match factor_extended(&chain, element.permutation(), &rules, 0) {
            Ok(factorization) => {
                factored += 1;
                assert_eq!(factorization.candidates().len(), 1);
                for candidate in factorization.candidates() {
                    assert_eq!(
                        CUBE.word_to_element(candidate.word()).permutation(),
                        element.permutation()
                    );
                }
            }
            Err(error) => assert!(matches!(
                error,
                FactorizationError::MissingRepresentative { .. }
            )),
        }
    }
    assert!(factored > 0);
}
