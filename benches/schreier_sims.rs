use criterion::{black_box, criterion_group, criterion_main, Criterion};
use permgroup::prelude::*;

const CUBE: [&str; 6] = [
    "(1 3 7 5)(2 6 8 4)(9 33 25 17)(10 34 26 18)(11 35 27 19)(48)",
    "(13 21 29 37)(15 23 31 39)(16 24 32 40)(41 43 47 45)(42 46 48 44)",
    "(1 17 41 39)(4 20 44 38)(5 21 45 35)(9 11 15 13)(10 14 16 12)(48)",
    "(3 37 43 19)(6 36 46 22)(7 33 47 23)(25 27 31 29)(26 30 32 28)(48)",
    "(5 25 43 15)(7 29 41 11)(8 28 42 14)(17 19 23 21)(18 22 24 20)(48)",
    "(1 13 47 27)(2 12 48 30)(3 9 45 31)(33 35 39 37)(34 38 40 36)",
];

fn generators() -> Vec<Permutation> {
    CUBE.iter().map(|text| text.parse().unwrap()).collect()
}

fn stabilizer_chain(c: &mut Criterion) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let generators = generators();
    c.bench_function("cube stabilizer chain", |b| {
        b.iter(|| {
            let chain = StabilizerChain::build(49, black_box(generators.iter()), &[]);
            black_box(chain.order())
        })
    });
}

fn enumeration(c: &mut Criterion) {
    let group = PermutationGroup::builder("cube")
        .generators(generators())
        .build()
        .unwrap();
    c.bench_function("cube cayley prefix", |b| {
        b.iter(|| black_box(group.cayley_graph(Some(10_000)).count()))
    });
    c.bench_function("cube rules", |b| {
        b.iter(|| black_box(RuleSet::generate(&group, Some(200)).len()))
    });
}

criterion_group!(benches, stabilizer_chain, enumeration);
criterion_main!(benches);
