use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siq_core::SampleSet;
use siq_spatial::NearestNeighborIndex;

fn random_set(count: usize, dim: usize, seed: u64) -> SampleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<f64> = (0..count * dim).map(|_| rng.random_range(0.0..1.0)).collect();
    SampleSet::from_flat(dim, points).unwrap()
}

fn bench_knn(c: &mut Criterion) {
    let reference = random_set(10_000, 3, 1);
    let queries = random_set(100_000, 3, 2);

    c.bench_function("build_10k_3d", |b| {
        b.iter(|| black_box(NearestNeighborIndex::build(&reference).unwrap()))
    });

    let index = NearestNeighborIndex::build(&reference).unwrap();
    c.bench_function("query_100k_against_10k_3d", |b| {
        b.iter(|| black_box(index.query_nearest(&queries).unwrap()))
    });
}

criterion_group!(benches, bench_knn);
criterion_main!(benches);
