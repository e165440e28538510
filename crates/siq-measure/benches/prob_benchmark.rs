use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use siq_core::{Domain, SampleSet};
use siq_measure::{DensityInput, DensityWeights, InverseProblem, prob_mc};

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

fn grid_2d(domain: &Domain, per_dim: usize) -> SampleSet {
    let xs = linspace(domain.bounds()[0].0, domain.bounds()[0].1, per_dim);
    let ys = linspace(domain.bounds()[1].0, domain.bounds()[1].1, per_dim);
    let rows: Vec<Vec<f64>> = xs
        .iter()
        .flat_map(|&x| ys.iter().map(move |&y| vec![x, y]))
        .collect();
    SampleSet::from_rows(&rows).unwrap()
}

fn bench_prob_mc(c: &mut Criterion) {
    let lam_domain = Domain::new(vec![(0.0, 1.0), (0.0, 1.0)]).unwrap();
    let samples = grid_2d(&lam_domain, 10);
    let reference = grid_2d(&lam_domain, 8);
    let inputs = InverseProblem {
        samples: &samples,
        data: &samples,
        data_reference: &reference,
        lam_domain: &lam_domain,
    };

    c.bench_function("prob_mc_100_samples_100k_emulation", |b| {
        b.iter(|| {
            let density =
                DensityInput::Weights(DensityWeights::uniform(reference.len()).unwrap());
            black_box(prob_mc(&inputs, density, 100_000, 42).unwrap())
        })
    });
}

criterion_group!(benches, bench_prob_mc);
criterion_main!(benches);
