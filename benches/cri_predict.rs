use criterion::{criterion_group, criterion_main, Criterion};

use scoreline::mc;
use scoreline::params::FittedParameters;
use scoreline::predict::predict;
use scoreline::scoregrid;
use scoreline::team::Teams;
use scoreline::DEFAULT_MAX_GOALS;

fn criterion_benchmark(c: &mut Criterion) {
    let params = FittedParameters::new(
        Teams::from_names(["Atlas", "Club America", "Cruz Azul", "Toluca"]).unwrap(),
        vec![0.8, 1.5, 1.1, 0.95],
        vec![1.2, 0.7, 0.95, 1.05],
        1.3,
    );

    // sanity check
    let prediction = predict("Club America", "Atlas", &params, DEFAULT_MAX_GOALS).unwrap();
    assert!(prediction.home_win > prediction.away_win);

    c.bench_function("cri_predict_5", |b| {
        b.iter(|| predict("Club America", "Atlas", &params, DEFAULT_MAX_GOALS).unwrap());
    });

    c.bench_function("cri_predict_10", |b| {
        b.iter(|| predict("Club America", "Atlas", &params, 10).unwrap());
    });

    c.bench_function("cri_scoreline_matrix_10", |b| {
        b.iter(|| scoregrid::scoreline_matrix(2.34, 0.72, 10));
    });

    c.bench_function("cri_mc_10k", |b| {
        b.iter(|| mc::monte_carlo_outcome(2.34, 0.72, 10_000, 42));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
