//! Benchmarks for the Life step function and survival evaluation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use life_search::{
    compute::{
        BoardState, DenseBoard, SurvivalCache,
        evolution::{BoardRng, FitnessEvaluator},
        step,
    },
    schema::Window,
};

fn random_states(size: usize, count: usize) -> Vec<BoardState> {
    let mut rng = BoardRng::new(42);
    (0..count).map(|_| rng.random_board(size).to_state()).collect()
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for size in [5, 16, 64] {
        let state = BoardRng::new(7).random_board(size).to_state();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &state,
            |b, state| {
                b.iter(|| step(black_box(state), None));
            },
        );
    }

    let r_pentomino = DenseBoard::from_ascii(".**\n**.\n.*.").to_state();
    group.bench_function("r_pentomino_windowed", |b| {
        b.iter(|| step(black_box(&r_pentomino), Some(Window::square(1000))));
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.sample_size(20);

    let states = random_states(5, 200);
    let evaluator = FitnessEvaluator::new(2000, Some(Window::square(200)));

    group.bench_function("no_cache", |b| {
        b.iter(|| {
            for state in &states {
                black_box(evaluator.evaluate(state, None));
            }
        });
    });

    group.bench_function("shared_cache", |b| {
        b.iter(|| {
            let cache = SurvivalCache::new();
            for state in &states {
                black_box(evaluator.evaluate(state, Some(&cache)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_evaluate);
criterion_main!(benches);
