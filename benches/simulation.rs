//! Benchmarks for game simulation and Monte Carlo batches.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use diamond_sim::{
    compute::{GameSimulator, calibration::FitnessEvaluator},
    schema::{EvaluationConfig, OutcomeWeights, Roster, SimulationConfig, TargetDistribution},
};

fn simulator() -> GameSimulator {
    let config = SimulationConfig {
        random_seed: Some(42),
        ..Default::default()
    };
    GameSimulator::new(Roster::example(), &config).expect("example roster is valid")
}

fn bench_simulate_game(c: &mut Criterion) {
    let mut sim = simulator();

    c.bench_function("simulate_game_9", |b| {
        b.iter(|| black_box(sim.simulate_game(black_box(9))))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");

    for games in [10, 100, 1000] {
        let mut sim = simulator();
        group.bench_with_input(BenchmarkId::from_parameter(games), &games, |b, &games| {
            b.iter(|| black_box(sim.monte_carlo_game_simulation(games, 9)));
        });
    }

    group.finish();
}

fn bench_fitness_evaluation(c: &mut Criterion) {
    let evaluator = FitnessEvaluator::new(
        Roster::example(),
        EvaluationConfig::default(),
        TargetDistribution::default(),
    );
    let weights = OutcomeWeights::default();
    let mut seed = 0u64;

    c.bench_function("fitness_evaluate_100_games", |b| {
        b.iter(|| {
            seed += 1;
            black_box(evaluator.evaluate(&weights, seed))
        })
    });
}

criterion_group!(
    benches,
    bench_simulate_game,
    bench_monte_carlo,
    bench_fitness_evaluation
);
criterion_main!(benches);
