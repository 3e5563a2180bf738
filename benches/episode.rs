//! Benchmarks for maze generation, inference and episode stepping.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use maze_brain::{
    compute::{Brain, Episode, Grid, SimRng},
    schema::{MazeConfig, SimulationConfig},
};

fn bench_maze_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("maze_generation");

    for size in [20, 40, 80] {
        let config = MazeConfig {
            width: size,
            height: size,
            ..Default::default()
        };
        let mut rng = SimRng::new(42);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| Grid::generate(black_box(&config), &mut rng));
            },
        );
    }

    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("brain_infer");

    for hidden in [12, 32, 64] {
        let mut rng = SimRng::new(7);
        let brain = Brain::random(&[16, hidden, 4], &mut rng).unwrap();
        let input: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();

        group.bench_with_input(BenchmarkId::from_parameter(hidden), &hidden, |b, _| {
            b.iter(|| brain.infer(black_box(&input)).unwrap());
        });
    }

    group.finish();
}

fn bench_episode_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("episode_step");

    for size in [20, 40] {
        let config = SimulationConfig {
            maze: MazeConfig {
                width: size,
                height: size,
                ..Default::default()
            },
            time_budget: f32::MAX,
            ..Default::default()
        };
        let mut rng = SimRng::new(3);
        let brain = Brain::random(&config.evolution.layer_sizes, &mut rng).unwrap();
        let fresh = Episode::new(&config, brain, rng.fork()).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                let mut episode = fresh.clone();
                b.iter(|| {
                    if episode.is_game_over() {
                        episode = fresh.clone();
                    }
                    episode.step().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_maze_generation,
    bench_inference,
    bench_episode_step
);
criterion_main!(benches);
