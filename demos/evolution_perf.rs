//! Quick evolution performance test

use maze_brain::{
    GenerationController,
    schema::{EvolutionConfig, MazeConfig, SimulationConfig},
};
use std::time::Instant;

fn main() {
    println!("=== Evolution Performance Test ===\n");

    // Test different maze sizes
    for maze_size in [20, 30, 40] {
        println!("Maze size: {}x{}", maze_size, maze_size);

        let config = SimulationConfig {
            maze: MazeConfig {
                width: maze_size,
                height: maze_size,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };
        run(config, 5);
    }

    println!("=== Scalability Test (fixed 20x20 maze) ===\n");

    // Test different population sizes
    for pop_size in [8, 16, 32, 64] {
        println!("Population: {}", pop_size);

        let config = SimulationConfig {
            episodes: pop_size,
            evolution: EvolutionConfig {
                population_size: pop_size,
                elitism: (pop_size / 4).max(1),
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };
        run(config, 3);
    }
}

fn run(config: SimulationConfig, generations: usize) {
    let episodes = config.episodes;
    let start = Instant::now();
    let mut controller = match GenerationController::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("  Error: {}", e);
            return;
        }
    };

    for _ in 0..generations {
        if let Err(e) = controller.run_generation(1.0 / 60.0) {
            eprintln!("  Error: {}", e);
            return;
        }
    }
    let elapsed = start.elapsed();
    let evals_per_sec = (generations * episodes) as f64 / elapsed.as_secs_f64();

    println!("  Generations:    {}", controller.generation());
    println!("  Episodes:       {}", generations * episodes);
    println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
    println!("  Episodes/sec:   {:.1}", evals_per_sec);
    println!("  Best score:     {:.1}", controller.best_score());
    println!();
}
