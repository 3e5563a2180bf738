//! Maze Brain CLI - Evolve maze runners headlessly from JSON configuration.

use std::fs;
use std::path::Path;
use std::time::Instant;

use maze_brain::{compute::evolution::GenerationController, schema::SimulationConfig};

/// Host frame length used to drive the controller.
const FRAME_DELTA: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).is_some_and(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return;
    }

    if args.get(1).is_some_and(|a| a == "--example") {
        print_example_config();
        return;
    }

    let config = match args.get(1) {
        Some(path) => load_config(Path::new(path)),
        None => SimulationConfig::default(),
    };
    let generations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);

    println!("Maze Brain Evolution");
    println!("====================");
    println!("Maze: {}x{}", config.maze.width, config.maze.height);
    println!(
        "Episodes: {} per generation, {:.1}s budget",
        config.episodes, config.time_budget
    );
    println!("Brain layers: {:?}", config.evolution.layer_sizes);
    println!("Generations: {}", generations);
    println!();

    let mut controller = GenerationController::new(config).unwrap_or_else(|e| {
        eprintln!("Error creating simulation: {}", e);
        std::process::exit(1);
    });

    println!("Running evolution...");
    let start = Instant::now();

    for _ in 0..generations {
        let summary = controller.run_generation(FRAME_DELTA).unwrap_or_else(|e| {
            eprintln!("Simulation error: {}", e);
            std::process::exit(1);
        });
        println!(
            "  Generation {}: best={:.1}, avg={:.1}, best_ever={:.1}",
            summary.generation, summary.best, summary.average, summary.best_ever
        );
    }

    let elapsed = start.elapsed();
    println!();
    println!("Completed {} generations in {:.2?}", generations, elapsed);
    println!("Best score: {:.1}", controller.best_score());
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json] [generations]", program);
    eprintln!();
    eprintln!("Evolve neural maze runners without a display.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to simulation configuration file (default settings if omitted)");
    eprintln!("  generations  Number of generations to run (default: 10)");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn load_config(path: &Path) -> SimulationConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn print_example_config() {
    let config = SimulationConfig {
        random_seed: Some(42),
        ..Default::default()
    };

    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
