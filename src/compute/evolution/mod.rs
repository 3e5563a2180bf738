//! Neuroevolution of maze-running brains.
//!
//! # Overview
//!
//! - **Evolver** (`evolver`): elitism, tournament selection, single-point
//!   crossover and uniform mutation over a scored population
//! - **Controller** (`controller`): runs one batch of episodes per
//!   generation and hands the finished batch to the evolver
//!
//! # Example
//!
//! ```rust,no_run
//! use maze_brain::compute::evolution::GenerationController;
//! use maze_brain::schema::SimulationConfig;
//!
//! let mut controller = GenerationController::new(SimulationConfig::default()).unwrap();
//! controller.set_on_generation_complete(|generation, best| {
//!     println!("Generation {}: best score so far = {:.1}", generation, best);
//! });
//!
//! controller.start();
//! for _ in 0..10_000 {
//!     controller.tick(1.0 / 60.0).unwrap();
//! }
//! ```

mod controller;
mod evolver;

pub use controller::{
    ControllerError, DeathCallback, GenerationCallback, GenerationController, ScoreCallback,
};
pub use evolver::{Evolver, EvolverError};
