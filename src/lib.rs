//! Maze Brain - Neuroevolution of maze-running agents.
//!
//! Small feed-forward networks steer agents through procedurally generated
//! mazes while scripted pursuers hunt them. Each generation runs a batch of
//! episodes; the final scores rank the brains, and a genetic algorithm breeds
//! the next batch.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and run-report types
//! - `compute`: Maze generation, sensing, movement, pursuers, networks and
//!   the evolutionary loop
//!
//! # Example
//!
//! ```rust,no_run
//! use maze_brain::{
//!     compute::{Brain, Episode, SimRng},
//!     schema::SimulationConfig,
//! };
//!
//! let config = SimulationConfig::default();
//! let mut rng = SimRng::new(7);
//!
//! // Play one episode with a random brain
//! let brain = Brain::random(&config.evolution.layer_sizes, &mut rng).unwrap();
//! let mut episode = Episode::new(&config, brain, rng.fork()).unwrap();
//! while !episode.is_game_over() {
//!     episode.update(1.0 / 60.0).unwrap();
//! }
//!
//! println!("Final score: {:.1}", episode.score());
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::evolution::GenerationController;
pub use compute::{Brain, Episode, Grid};
pub use schema::SimulationConfig;
