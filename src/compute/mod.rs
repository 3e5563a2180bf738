//! Compute module - Maze, agents, pursuers and the neural controller.

mod agent;
mod brain;
mod episode;
mod geometry;
mod grid;
mod pursuer;
mod rng;
mod sensor;

pub mod evolution;

pub use agent::*;
pub use brain::*;
pub use episode::*;
pub use geometry::*;
pub use grid::*;
pub use pursuer::*;
pub use rng::*;
pub use sensor::*;
