//! One bounded play-through: a grid, an agent and its pursuers.
//!
//! The episode owns every piece of mutable state and lends it to the agent
//! and pursuers one step at a time. Time advances in whole fixed steps fed
//! by an accumulator, so results do not depend on the host frame rate.

use super::agent::Agent;
use super::brain::{Brain, BrainError};
use super::geometry::CellPos;
use super::grid::Grid;
use super::pursuer::{Pursuer, PursuerKind};
use super::rng::SimRng;
use crate::schema::SimulationConfig;

/// Single maze run.
#[derive(Debug, Clone)]
pub struct Episode {
    grid: Grid,
    agent: Agent,
    pursuers: Vec<Pursuer>,
    rng: SimRng,
    elapsed: f32,
    accumulator: f32,
    time_scale: f32,
    fixed_step: f32,
    time_budget: f32,
    max_steps_per_update: usize,
    game_over: bool,
}

impl Episode {
    /// Generate a fresh maze from `rng` and place the agent and pursuers.
    pub fn new(config: &SimulationConfig, brain: Brain, mut rng: SimRng) -> Result<Self, BrainError> {
        let grid = Grid::generate(&config.maze, &mut rng);
        let agent = Agent::new(grid.spawn(), brain, &config.agent, &config.scoring)?;

        let pursuers = pursuer_spawns(&grid)
            .into_iter()
            .zip(PursuerKind::ALL)
            .map(|(spawn, kind)| Pursuer::new(kind, spawn, &config.pursuers, &mut rng))
            .collect();

        Ok(Self {
            grid,
            agent,
            pursuers,
            rng,
            elapsed: 0.0,
            accumulator: 0.0,
            time_scale: config.time_scale,
            fixed_step: config.fixed_step,
            time_budget: config.time_budget,
            max_steps_per_update: config.max_steps_per_update,
            game_over: false,
        })
    }

    /// Advance by a host frame of `delta` seconds, scaled by the time scale.
    ///
    /// Returns the number of fixed steps run.
    pub fn update(&mut self, delta: f32) -> Result<usize, BrainError> {
        if self.game_over {
            return Ok(0);
        }
        let scaled = delta * self.time_scale;
        if !(scaled.is_finite() && scaled > 0.0) {
            return Ok(0);
        }

        self.accumulator += scaled;
        let mut steps = 0;
        while self.accumulator >= self.fixed_step && !self.game_over {
            if steps == self.max_steps_per_update {
                log::debug!(
                    "Dropping {:.3}s of backlog after {} steps",
                    self.accumulator,
                    steps
                );
                self.accumulator = 0.0;
                break;
            }
            self.step()?;
            self.accumulator -= self.fixed_step;
            steps += 1;
        }
        Ok(steps)
    }

    /// Run exactly one fixed step.
    pub fn step(&mut self) -> Result<(), BrainError> {
        if self.game_over {
            return Ok(());
        }

        self.elapsed += self.fixed_step;
        if self.elapsed >= self.time_budget {
            self.agent.expire();
            self.game_over = true;
            log::debug!("Episode timed out with score {:.1}", self.agent.score());
            return Ok(());
        }

        let dt = self.fixed_step;
        self.agent
            .update(dt, &mut self.grid, &mut self.pursuers, &mut self.rng)?;

        let target = self.agent.cell();
        for pursuer in &mut self.pursuers {
            pursuer.update(dt, target, &self.grid, &mut self.rng);
        }

        if !self.agent.is_alive() {
            self.game_over = true;
            log::debug!(
                "Agent caught after {:.2}s with score {:.1}",
                self.elapsed,
                self.agent.score()
            );
        }
        Ok(())
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.agent.is_alive()
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub fn score(&self) -> f32 {
        self.agent.score()
    }

    /// Simulated seconds elapsed.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn remaining_time(&self) -> f32 {
        (self.time_budget - self.elapsed).max(0.0)
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn brain(&self) -> &Brain {
        self.agent.brain()
    }

    /// Final score and brain, consuming the episode.
    pub fn into_result(self) -> (Brain, f32) {
        let score = self.agent.score();
        (self.agent.into_brain(), score)
    }
}

/// Interior corners, in [`PursuerKind::ALL`] order.
fn pursuer_spawns(grid: &Grid) -> [CellPos; 4] {
    let right = grid.width() as i32 - 2;
    let bottom = grid.height() as i32 - 2;
    [
        CellPos::new(1, 1),
        CellPos::new(right, 1),
        CellPos::new(1, bottom),
        CellPos::new(right, bottom),
    ]
}
