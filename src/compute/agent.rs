//! The brain-driven agent: sensing, movement with collision, and scoring.

use std::collections::VecDeque;

use super::brain::{Brain, BrainError, argmax};
use super::geometry::{CellPos, Direction};
use super::grid::Grid;
use super::pursuer::Pursuer;
use super::rng::SimRng;
use super::sensor::sense;
use crate::schema::{AgentConfig, MOVE_OUTPUTS, SENSOR_INPUTS, ScoringConfig};

/// Outcome of a single movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Destination cell is a wall; the agent snapped back and was penalized.
    HitWall,
    /// Footprint corner clipped a wall; the agent snapped back.
    Clipped,
}

/// Maze runner controlled by an owned [`Brain`].
#[derive(Debug, Clone)]
pub struct Agent {
    x: f32,
    y: f32,
    facing: Option<Direction>,
    score: f32,
    alive: bool,
    power_remaining: f32,
    brain: Brain,
    stationary_time: f32,
    history: VecDeque<CellPos>,
    last_goal_distance: Option<u32>,
    config: AgentConfig,
    scoring: ScoringConfig,
}

impl Agent {
    /// Place an agent at the center of `spawn`.
    ///
    /// The brain must map the 16 sensor features onto 4 move outputs.
    pub fn new(
        spawn: CellPos,
        brain: Brain,
        config: &AgentConfig,
        scoring: &ScoringConfig,
    ) -> Result<Self, BrainError> {
        if brain.input_size() != SENSOR_INPUTS {
            return Err(BrainError::InputSizeMismatch {
                expected: SENSOR_INPUTS,
                actual: brain.input_size(),
            });
        }
        if brain.output_size() != MOVE_OUTPUTS {
            return Err(BrainError::InvalidTopology(brain.layer_sizes().to_vec()));
        }

        let (x, y) = spawn.center();
        Ok(Self {
            x,
            y,
            facing: None,
            score: 0.0,
            alive: true,
            power_remaining: 0.0,
            brain,
            stationary_time: 0.0,
            history: VecDeque::with_capacity(config.loop_window + 1),
            last_goal_distance: None,
            config: config.clone(),
            scoring: scoring.clone(),
        })
    }

    #[inline]
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn cell(&self) -> CellPos {
        CellPos::containing(self.x, self.y)
    }

    #[inline]
    pub fn facing(&self) -> Option<Direction> {
        self.facing
    }

    /// Cumulative score; may be negative.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.power_remaining > 0.0
    }

    #[inline]
    pub fn power_remaining(&self) -> f32 {
        self.power_remaining
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn into_brain(self) -> Brain {
        self.brain
    }

    /// Sense, decide and act for one step of `dt` seconds.
    pub fn update(
        &mut self,
        dt: f32,
        grid: &mut Grid,
        pursuers: &mut [Pursuer],
        rng: &mut SimRng,
    ) -> Result<(), BrainError> {
        if !self.alive {
            return Ok(());
        }
        let direction = self.decide(grid, pursuers)?;
        self.act(direction, dt, grid, pursuers, rng);
        Ok(())
    }

    /// Direction with the strongest brain output for the current view.
    pub fn decide(&self, grid: &Grid, pursuers: &[Pursuer]) -> Result<Direction, BrainError> {
        let occupied: Vec<CellPos> = pursuers.iter().map(Pursuer::cell).collect();
        let features = sense(self.cell(), grid, &occupied, self.config.vision_range);
        let outputs = self.brain.infer(&features)?;
        Ok(Direction::from_index(argmax(&outputs).unwrap_or(0)))
    }

    /// Move in `direction` and apply every scoring rule for this step.
    pub fn act(
        &mut self,
        direction: Direction,
        dt: f32,
        grid: &mut Grid,
        pursuers: &mut [Pursuer],
        rng: &mut SimRng,
    ) {
        if !self.alive {
            return;
        }
        if self.power_remaining > 0.0 {
            self.power_remaining = (self.power_remaining - dt).max(0.0);
        }

        let (px, py) = (self.x, self.y);
        self.facing = Some(direction);
        if self.try_move(direction, grid) == MoveOutcome::HitWall {
            self.score -= self.scoring.wall_penalty;
        }

        self.score_motion(px, py, dt);
        self.score_loop();
        self.score_goal_distance(grid);
        self.collect(grid);
        self.resolve_contacts(pursuers, rng);
    }

    /// Timeout: the agent stops without a death penalty.
    pub fn expire(&mut self) {
        self.alive = false;
    }

    fn try_move(&mut self, direction: Direction, grid: &Grid) -> MoveOutcome {
        let current = self.cell();
        let (dx, dy) = direction.delta();
        let nx = self.x + dx as f32 * self.config.speed;
        let ny = self.y + dy as f32 * self.config.speed;

        if grid.is_wall(CellPos::containing(nx, ny)) {
            (self.x, self.y) = current.center();
            return MoveOutcome::HitWall;
        }

        let r = self.config.footprint_radius;
        let corners = [(nx - r, ny - r), (nx + r, ny - r), (nx - r, ny + r), (nx + r, ny + r)];
        if corners
            .iter()
            .any(|&(cx, cy)| grid.is_wall(CellPos::containing(cx, cy)))
        {
            (self.x, self.y) = current.center();
            return MoveOutcome::Clipped;
        }

        self.x = nx;
        self.y = ny;
        MoveOutcome::Moved
    }

    fn score_motion(&mut self, px: f32, py: f32, dt: f32) {
        let eps = self.config.idle_epsilon;
        if (self.x - px).abs() < eps && (self.y - py).abs() < eps {
            self.stationary_time += dt;
            if self.stationary_time > self.config.idle_grace {
                self.score -= self.scoring.idle_penalty_per_second * dt;
            }
        } else {
            self.stationary_time = 0.0;
            self.score += self.scoring.move_reward_per_second * dt;
        }
    }

    fn score_loop(&mut self) {
        let cell = self.cell();
        self.history.push_back(cell);
        while self.history.len() > self.config.loop_window {
            self.history.pop_front();
        }
        let occurrences = self.history.iter().filter(|c| **c == cell).count();
        if occurrences >= self.config.loop_threshold {
            self.score -= self.scoring.loop_penalty;
        }
    }

    fn score_goal_distance(&mut self, grid: &Grid) {
        let Some(distance) = grid.nearest_goal_distance(self.cell()) else {
            return;
        };
        if let Some(last) = self.last_goal_distance {
            if distance < last {
                self.score += self.scoring.approach_reward;
            } else if distance as f32 > last as f32 + self.scoring.distance_tolerance {
                self.score -= self.scoring.retreat_penalty;
            }
        }
        self.last_goal_distance = Some(distance);
    }

    fn collect(&mut self, grid: &mut Grid) {
        let cell = self.cell();
        if grid.collect_dot(cell) {
            self.score += self.scoring.dot_reward;
        }
        if grid.collect_bonus(cell) {
            self.score += self.scoring.bonus_reward;
            self.power_remaining = self.config.power_duration;
        }
    }

    fn resolve_contacts(&mut self, pursuers: &mut [Pursuer], rng: &mut SimRng) {
        let cell = self.cell();
        for pursuer in pursuers.iter_mut().filter(|p| p.cell() == cell) {
            if self.is_powered() {
                pursuer.reset(rng);
                self.score += self.scoring.pursuer_kill_reward;
            } else {
                self.alive = false;
                self.score -= self.scoring.death_penalty;
                break;
            }
        }
    }
}
