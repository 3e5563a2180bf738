//! Scripted pursuers that chase the agent through the maze.
//!
//! Each kind resolves once into a [`PursuerProfile`] (speed plus targeting
//! rule). All kinds share the same movement discipline: travel between cell
//! centers, never reverse at a junction unless forced, and steer greedily by
//! Manhattan distance except while scattering.

use super::geometry::{CellPos, Direction};
use super::grid::Grid;
use super::rng::SimRng;
use crate::schema::PursuerConfig;

/// Behaviour profile tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PursuerKind {
    /// Always heads for the agent's cell.
    Chase,
    /// Heads for a point a few cells away from the agent.
    Intercept,
    /// Chases, with occasional random turns.
    NoisyChase,
    /// Chases, with frequent random turns.
    Mixed,
}

impl PursuerKind {
    /// Spawn order: one pursuer of each kind per episode.
    pub const ALL: [PursuerKind; 4] = [
        PursuerKind::Chase,
        PursuerKind::Intercept,
        PursuerKind::NoisyChase,
        PursuerKind::Mixed,
    ];

    /// Resolve the speed and targeting rule for this kind.
    pub fn profile(self, config: &PursuerConfig) -> PursuerProfile {
        match self {
            PursuerKind::Chase => PursuerProfile {
                speed: config.chase_speed,
                targeting: Targeting::Direct,
            },
            PursuerKind::Intercept => PursuerProfile {
                speed: config.intercept_speed,
                targeting: Targeting::Intercept {
                    lookahead: config.intercept_lookahead,
                },
            },
            PursuerKind::NoisyChase => PursuerProfile {
                speed: config.noisy_chase_speed,
                targeting: Targeting::Noisy {
                    random_chance: config.noisy_chase_random,
                },
            },
            PursuerKind::Mixed => PursuerProfile {
                speed: config.mixed_speed,
                targeting: Targeting::Noisy {
                    random_chance: config.mixed_random,
                },
            },
        }
    }
}

/// How a pursuer picks its target at a junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Targeting {
    Direct,
    /// Agent cell shifted `lookahead` cells in a random direction.
    Intercept { lookahead: i32 },
    /// Direct chase, replaced by a random turn with `random_chance`.
    Noisy { random_chance: f32 },
}

/// Speed (cells per second) and targeting rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuerProfile {
    pub speed: f32,
    pub targeting: Targeting,
}

/// A pursuer on the grid.
#[derive(Debug, Clone)]
pub struct Pursuer {
    kind: PursuerKind,
    profile: PursuerProfile,
    x: f32,
    y: f32,
    direction: Direction,
    spawn: CellPos,
    scatter_remaining: f32,
    scatter_min: f32,
    scatter_max: f32,
    scatter_chance_per_second: f32,
}

impl Pursuer {
    /// Place a pursuer at the center of `spawn`, scattering.
    pub fn new(kind: PursuerKind, spawn: CellPos, config: &PursuerConfig, rng: &mut SimRng) -> Self {
        let (x, y) = spawn.center();
        let mut pursuer = Self {
            kind,
            profile: kind.profile(config),
            x,
            y,
            direction: Direction::Up,
            spawn,
            scatter_remaining: 0.0,
            scatter_min: config.scatter_min,
            scatter_max: config.scatter_max,
            scatter_chance_per_second: config.scatter_chance_per_second,
        };
        pursuer.reset(rng);
        pursuer
    }

    /// Return to spawn with a random heading and a fresh scatter window.
    pub fn reset(&mut self, rng: &mut SimRng) {
        (self.x, self.y) = self.spawn.center();
        self.direction = Direction::from_index(rng.index(4));
        self.enter_scatter(rng);
    }

    fn enter_scatter(&mut self, rng: &mut SimRng) {
        self.scatter_remaining = rng.uniform(self.scatter_min, self.scatter_max);
    }

    #[inline]
    pub fn kind(&self) -> PursuerKind {
        self.kind
    }

    #[inline]
    pub fn profile(&self) -> &PursuerProfile {
        &self.profile
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
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_scattering(&self) -> bool {
        self.scatter_remaining > 0.0
    }

    /// Advance by `dt` simulated seconds.
    pub fn update(&mut self, dt: f32, agent_cell: CellPos, grid: &Grid, rng: &mut SimRng) {
        if self.scatter_remaining > 0.0 {
            self.scatter_remaining = (self.scatter_remaining - dt).max(0.0);
        } else if rng.chance(self.scatter_chance_per_second * dt) {
            self.enter_scatter(rng);
        }

        let step = self.profile.speed * dt;
        let cell = self.cell();
        let (cx, cy) = cell.center();
        let tolerance = step * 0.5 + 1e-4;

        if (self.x - cx).abs() <= tolerance && (self.y - cy).abs() <= tolerance {
            self.x = cx;
            self.y = cy;
            self.direction = self.choose_direction(cell, agent_cell, grid, rng);
        }

        let (dx, dy) = self.direction.delta();
        let nx = self.x + dx as f32 * step;
        let ny = self.y + dy as f32 * step;

        // Leading edge of the body, half a cell ahead of the center.
        let ahead = CellPos::containing(nx + dx as f32 * 0.5, ny + dy as f32 * 0.5);
        if grid.is_wall(ahead) {
            self.x = cx;
            self.y = cy;
            let turn = 1 + rng.index(3);
            self.direction = Direction::from_index(self.direction.index() + turn);
            return;
        }

        self.x = nx;
        self.y = ny;
    }

    fn choose_direction(
        &self,
        cell: CellPos,
        agent_cell: CellPos,
        grid: &Grid,
        rng: &mut SimRng,
    ) -> Direction {
        let reverse = self.direction.opposite();
        let candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| *d != reverse && !grid.is_wall(cell.step(*d)))
            .collect();

        if candidates.is_empty() {
            return if grid.is_wall(cell.step(reverse)) {
                self.direction
            } else {
                reverse
            };
        }

        let target = if self.is_scattering() {
            None
        } else {
            self.target(agent_cell, grid, rng)
        };

        match target {
            Some(target) => candidates
                .into_iter()
                .min_by_key(|d| cell.step(*d).manhattan(target))
                .unwrap_or(self.direction),
            None => *rng.pick(&candidates).unwrap_or(&self.direction),
        }
    }

    /// Cell to steer toward, or `None` for a random turn.
    fn target(&self, agent_cell: CellPos, grid: &Grid, rng: &mut SimRng) -> Option<CellPos> {
        match self.profile.targeting {
            Targeting::Direct => Some(agent_cell),
            Targeting::Intercept { lookahead } => {
                let dir = Direction::from_index(rng.index(4));
                Some(clamp_to_grid(agent_cell.offset(dir, lookahead), grid))
            }
            Targeting::Noisy { random_chance } => {
                (!rng.chance(random_chance)).then_some(agent_cell)
            }
        }
    }
}

fn clamp_to_grid(pos: CellPos, grid: &Grid) -> CellPos {
    CellPos::new(
        pos.x.clamp(0, grid.width() as i32 - 1),
        pos.y.clamp(0, grid.height() as i32 - 1),
    )
}
