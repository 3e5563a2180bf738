//! Configuration types for maze episodes, agents, pursuers and evolution.

use serde::{Deserialize, Serialize};

/// Number of features produced by the sensor model (4 directions x 4 channels).
pub const SENSOR_INPUTS: usize = 16;

/// Number of movement directions the brain chooses between.
pub const MOVE_OUTPUTS: usize = 4;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maze generation parameters.
    #[serde(default)]
    pub maze: MazeConfig,
    /// Agent sensing and movement parameters.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Reward shaping constants.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Pursuer profiles and scatter behaviour.
    #[serde(default)]
    pub pursuers: PursuerConfig,
    /// Genetic algorithm settings.
    #[serde(default)]
    pub evolution: EvolutionConfig,
    /// Number of episodes run in parallel per generation.
    #[serde(default = "default_episodes")]
    pub episodes: usize,
    /// Simulated seconds an episode may last before it times out.
    #[serde(default = "default_time_budget")]
    pub time_budget: f32,
    /// Length of one simulation step in simulated seconds.
    #[serde(default = "default_fixed_step")]
    pub fixed_step: f32,
    /// Upper bound on simulation steps run by a single `update` call.
    #[serde(default = "default_max_steps_per_update")]
    pub max_steps_per_update: usize,
    /// Initial time-scale multiplier.
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            maze: MazeConfig::default(),
            agent: AgentConfig::default(),
            scoring: ScoringConfig::default(),
            pursuers: PursuerConfig::default(),
            evolution: EvolutionConfig::default(),
            episodes: default_episodes(),
            time_budget: default_time_budget(),
            fixed_step: default_fixed_step(),
            max_steps_per_update: default_max_steps_per_update(),
            time_scale: default_time_scale(),
            random_seed: None,
        }
    }
}

fn default_episodes() -> usize {
    16
}
fn default_time_budget() -> f32 {
    20.0
}
fn default_fixed_step() -> f32 {
    1.0 / 60.0
}
fn default_max_steps_per_update() -> usize {
    240
}
fn default_time_scale() -> f32 {
    1.0
}

/// Maze generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Grid width in cells.
    #[serde(default = "default_maze_side")]
    pub width: usize,
    /// Grid height in cells.
    #[serde(default = "default_maze_side")]
    pub height: usize,
    /// Probability that an anchor point becomes a wall segment.
    #[serde(default = "default_wall_probability")]
    pub wall_probability: f32,
    /// Remove interior walls surrounded by more than two walls.
    #[serde(default = "default_thin_wall_clusters")]
    pub thin_wall_clusters: bool,
    /// Independent probability of a dot on each open cell.
    #[serde(default = "default_dot_probability")]
    pub dot_probability: f32,
    /// Number of bonus items placed per maze.
    #[serde(default = "default_bonus_count")]
    pub bonus_count: usize,
    /// Chebyshev radius cleared around the spawn cell.
    #[serde(default = "default_spawn_clear_radius")]
    pub spawn_clear_radius: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: default_maze_side(),
            height: default_maze_side(),
            wall_probability: default_wall_probability(),
            thin_wall_clusters: default_thin_wall_clusters(),
            dot_probability: default_dot_probability(),
            bonus_count: default_bonus_count(),
            spawn_clear_radius: default_spawn_clear_radius(),
        }
    }
}

fn default_maze_side() -> usize {
    20
}
fn default_wall_probability() -> f32 {
    0.25
}
fn default_thin_wall_clusters() -> bool {
    true
}
fn default_dot_probability() -> f32 {
    0.9
}
fn default_bonus_count() -> usize {
    5
}
fn default_spawn_clear_radius() -> usize {
    1
}

impl MazeConfig {
    /// Smallest surface side (in pixels) used when sizing from a render target.
    pub const MIN_SURFACE: f32 = 200.0;
    /// Smallest cell size (in pixels) used when sizing from a render target.
    pub const MIN_CELL_PIXELS: f32 = 10.0;
    /// Cells along the shorter surface side.
    pub const CELLS_PER_SHORT_SIDE: f32 = 20.0;

    /// Derive grid dimensions from a host surface size in pixels.
    pub fn from_render_target(surface_width: f32, surface_height: f32) -> Self {
        let width = surface_width.max(Self::MIN_SURFACE);
        let height = surface_height.max(Self::MIN_SURFACE);
        let cell = (width.min(height) / Self::CELLS_PER_SHORT_SIDE).max(Self::MIN_CELL_PIXELS);

        Self {
            width: ((width / cell).floor() as usize).max(3),
            height: ((height / cell).floor() as usize).max(3),
            ..Default::default()
        }
    }

    /// Width and height clamped to the smallest usable maze.
    #[inline]
    pub fn clamped_dimensions(&self) -> (usize, usize) {
        (self.width.max(3), self.height.max(3))
    }
}

/// Agent sensing and movement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of cells scanned in each direction.
    #[serde(default = "default_vision_range")]
    pub vision_range: usize,
    /// Distance moved per simulation step, in cells.
    #[serde(default = "default_agent_speed")]
    pub speed: f32,
    /// Half-width of the square collision footprint, in cells.
    #[serde(default = "default_footprint_radius")]
    pub footprint_radius: f32,
    /// Seconds a bonus item keeps the agent powered up.
    #[serde(default = "default_power_duration")]
    pub power_duration: f32,
    /// Number of recently visited cells remembered for loop detection.
    #[serde(default = "default_loop_window")]
    pub loop_window: usize,
    /// Occurrences of the current cell within the window that count as a loop.
    #[serde(default = "default_loop_threshold")]
    pub loop_threshold: usize,
    /// Movement below this distance (per axis) counts as standing still.
    #[serde(default = "default_idle_epsilon")]
    pub idle_epsilon: f32,
    /// Seconds of standing still tolerated before idling is penalized.
    #[serde(default = "default_idle_grace")]
    pub idle_grace: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            vision_range: default_vision_range(),
            speed: default_agent_speed(),
            footprint_radius: default_footprint_radius(),
            power_duration: default_power_duration(),
            loop_window: default_loop_window(),
            loop_threshold: default_loop_threshold(),
            idle_epsilon: default_idle_epsilon(),
            idle_grace: default_idle_grace(),
        }
    }
}

fn default_vision_range() -> usize {
    5
}
fn default_agent_speed() -> f32 {
    0.1
}
fn default_footprint_radius() -> f32 {
    0.4
}
fn default_power_duration() -> f32 {
    10.0
}
fn default_loop_window() -> usize {
    20
}
fn default_loop_threshold() -> usize {
    4
}
fn default_idle_epsilon() -> f32 {
    0.01
}
fn default_idle_grace() -> f32 {
    0.5
}

/// Reward shaping constants applied by the agent every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_dot_reward")]
    pub dot_reward: f32,
    #[serde(default = "default_bonus_reward")]
    pub bonus_reward: f32,
    /// Reward for defeating a pursuer while powered up.
    #[serde(default = "default_pursuer_kill_reward")]
    pub pursuer_kill_reward: f32,
    /// Penalty for being caught while not powered up.
    #[serde(default = "default_death_penalty")]
    pub death_penalty: f32,
    /// Penalty for a move rejected because the destination is a wall.
    #[serde(default = "default_wall_penalty")]
    pub wall_penalty: f32,
    #[serde(default = "default_loop_penalty")]
    pub loop_penalty: f32,
    #[serde(default = "default_idle_penalty_per_second")]
    pub idle_penalty_per_second: f32,
    #[serde(default = "default_move_reward_per_second")]
    pub move_reward_per_second: f32,
    /// Reward when the distance to the nearest collectible shrinks.
    #[serde(default = "default_approach_reward")]
    pub approach_reward: f32,
    /// Penalty when the distance to the nearest collectible grows.
    #[serde(default = "default_retreat_penalty")]
    pub retreat_penalty: f32,
    /// Growth in distance tolerated without penalty.
    #[serde(default = "default_distance_tolerance")]
    pub distance_tolerance: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            dot_reward: default_dot_reward(),
            bonus_reward: default_bonus_reward(),
            pursuer_kill_reward: default_pursuer_kill_reward(),
            death_penalty: default_death_penalty(),
            wall_penalty: default_wall_penalty(),
            loop_penalty: default_loop_penalty(),
            idle_penalty_per_second: default_idle_penalty_per_second(),
            move_reward_per_second: default_move_reward_per_second(),
            approach_reward: default_approach_reward(),
            retreat_penalty: default_retreat_penalty(),
            distance_tolerance: default_distance_tolerance(),
        }
    }
}

impl ScoringConfig {
    /// Only collection and pursuer events score; all shaping terms are zero.
    pub fn events_only() -> Self {
        Self {
            wall_penalty: 0.0,
            loop_penalty: 0.0,
            idle_penalty_per_second: 0.0,
            move_reward_per_second: 0.0,
            approach_reward: 0.0,
            retreat_penalty: 0.0,
            ..Default::default()
        }
    }
}

fn default_dot_reward() -> f32 {
    20.0
}
fn default_bonus_reward() -> f32 {
    100.0
}
fn default_pursuer_kill_reward() -> f32 {
    500.0
}
fn default_death_penalty() -> f32 {
    100.0
}
fn default_wall_penalty() -> f32 {
    1.0
}
fn default_loop_penalty() -> f32 {
    5.0
}
fn default_idle_penalty_per_second() -> f32 {
    10.0
}
fn default_move_reward_per_second() -> f32 {
    0.5
}
fn default_approach_reward() -> f32 {
    1.0
}
fn default_retreat_penalty() -> f32 {
    0.5
}
fn default_distance_tolerance() -> f32 {
    0.1
}

/// Pursuer profiles and scatter behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PursuerConfig {
    /// Speed of the direct-chase profile in cells per second.
    #[serde(default = "default_chase_speed")]
    pub chase_speed: f32,
    /// Speed of the intercept profile in cells per second.
    #[serde(default = "default_intercept_speed")]
    pub intercept_speed: f32,
    /// Speed of the chase-with-noise profile in cells per second.
    #[serde(default = "default_noisy_chase_speed")]
    pub noisy_chase_speed: f32,
    /// Speed of the mixed profile in cells per second.
    #[serde(default = "default_mixed_speed")]
    pub mixed_speed: f32,
    /// Cells ahead of the agent targeted by the intercept profile.
    #[serde(default = "default_intercept_lookahead")]
    pub intercept_lookahead: i32,
    /// Probability of a random turn for the chase-with-noise profile.
    #[serde(default = "default_noisy_chase_random")]
    pub noisy_chase_random: f32,
    /// Probability of a random turn for the mixed profile.
    #[serde(default = "default_mixed_random")]
    pub mixed_random: f32,
    /// Shortest scatter window in seconds.
    #[serde(default = "default_scatter_min")]
    pub scatter_min: f32,
    /// Longest scatter window in seconds.
    #[serde(default = "default_scatter_max")]
    pub scatter_max: f32,
    /// Expected scatter entries per second outside scatter mode.
    #[serde(default = "default_scatter_chance_per_second")]
    pub scatter_chance_per_second: f32,
}

impl Default for PursuerConfig {
    fn default() -> Self {
        Self {
            chase_speed: default_chase_speed(),
            intercept_speed: default_intercept_speed(),
            noisy_chase_speed: default_noisy_chase_speed(),
            mixed_speed: default_mixed_speed(),
            intercept_lookahead: default_intercept_lookahead(),
            noisy_chase_random: default_noisy_chase_random(),
            mixed_random: default_mixed_random(),
            scatter_min: default_scatter_min(),
            scatter_max: default_scatter_max(),
            scatter_chance_per_second: default_scatter_chance_per_second(),
        }
    }
}

fn default_chase_speed() -> f32 {
    3.6
}
fn default_intercept_speed() -> f32 {
    3.2
}
fn default_noisy_chase_speed() -> f32 {
    2.8
}
fn default_mixed_speed() -> f32 {
    2.4
}
fn default_intercept_lookahead() -> i32 {
    4
}
fn default_noisy_chase_random() -> f32 {
    0.3
}
fn default_mixed_random() -> f32 {
    0.4
}
fn default_scatter_min() -> f32 {
    5.0
}
fn default_scatter_max() -> f32 {
    10.0
}
fn default_scatter_chance_per_second() -> f32 {
    0.06
}

/// Genetic algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Layer sizes shared by every brain in the population.
    #[serde(default = "default_layer_sizes")]
    pub layer_sizes: Vec<usize>,
    /// Number of brains bootstrapped for generation 0.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Mutation probability per parameter (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Largest perturbation added by a single mutation.
    #[serde(default = "default_mutation_amount")]
    pub mutation_amount: f32,
    /// Crossover probability (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f32,
    /// Elitism: number of best brains carried over unchanged.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
    /// Indices sampled per tournament.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            layer_sizes: default_layer_sizes(),
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            mutation_amount: default_mutation_amount(),
            crossover_rate: default_crossover_rate(),
            elitism: default_elitism(),
            tournament_size: default_tournament_size(),
        }
    }
}

fn default_layer_sizes() -> Vec<usize> {
    vec![SENSOR_INPUTS, 12, MOVE_OUTPUTS]
}
fn default_population_size() -> usize {
    16
}
fn default_mutation_rate() -> f32 {
    0.1
}
fn default_mutation_amount() -> f32 {
    0.2
}
fn default_crossover_rate() -> f32 {
    0.3
}
fn default_elitism() -> usize {
    4
}
fn default_tournament_size() -> usize {
    3
}

impl SimulationConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maze.width < 3 || self.maze.height < 3 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.episodes == 0 {
            return Err(ConfigError::NoEpisodes);
        }
        if self.episodes != self.evolution.population_size {
            return Err(ConfigError::EpisodeCountMismatch {
                episodes: self.episodes,
                population: self.evolution.population_size,
            });
        }
        if !(self.time_budget > 0.0 && self.fixed_step > 0.0) || self.max_steps_per_update == 0 {
            return Err(ConfigError::InvalidClock);
        }
        if !(self.time_scale > 0.0 && self.time_scale.is_finite()) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }

        check_probability(self.maze.wall_probability, "wall_probability")?;
        check_probability(self.maze.dot_probability, "dot_probability")?;
        check_probability(self.pursuers.noisy_chase_random, "noisy_chase_random")?;
        check_probability(self.pursuers.mixed_random, "mixed_random")?;
        check_probability(self.evolution.mutation_rate, "mutation_rate")?;
        check_probability(self.evolution.crossover_rate, "crossover_rate")?;

        if self.agent.vision_range == 0 {
            return Err(ConfigError::InvalidVisionRange);
        }
        let speeds = [
            self.agent.speed,
            self.pursuers.chase_speed,
            self.pursuers.intercept_speed,
            self.pursuers.noisy_chase_speed,
            self.pursuers.mixed_speed,
        ];
        if speeds.iter().any(|s| !(*s > 0.0)) {
            return Err(ConfigError::InvalidSpeed);
        }
        if !(self.pursuers.scatter_min >= 0.0 && self.pursuers.scatter_min <= self.pursuers.scatter_max)
        {
            return Err(ConfigError::InvalidScatterWindow {
                min: self.pursuers.scatter_min,
                max: self.pursuers.scatter_max,
            });
        }

        self.evolution.validate()
    }
}

impl EvolutionConfig {
    /// Validate the genetic algorithm settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layers = &self.layer_sizes;
        if layers.len() < 2 || layers.contains(&0) {
            return Err(ConfigError::InvalidLayers(layers.clone()));
        }
        if layers[0] != SENSOR_INPUTS || layers[layers.len() - 1] != MOVE_OUTPUTS {
            return Err(ConfigError::InvalidLayers(layers.clone()));
        }
        if self.population_size == 0 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.elitism > self.population_size {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.elitism,
                population: self.population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::InvalidTournamentSize);
        }
        if !(self.mutation_amount >= 0.0) {
            return Err(ConfigError::InvalidMutationAmount(self.mutation_amount));
        }
        Ok(())
    }
}

fn check_probability(value: f32, name: &'static str) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Maze dimensions must be at least 3x3")]
    InvalidDimensions,
    #[error("At least one episode per generation is required")]
    NoEpisodes,
    #[error("Episode count {episodes} must equal population size {population}")]
    EpisodeCountMismatch { episodes: usize, population: usize },
    #[error("Time budget, fixed step and step cap must be positive")]
    InvalidClock,
    #[error("Time scale must be positive and finite, got {0}")]
    InvalidTimeScale(f32),
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },
    #[error("Vision range must be non-zero")]
    InvalidVisionRange,
    #[error("Agent and pursuer speeds must be positive")]
    InvalidSpeed,
    #[error("Scatter window [{min}, {max}] is invalid")]
    InvalidScatterWindow { min: f32, max: f32 },
    #[error("Layer sizes {0:?} must start with 16 inputs, end with 4 outputs and contain no zeros")]
    InvalidLayers(Vec<usize>),
    #[error("Population size must be non-zero")]
    PopulationTooSmall,
    #[error("Elitism {elitism} exceeds population size {population}")]
    ElitismTooLarge { elitism: usize, population: usize },
    #[error("Tournament size must be non-zero")]
    InvalidTournamentSize,
    #[error("Mutation amount must be non-negative, got {0}")]
    InvalidMutationAmount(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"episodes": 4, "evolution": {"population_size": 4}}"#)
                .unwrap();
        assert_eq!(config.episodes, 4);
        assert_eq!(config.evolution.elitism, 4);
        assert_eq!(config.maze.bonus_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.evolution.layer_sizes, config.evolution.layer_sizes);
        assert_eq!(parsed.maze.width, config.maze.width);
    }

    #[test]
    fn test_rejects_mismatched_episode_count() {
        let config = SimulationConfig {
            episodes: 8,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EpisodeCountMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_layers() {
        let mut config = SimulationConfig::default();
        config.evolution.layer_sizes = vec![16];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLayers(_))));

        config.evolution.layer_sizes = vec![16, 0, 4];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLayers(_))));

        config.evolution.layer_sizes = vec![10, 4];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLayers(_))));
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let mut config = SimulationConfig::default();
        config.maze.dot_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { name: "dot_probability", .. })
        ));
    }

    #[test]
    fn test_rejects_nan_parameters() {
        let config = SimulationConfig {
            fixed_step: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidClock)));

        let config = SimulationConfig {
            time_budget: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidClock)));

        let mut config = SimulationConfig::default();
        config.agent.speed = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSpeed)));

        let mut config = SimulationConfig::default();
        config.pursuers.scatter_min = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScatterWindow { .. })
        ));

        let mut config = SimulationConfig::default();
        config.evolution.mutation_amount = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationAmount(_))
        ));
    }

    #[test]
    fn test_render_target_sizing() {
        let maze = MazeConfig::from_render_target(600.0, 400.0);
        // cell = 400 / 20 = 20px
        assert_eq!((maze.width, maze.height), (30, 20));

        // Tiny surfaces are clamped to 200px, giving 10px cells.
        let tiny = MazeConfig::from_render_target(50.0, 50.0);
        assert_eq!((tiny.width, tiny.height), (20, 20));
    }
}
