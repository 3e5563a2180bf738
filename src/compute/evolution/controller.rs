//! Generation orchestration: runs a batch of episodes, hands the scored
//! brains to the [`Evolver`] once every episode has finished, and notifies
//! the host through callbacks.

use std::mem;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::evolver::{Evolver, EvolverError};
use crate::compute::brain::{Brain, BrainError};
use crate::compute::episode::Episode;
use crate::compute::rng::SimRng;
use crate::schema::{ConfigError, GenerationHistory, GenerationSummary, SimulationConfig};

/// Fired once for every episode that ends.
pub type DeathCallback = Box<dyn FnMut()>;
/// Fired with the new best live score whenever it rises.
pub type ScoreCallback = Box<dyn FnMut(f32)>;
/// Fired with `(generation, best_ever_score)` after each turnover.
pub type GenerationCallback = Box<dyn FnMut(usize, f32)>;

/// Errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Brain(#[from] BrainError),
    #[error(transparent)]
    Evolver(#[from] EvolverError),
}

/// Drives generations of episodes from a host clock.
pub struct GenerationController {
    config: SimulationConfig,
    evolver: Evolver,
    episodes: Vec<Episode>,
    rng: SimRng,
    generation: usize,
    best_ever: f32,
    best_live: f32,
    time_scale: f32,
    running: bool,
    history: GenerationHistory,
    on_agent_death: Option<DeathCallback>,
    on_score_update: Option<ScoreCallback>,
    on_generation_complete: Option<GenerationCallback>,
}

impl GenerationController {
    /// Validate `config` and spawn generation 0. The controller starts paused.
    pub fn new(config: SimulationConfig) -> Result<Self, ControllerError> {
        config.validate()?;

        let mut rng = SimRng::from_seed_option(config.random_seed);
        let evolver = Evolver::new(config.evolution.clone(), rng.fork());
        let time_scale = config.time_scale;

        let mut controller = Self {
            config,
            evolver,
            episodes: Vec::new(),
            rng,
            generation: 0,
            best_ever: 0.0,
            best_live: 0.0,
            time_scale,
            running: false,
            history: GenerationHistory::default(),
            on_agent_death: None,
            on_score_update: None,
            on_generation_complete: None,
        };
        let brains = controller.evolver.evolve()?;
        controller.episodes = controller.spawn_episodes(brains)?;
        Ok(controller)
    }

    pub fn set_on_agent_death(&mut self, callback: impl FnMut() + 'static) {
        self.on_agent_death = Some(Box::new(callback));
    }

    pub fn set_on_score_update(&mut self, callback: impl FnMut(f32) + 'static) {
        self.on_score_update = Some(Box::new(callback));
    }

    pub fn set_on_generation_complete(&mut self, callback: impl FnMut(usize, f32) + 'static) {
        self.on_generation_complete = Some(Box::new(callback));
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pause and restart from a fresh generation 0.
    ///
    /// The random stream is reseeded from the configuration, so a seeded run
    /// replays identically after a reset.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.running = false;
        self.generation = 0;
        self.best_ever = 0.0;
        self.best_live = 0.0;
        self.history.clear();

        self.rng = SimRng::from_seed_option(self.config.random_seed);
        self.evolver = Evolver::new(self.config.evolution.clone(), self.rng.fork());
        let brains = self.evolver.evolve()?;
        self.episodes = self.spawn_episodes(brains)?;
        log::info!("Simulation reset");
        Ok(())
    }

    /// Set the time-scale multiplier for current and future episodes.
    ///
    /// Non-finite or non-positive values are ignored.
    pub fn set_speed(&mut self, multiplier: f32) {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            log::warn!("Ignoring invalid speed multiplier {}", multiplier);
            return;
        }
        self.time_scale = multiplier;
        for episode in &mut self.episodes {
            episode.set_time_scale(multiplier);
        }
    }

    /// Advance by one host frame. Does nothing while paused.
    ///
    /// Returns the summary of the generation that finished during this
    /// frame, if any.
    pub fn tick(&mut self, delta: f32) -> Result<Option<GenerationSummary>, ControllerError> {
        if !self.running {
            return Ok(None);
        }
        self.advance(delta)
    }

    /// Run frames of `frame_delta` seconds until the current generation
    /// turns over, regardless of the pause state.
    pub fn run_generation(&mut self, frame_delta: f32) -> Result<GenerationSummary, ControllerError> {
        let delta = if frame_delta.is_finite() && frame_delta > 0.0 {
            frame_delta
        } else {
            self.config.fixed_step
        };
        loop {
            if let Some(summary) = self.advance(delta)? {
                return Ok(summary);
            }
        }
    }

    fn advance(&mut self, delta: f32) -> Result<Option<GenerationSummary>, ControllerError> {
        let finished_before: Vec<bool> = self.episodes.iter().map(Episode::is_game_over).collect();

        self.advance_episodes(delta)?;

        let mut best_advanced = f32::NEG_INFINITY;
        for (episode, was_over) in self.episodes.iter().zip(&finished_before) {
            if *was_over {
                continue;
            }
            best_advanced = best_advanced.max(episode.score());
            if episode.is_game_over()
                && let Some(callback) = self.on_agent_death.as_mut()
            {
                callback();
            }
        }

        if best_advanced > self.best_live {
            self.best_live = best_advanced;
            if let Some(callback) = self.on_score_update.as_mut() {
                callback(best_advanced);
            }
        }

        if self.episodes.iter().all(Episode::is_game_over) {
            return self.turnover().map(Some);
        }
        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn advance_episodes(&mut self, delta: f32) -> Result<(), BrainError> {
        self.episodes
            .par_iter_mut()
            .filter(|episode| !episode.is_game_over())
            .try_for_each(|episode| episode.update(delta).map(|_| ()))
    }

    #[cfg(target_arch = "wasm32")]
    fn advance_episodes(&mut self, delta: f32) -> Result<(), BrainError> {
        for episode in self.episodes.iter_mut().filter(|e| !e.is_game_over()) {
            episode.update(delta)?;
        }
        Ok(())
    }

    fn turnover(&mut self) -> Result<GenerationSummary, ControllerError> {
        let (brains, scores): (Vec<Brain>, Vec<f32>) = mem::take(&mut self.episodes)
            .into_iter()
            .map(Episode::into_result)
            .unzip();

        let generation_best = scores.iter().copied().fold(0.0, f32::max);
        self.best_ever = self.best_ever.max(generation_best);
        let summary = GenerationSummary::from_scores(self.generation, &scores, self.best_ever);
        self.history.push(summary);

        log::info!(
            "Generation {}: best={:.1}, avg={:.1}, best_ever={:.1}",
            summary.generation,
            summary.best,
            summary.average,
            summary.best_ever
        );

        self.evolver.set_population(brains, scores)?;
        let next = self.evolver.evolve()?;
        self.episodes = self.spawn_episodes(next)?;
        self.generation += 1;
        self.best_live = 0.0;

        if let Some(callback) = self.on_generation_complete.as_mut() {
            callback(self.generation, self.best_ever);
        }
        Ok(summary)
    }

    fn spawn_episodes(&mut self, brains: Vec<Brain>) -> Result<Vec<Episode>, BrainError> {
        brains
            .into_iter()
            .map(|brain| {
                let mut episode = Episode::new(&self.config, brain, self.rng.fork())?;
                episode.set_time_scale(self.time_scale);
                Ok(episode)
            })
            .collect()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Current generation number, starting at 0.
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best final score since the last reset (0 before any turnover).
    #[inline]
    pub fn best_score(&self) -> f32 {
        self.best_ever
    }

    /// Best live score reported in the current generation.
    #[inline]
    pub fn best_live_score(&self) -> f32 {
        self.best_live
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn alive_count(&self) -> usize {
        self.episodes.iter().filter(|e| !e.is_game_over()).count()
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }
}
