//! WebAssembly bindings for Maze Brain.
//!
//! Provides a thin wrapper around `GenerationController` for browser hosts.
//! The host drives `tick` from its animation frame and renders from
//! `getEpisodeState`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    compute::{Episode, PursuerKind, evolution::GenerationController},
    schema::{MazeConfig, SimulationConfig},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// WebAssembly wrapper for the generation controller.
#[wasm_bindgen]
pub struct WasmSimulation {
    controller: GenerationController,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create a simulation from JSON configuration.
    ///
    /// # Arguments
    /// * `config_json` - JSON string containing SimulationConfig
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;
        Self::with_config(config)
    }

    /// Create a simulation with default settings and a maze sized for a
    /// drawing surface of `width` x `height` pixels.
    #[wasm_bindgen(js_name = forSurface)]
    pub fn for_surface(width: f32, height: f32) -> Result<WasmSimulation, JsValue> {
        let config = SimulationConfig {
            maze: MazeConfig::from_render_target(width, height),
            ..Default::default()
        };
        Self::with_config(config)
    }

    fn with_config(config: SimulationConfig) -> Result<WasmSimulation, JsValue> {
        let controller = GenerationController::new(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid simulation: {e}")))?;
        Ok(WasmSimulation { controller })
    }

    /// Advance by one animation frame of `delta` seconds.
    #[wasm_bindgen]
    pub fn tick(&mut self, delta: f32) -> Result<(), JsValue> {
        self.controller
            .tick(delta)
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&format!("Simulation error: {e}")))
    }

    #[wasm_bindgen]
    pub fn start(&mut self) {
        self.controller.start();
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.controller.pause();
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.controller
            .reset()
            .map_err(|e| JsValue::from_str(&format!("Reset failed: {e}")))
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, multiplier: f32) {
        self.controller.set_speed(multiplier);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> usize {
        self.controller.generation()
    }

    #[wasm_bindgen(js_name = getBestScore)]
    pub fn get_best_score(&self) -> f32 {
        self.controller.best_score()
    }

    /// Best live score of the generation in progress.
    #[wasm_bindgen(js_name = getBestLiveScore)]
    pub fn get_best_live_score(&self) -> f32 {
        self.controller.best_live_score()
    }

    #[wasm_bindgen(js_name = getEpisodeCount)]
    pub fn get_episode_count(&self) -> usize {
        self.controller.episodes().len()
    }

    #[wasm_bindgen(js_name = getAliveCount)]
    pub fn get_alive_count(&self) -> usize {
        self.controller.alive_count()
    }

    #[wasm_bindgen(js_name = isAlive)]
    pub fn is_alive(&self, index: usize) -> bool {
        self.episode(index).is_some_and(Episode::is_alive)
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self, index: usize) -> bool {
        self.episode(index).is_none_or(Episode::is_game_over)
    }

    /// Score of an episode, rounded down for display.
    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self, index: usize) -> Option<f32> {
        self.episode(index).map(|e| e.score().floor())
    }

    /// Render snapshot of one episode.
    #[wasm_bindgen(js_name = getEpisodeState)]
    pub fn get_episode_state(&self, index: usize) -> Result<JsValue, JsValue> {
        let episode = self
            .episode(index)
            .ok_or_else(|| JsValue::from_str(&format!("No episode at index {index}")))?;

        serde_wasm_bindgen::to_value(&EpisodeSnapshot::from_episode(episode))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Per-generation summaries as JSON.
    #[wasm_bindgen(js_name = getHistory)]
    pub fn get_history(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.controller.history())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Register `callback()` fired whenever an episode ends.
    #[wasm_bindgen(js_name = onAgentDeath)]
    pub fn on_agent_death(&mut self, callback: js_sys::Function) {
        self.controller.set_on_agent_death(move || {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("onAgentDeath callback failed: {:?}", e);
            }
        });
    }

    /// Register `callback(score)` fired when the best live score rises.
    #[wasm_bindgen(js_name = onScoreUpdate)]
    pub fn on_score_update(&mut self, callback: js_sys::Function) {
        self.controller.set_on_score_update(move |score| {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_f64(score as f64)) {
                log::warn!("onScoreUpdate callback failed: {:?}", e);
            }
        });
    }

    /// Register `callback(generation, bestScore)` fired after each turnover.
    #[wasm_bindgen(js_name = onGenerationComplete)]
    pub fn on_generation_complete(&mut self, callback: js_sys::Function) {
        self.controller
            .set_on_generation_complete(move |generation, best| {
                let result = callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_f64(generation as f64),
                    &JsValue::from_f64(best as f64),
                );
                if let Err(e) = result {
                    log::warn!("onGenerationComplete callback failed: {:?}", e);
                }
            });
    }
}

impl WasmSimulation {
    fn episode(&self, index: usize) -> Option<&Episode> {
        self.controller.episodes().get(index)
    }
}

/// Serializable view of an episode for rendering.
#[derive(Serialize)]
struct EpisodeSnapshot {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    dots: Vec<bool>,
    bonuses: Vec<bool>,
    dots_remaining: usize,
    agent: (f32, f32),
    brain_parameters: usize,
    powered: bool,
    pursuers: Vec<PursuerSnapshot>,
    score: f32,
    alive: bool,
    game_over: bool,
    remaining_time: f32,
}

#[derive(Serialize)]
struct PursuerSnapshot {
    kind: &'static str,
    position: (f32, f32),
    scattering: bool,
}

impl EpisodeSnapshot {
    fn from_episode(episode: &Episode) -> Self {
        let grid = episode.grid();
        let cells = grid.cells();
        let agent = episode.agent();

        Self {
            width: grid.width(),
            height: grid.height(),
            walls: cells.iter().map(|c| c.wall).collect(),
            dots: cells.iter().map(|c| c.dot).collect(),
            bonuses: cells.iter().map(|c| c.bonus).collect(),
            dots_remaining: grid.dots_remaining(),
            agent: agent.position(),
            brain_parameters: episode.brain().parameter_count(),
            powered: agent.is_powered(),
            pursuers: episode
                .pursuers()
                .iter()
                .map(|p| PursuerSnapshot {
                    kind: kind_name(p.kind()),
                    position: p.position(),
                    scattering: p.is_scattering(),
                })
                .collect(),
            score: episode.score().floor(),
            alive: episode.is_alive(),
            game_over: episode.is_game_over(),
            remaining_time: episode.remaining_time(),
        }
    }
}

fn kind_name(kind: PursuerKind) -> &'static str {
    match kind {
        PursuerKind::Chase => "chase",
        PursuerKind::Intercept => "intercept",
        PursuerKind::NoisyChase => "noisy_chase",
        PursuerKind::Mixed => "mixed",
    }
}
