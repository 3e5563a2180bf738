//! Run-report types recorded at every generation turnover.

use serde::{Deserialize, Serialize};

/// Outcome of one finished generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Number of the generation that just finished.
    pub generation: usize,
    /// Highest episode score in that generation.
    pub best: f32,
    /// Mean episode score in that generation.
    pub average: f32,
    /// Best score seen since the last reset.
    pub best_ever: f32,
}

impl GenerationSummary {
    /// Summarize a batch of final episode scores.
    pub fn from_scores(generation: usize, scores: &[f32], best_ever: f32) -> Self {
        let best = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let average = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f32>() / scores.len() as f32
        };

        Self {
            generation,
            best: if best.is_finite() { best } else { 0.0 },
            average,
            best_ever,
        }
    }
}

/// Per-generation history, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationHistory {
    pub generations: Vec<GenerationSummary>,
}

impl GenerationHistory {
    pub fn push(&mut self, summary: GenerationSummary) {
        self.generations.push(summary);
    }

    pub fn latest(&self) -> Option<&GenerationSummary> {
        self.generations.last()
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn clear(&mut self) {
        self.generations.clear();
    }

    /// Best score per generation, for plotting.
    pub fn best_scores(&self) -> Vec<f32> {
        self.generations.iter().map(|s| s.best).collect()
    }

    /// Average score per generation, for plotting.
    pub fn average_scores(&self) -> Vec<f32> {
        self.generations.iter().map(|s| s.average).collect()
    }
}
