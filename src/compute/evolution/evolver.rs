//! Genetic algorithm over brains: elitism, tournament selection, single-point
//! crossover and uniform mutation.

use crate::compute::brain::{Brain, BrainError};
use crate::compute::rng::SimRng;
use crate::schema::EvolutionConfig;

/// Errors from population handling.
#[derive(Debug, thiserror::Error)]
pub enum EvolverError {
    #[error("Population size mismatch: {brains} brains but {scores} scores")]
    PopulationSizeMismatch { brains: usize, scores: usize },
    #[error(transparent)]
    Brain(#[from] BrainError),
}

/// Breeds the next generation of brains from a scored population.
pub struct Evolver {
    config: EvolutionConfig,
    population: Vec<Brain>,
    scores: Vec<f32>,
    rng: SimRng,
}

impl Evolver {
    pub fn new(config: EvolutionConfig, rng: SimRng) -> Self {
        Self {
            config,
            population: Vec::new(),
            scores: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Number of brains currently held.
    pub fn population_len(&self) -> usize {
        self.population.len()
    }

    /// Replace the held population with scored brains.
    pub fn set_population(
        &mut self,
        brains: Vec<Brain>,
        scores: Vec<f32>,
    ) -> Result<(), EvolverError> {
        if brains.len() != scores.len() {
            return Err(EvolverError::PopulationSizeMismatch {
                brains: brains.len(),
                scores: scores.len(),
            });
        }
        self.population = brains;
        self.scores = scores;
        Ok(())
    }

    /// Produce the next generation, consuming the held population.
    ///
    /// With no population held, a fresh random generation of
    /// `population_size` brains is created instead.
    pub fn evolve(&mut self) -> Result<Vec<Brain>, EvolverError> {
        let population = std::mem::take(&mut self.population);
        let scores = std::mem::take(&mut self.scores);

        if population.is_empty() {
            return self.bootstrap();
        }

        let size = population.len();
        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut next_gen = Vec::with_capacity(size);

        // Elitism: keep best individuals
        for &idx in ranked.iter().take(self.config.elitism.min(size)) {
            next_gen.push(population[idx].clone());
        }

        // Fill rest with offspring
        while next_gen.len() < size {
            let idx1 = self.select_index(&scores);
            let idx2 = self.select_index(&scores);

            let mut child = if self.rng.chance(self.config.crossover_rate) {
                Brain::crossover(&population[idx1], &population[idx2], &mut self.rng)?
            } else if self.rng.chance(0.5) {
                population[idx1].clone()
            } else {
                population[idx2].clone()
            };

            child.mutate(
                self.config.mutation_rate,
                self.config.mutation_amount,
                &mut self.rng,
            );
            next_gen.push(child);
        }

        Ok(next_gen)
    }

    fn bootstrap(&mut self) -> Result<Vec<Brain>, EvolverError> {
        let brains = (0..self.config.population_size)
            .map(|_| Brain::random(&self.config.layer_sizes, &mut self.rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(brains)
    }

    /// Tournament selection: the best of `tournament_size` uniform samples.
    fn select_index(&mut self, scores: &[f32]) -> usize {
        let mut best_idx = self.rng.index(scores.len());
        for _ in 1..self.config.tournament_size {
            let idx = self.rng.index(scores.len());
            if scores[idx] > scores[best_idx] {
                best_idx = idx;
            }
        }
        best_idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(elitism: usize) -> EvolutionConfig {
        EvolutionConfig {
            layer_sizes: vec![16, 6, 4],
            population_size: 8,
            elitism,
            ..Default::default()
        }
    }

    fn brains(n: usize, rng: &mut SimRng) -> Vec<Brain> {
        (0..n)
            .map(|_| Brain::random(&[16, 6, 4], rng).unwrap())
            .collect()
    }

    #[test]
    fn test_bootstrap() {
        let mut evolver = Evolver::new(config(2), SimRng::new(0));
        let generation = evolver.evolve().unwrap();
        assert_eq!(generation.len(), 8);
        assert!(generation.iter().all(|b| b.layer_sizes() == [16, 6, 4]));
    }

    #[test]
    fn test_elitism_exact() {
        let mut rng = SimRng::new(1);
        let population = brains(4, &mut rng);
        let mut evolver = Evolver::new(config(2), SimRng::new(2));
        evolver
            .set_population(population.clone(), vec![10.0, 5.0, 8.0, 1.0])
            .unwrap();

        let next = evolver.evolve().unwrap();
        assert_eq!(next.len(), 4);
        assert_eq!(next[0], population[0]);
        assert_eq!(next[1], population[2]);
    }

    #[test]
    fn test_full_elitism_keeps_ranked_population() {
        let mut rng = SimRng::new(3);
        let population = brains(4, &mut rng);
        let mut evolver = Evolver::new(config(10), SimRng::new(4));
        evolver
            .set_population(population.clone(), vec![10.0, 5.0, 8.0, 1.0])
            .unwrap();

        let next = evolver.evolve().unwrap();
        let expected = [0, 2, 1, 3].map(|i| population[i].clone());
        assert_eq!(next, expected.to_vec());
    }

    #[test]
    fn test_population_size_mismatch() {
        let mut rng = SimRng::new(5);
        let mut evolver = Evolver::new(config(2), SimRng::new(6));
        let err = evolver
            .set_population(brains(3, &mut rng), vec![1.0, 2.0])
            .unwrap_err();
        assert!(matches!(
            err,
            EvolverError::PopulationSizeMismatch {
                brains: 3,
                scores: 2
            }
        ));
    }

    #[test]
    fn test_mixed_topologies_surface_error() {
        let mut evolver = Evolver::new(
            EvolutionConfig {
                crossover_rate: 1.0,
                tournament_size: 1,
                ..config(0)
            },
            SimRng::new(8),
        );
        let mut rng = SimRng::new(9);

        // Offspring of a brain crossed with itself are fine, so retry until
        // the two topologies are paired.
        let failed = (0..32).any(|_| {
            let population = vec![
                Brain::random(&[16, 6, 4], &mut rng).unwrap(),
                Brain::random(&[16, 3, 4], &mut rng).unwrap(),
            ];
            evolver.set_population(population, vec![1.0, 1.0]).unwrap();
            matches!(
                evolver.evolve(),
                Err(EvolverError::Brain(BrainError::StructureMismatch { .. }))
            )
        });
        assert!(failed);
    }

    #[test]
    fn test_population_consumed_once() {
        let mut rng = SimRng::new(10);
        let mut evolver = Evolver::new(config(1), SimRng::new(11));
        evolver
            .set_population(brains(3, &mut rng), vec![1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(evolver.evolve().unwrap().len(), 3);
        assert_eq!(evolver.population_len(), 0);
        // Nothing held: falls back to a fresh generation.
        assert_eq!(evolver.evolve().unwrap().len(), 8);
    }

    proptest! {
        #[test]
        fn prop_population_size_invariant(
            seed in any::<u64>(),
            size in 1usize..24,
            elitism in 0usize..6,
        ) {
            let mut rng = SimRng::new(seed);
            let population = brains(size, &mut rng);
            let scores: Vec<f32> = (0..size).map(|_| rng.uniform(-100.0, 100.0)).collect();

            let mut evolver = Evolver::new(config(elitism), rng.fork());
            evolver.set_population(population, scores).unwrap();
            let next = evolver.evolve().unwrap();
            prop_assert_eq!(next.len(), size);
        }
    }
}
