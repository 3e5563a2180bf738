//! Fixed-topology feed-forward network with genetic operators.
//!
//! Weights for each layer transition are stored flat, indexed
//! `input * out + output`. Hidden layers use ReLU and the final layer a
//! logistic sigmoid, so every output lies in `(0, 1)`.

use super::rng::SimRng;

/// Errors raised by brain construction and genetic operators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrainError {
    #[error("Invalid topology {0:?}: need at least two non-empty layers")]
    InvalidTopology(Vec<usize>),
    #[error("Structure mismatch: {left:?} vs {right:?}")]
    StructureMismatch { left: Vec<usize>, right: Vec<usize> },
    #[error("Input size mismatch: expected {expected}, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },
    #[error("Parameter shape does not match topology at layer {layer}")]
    ParameterShape { layer: usize },
}

/// Feed-forward neural network.
#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    layer_sizes: Vec<usize>,
    weights: Vec<Vec<f32>>,
    biases: Vec<Vec<f32>>,
}

impl Brain {
    /// Create a brain with every parameter drawn uniformly from `[-1, 1]`.
    pub fn random(layer_sizes: &[usize], rng: &mut SimRng) -> Result<Self, BrainError> {
        check_topology(layer_sizes)?;

        let (weights, biases): (Vec<Vec<f32>>, Vec<Vec<f32>>) = layer_sizes
            .windows(2)
            .map(|pair| {
                let w: Vec<f32> = (0..pair[0] * pair[1]).map(|_| rng.uniform(-1.0, 1.0)).collect();
                let b: Vec<f32> = (0..pair[1]).map(|_| rng.uniform(-1.0, 1.0)).collect();
                (w, b)
            })
            .unzip();

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            weights,
            biases,
        })
    }

    /// Assemble a brain from explicit parameters.
    pub fn from_parts(
        layer_sizes: Vec<usize>,
        weights: Vec<Vec<f32>>,
        biases: Vec<Vec<f32>>,
    ) -> Result<Self, BrainError> {
        check_topology(&layer_sizes)?;
        let transitions = layer_sizes.len() - 1;
        if weights.len() != transitions || biases.len() != transitions {
            return Err(BrainError::ParameterShape {
                layer: weights.len().min(biases.len()),
            });
        }
        for (layer, pair) in layer_sizes.windows(2).enumerate() {
            if weights[layer].len() != pair[0] * pair[1] || biases[layer].len() != pair[1] {
                return Err(BrainError::ParameterShape { layer });
            }
        }

        Ok(Self {
            layer_sizes,
            weights,
            biases,
        })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    pub fn weights(&self) -> &[Vec<f32>] {
        &self.weights
    }

    pub fn biases(&self) -> &[Vec<f32>] {
        &self.biases
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.weights.iter().map(Vec::len).sum::<usize>()
            + self.biases.iter().map(Vec::len).sum::<usize>()
    }

    /// Structure-compatible brains share the same layer sizes.
    pub fn is_compatible(&self, other: &Brain) -> bool {
        self.layer_sizes == other.layer_sizes
    }

    /// Forward pass.
    pub fn infer(&self, input: &[f32]) -> Result<Vec<f32>, BrainError> {
        if input.len() != self.input_size() {
            return Err(BrainError::InputSizeMismatch {
                expected: self.input_size(),
                actual: input.len(),
            });
        }

        let last = self.weights.len() - 1;
        let mut current = input.to_vec();

        for (layer, (weights, biases)) in self.weights.iter().zip(&self.biases).enumerate() {
            let out = biases.len();
            let mut next = biases.clone();
            for (i, value) in current.iter().enumerate() {
                let row = &weights[i * out..(i + 1) * out];
                for (acc, w) in next.iter_mut().zip(row) {
                    *acc += value * w;
                }
            }

            if layer == last {
                next.iter_mut().for_each(|v| *v = sigmoid(*v));
            } else {
                next.iter_mut().for_each(|v| *v = v.max(0.0));
            }
            current = next;
        }

        Ok(current)
    }

    /// Single-point crossover per weight matrix and per bias vector.
    ///
    /// Elements before a randomly drawn split come from `a`, the rest
    /// from `b`.
    pub fn crossover(a: &Brain, b: &Brain, rng: &mut SimRng) -> Result<Brain, BrainError> {
        if !a.is_compatible(b) {
            return Err(BrainError::StructureMismatch {
                left: a.layer_sizes.clone(),
                right: b.layer_sizes.clone(),
            });
        }

        let weights = a
            .weights
            .iter()
            .zip(&b.weights)
            .map(|(wa, wb)| splice(wa, wb, rng))
            .collect();
        let biases = a
            .biases
            .iter()
            .zip(&b.biases)
            .map(|(ba, bb)| splice(ba, bb, rng))
            .collect();

        Ok(Brain {
            layer_sizes: a.layer_sizes.clone(),
            weights,
            biases,
        })
    }

    /// Perturb each parameter with probability `rate` by a uniform value in
    /// `[-amount, amount]`.
    pub fn mutate(&mut self, rate: f32, amount: f32, rng: &mut SimRng) {
        if rate <= 0.0 {
            return;
        }
        let params = self
            .weights
            .iter_mut()
            .chain(self.biases.iter_mut())
            .flat_map(|layer| layer.iter_mut());
        for param in params {
            if rng.chance(rate) {
                *param += rng.uniform(-amount, amount);
            }
        }
    }
}

fn check_topology(layer_sizes: &[usize]) -> Result<(), BrainError> {
    if layer_sizes.len() < 2 || layer_sizes.contains(&0) {
        return Err(BrainError::InvalidTopology(layer_sizes.to_vec()));
    }
    Ok(())
}

fn splice(a: &[f32], b: &[f32], rng: &mut SimRng) -> Vec<f32> {
    let split = rng.index(a.len());
    a[..split].iter().chain(&b[split..]).copied().collect()
}

/// Largest `f32` strictly below one.
const SIGMOID_CEILING: f32 = 1.0 - f32::EPSILON / 2.0;

/// Logistic function evaluated in `f64` and kept inside the open interval (0, 1).
#[inline]
fn sigmoid(x: f32) -> f32 {
    let y = 1.0 / (1.0 + (-f64::from(x)).exp());
    (y as f32).clamp(f32::MIN_POSITIVE, SIGMOID_CEILING)
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uniform_brain(layers: &[usize], weight: f32, bias: f32) -> Brain {
        let weights = layers.windows(2).map(|p| vec![weight; p[0] * p[1]]).collect();
        let biases = layers.windows(2).map(|p| vec![bias; p[1]]).collect();
        Brain::from_parts(layers.to_vec(), weights, biases).unwrap()
    }

    fn params(brain: &Brain) -> Vec<f32> {
        brain
            .weights()
            .iter()
            .chain(brain.biases())
            .flatten()
            .copied()
            .collect()
    }

    #[test]
    fn test_infer_known_value() {
        let brain = uniform_brain(&[2, 2, 1], 0.5, 0.0);
        let out = brain.infer(&[1.0, 0.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.622_459_3).abs() < 1e-6);
    }

    #[test]
    fn test_infer_deterministic_and_bounded() {
        let mut rng = SimRng::new(4);
        let brain = Brain::random(&[16, 12, 4], &mut rng).unwrap();
        let input: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();

        let first = brain.infer(&input).unwrap();
        let second = brain.infer(&input).unwrap();
        assert_eq!(first.len(), 4);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.to_bits(), b.to_bits());
            assert!(*a > 0.0 && *a < 1.0);
        }
    }

    #[test]
    fn test_relu_clamps_hidden() {
        // Negative hidden pre-activations are zeroed, leaving only the bias.
        let brain = uniform_brain(&[1, 3, 1], -1.0, 0.0);
        let out = brain.infer(&[2.0]).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_saturated_outputs_stay_open_interval() {
        let brain = uniform_brain(&[16, 12, 4], 1.0, 0.0);
        let out = brain.infer(&[0.8; 16]).unwrap();
        assert!(out.iter().all(|v| *v > 0.0 && *v < 1.0), "{out:?}");

        let weights = vec![vec![1.0; 16 * 12], vec![-1.0; 12 * 4]];
        let biases = vec![vec![0.0; 12], vec![0.0; 4]];
        let brain = Brain::from_parts(vec![16, 12, 4], weights, biases).unwrap();
        let out = brain.infer(&[0.8; 16]).unwrap();
        assert!(out.iter().all(|v| *v > 0.0 && *v < 1.0), "{out:?}");
    }

    #[test]
    fn test_parameter_count() {
        let brain = uniform_brain(&[16, 12, 4], 0.0, 0.0);
        assert_eq!(brain.parameter_count(), 16 * 12 + 12 + 12 * 4 + 4);
        assert_eq!(brain.parameter_count(), params(&brain).len());
    }

    #[test]
    fn test_input_size_mismatch() {
        let brain = uniform_brain(&[2, 2, 1], 0.5, 0.0);
        assert_eq!(
            brain.infer(&[1.0]),
            Err(BrainError::InputSizeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_invalid_topology() {
        let mut rng = SimRng::new(0);
        assert!(matches!(
            Brain::random(&[4], &mut rng),
            Err(BrainError::InvalidTopology(_))
        ));
        assert!(matches!(
            Brain::random(&[4, 0, 2], &mut rng),
            Err(BrainError::InvalidTopology(_))
        ));
        assert!(matches!(
            Brain::from_parts(vec![2, 1], vec![vec![0.0; 3]], vec![vec![0.0]]),
            Err(BrainError::ParameterShape { layer: 0 })
        ));
    }

    #[test]
    fn test_clone_independence() {
        let mut rng = SimRng::new(9);
        let original = Brain::random(&[4, 3, 2], &mut rng).unwrap();
        let snapshot = params(&original);

        let mut copy = original.clone();
        copy.mutate(1.0, 0.5, &mut rng);

        assert_eq!(params(&original), snapshot);
        assert_ne!(params(&copy), snapshot);
    }

    #[test]
    fn test_crossover_structure_mismatch() {
        let mut rng = SimRng::new(1);
        let a = Brain::random(&[4, 3, 2], &mut rng).unwrap();
        let b = Brain::random(&[4, 5, 2], &mut rng).unwrap();
        assert!(!a.is_compatible(&b));
        assert!(matches!(
            Brain::crossover(&a, &b, &mut rng),
            Err(BrainError::StructureMismatch { .. })
        ));
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.9]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    proptest! {
        #[test]
        fn prop_crossover_takes_parent_values(seed in any::<u64>()) {
            let mut rng = SimRng::new(seed);
            let a = Brain::random(&[5, 4, 3], &mut rng).unwrap();
            let b = Brain::random(&[5, 4, 3], &mut rng).unwrap();
            let child = Brain::crossover(&a, &b, &mut rng).unwrap();

            prop_assert!(child.is_compatible(&a));
            for ((c, pa), pb) in params(&child).iter().zip(params(&a)).zip(params(&b)) {
                prop_assert!(c.to_bits() == pa.to_bits() || c.to_bits() == pb.to_bits());
            }
        }

        #[test]
        fn prop_mutation_bounds(seed in any::<u64>(), amount in 0.0f32..2.0) {
            let mut rng = SimRng::new(seed);
            let original = Brain::random(&[6, 4, 2], &mut rng).unwrap();

            let mut untouched = original.clone();
            untouched.mutate(0.0, amount, &mut rng);
            prop_assert_eq!(&untouched, &original);

            let mut mutated = original.clone();
            mutated.mutate(1.0, amount, &mut rng);
            for (m, o) in params(&mutated).iter().zip(params(&original)) {
                prop_assert!((m - o).abs() <= amount + 1e-5);
            }
        }
    }
}
