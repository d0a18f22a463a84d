use log::{debug, info};
use nalgebra::Vector2;
use rand::distributions::{Distribution as _, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::error::{QuantumError, QuantumResult};
use crate::quantum::effect::{Amplitude, Effect};

/// Number of basis states of every simulated object (EMPTY, FULL).
pub const STATE_SPACE: usize = 2;
pub const DEFAULT_MAX_OBJECTS: usize = 20;

/// Marginal distribution of one object, indexed by state value.
pub type Distribution = Vec<f64>;
/// One value per object, in the order the objects were requested.
pub type Outcome = Vec<usize>;
/// Outcome tuple -> number of times it was observed. Ordered by outcome.
pub type JointHistogram = BTreeMap<Outcome, usize>;

/// Dense state-vector register. Object `i` is bit `i` of the basis index.
#[derive(Debug, Clone)]
pub struct QuantumRegister {
    amplitudes: Vec<Amplitude>,
    objects: Vec<String>,
    index: HashMap<String, usize>,
    max_objects: usize,
    rng: StdRng,
}

impl QuantumRegister {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_max_objects(seed, DEFAULT_MAX_OBJECTS)
    }

    pub fn with_max_objects(seed: Option<u64>, max_objects: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            amplitudes: vec![Amplitude::new(1.0, 0.0)],
            objects: Vec::new(),
            index: HashMap::new(),
            max_objects,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in registration order.
    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    /// Добавляет объект в состоянии EMPTY (|0>)
    pub fn add_object(&mut self, key: &str, state_space_size: usize) -> QuantumResult<()> {
        if self.index.contains_key(key) {
            return Err(QuantumError::DuplicateObject(key.to_string()));
        }
        if state_space_size != STATE_SPACE {
            return Err(QuantumError::UnsupportedStateSpace {
                key: key.to_string(),
                size: state_space_size,
            });
        }
        if self.objects.len() >= self.max_objects {
            return Err(QuantumError::RegisterFull { max: self.max_objects });
        }

        // The new bit starts at 0, so every amplitude with that bit set is zero.
        let len = self.amplitudes.len();
        self.amplitudes.resize(len * 2, Amplitude::new(0.0, 0.0));

        self.index.insert(key.to_string(), self.objects.len());
        self.objects.push(key.to_string());
        debug!("register: added {} as qubit {}", key, self.objects.len() - 1);
        Ok(())
    }

    /// Применяет эффект к `target`; если задан `control`, только там, где control = FULL
    pub fn apply(&mut self, effect: &Effect, target: &str, control: Option<&str>) -> QuantumResult<()> {
        let target_bit = self.qubit(target)?;
        let control_mask = match control {
            Some(key) => {
                let control_bit = self.qubit(key)?;
                if control_bit == target_bit {
                    return Err(QuantumError::InvalidControl(key.to_string()));
                }
                Some(1usize << control_bit)
            }
            None => None,
        };

        let unitary = effect.unitary();
        let target_mask = 1usize << target_bit;
        for idx in 0..self.amplitudes.len() {
            if idx & target_mask != 0 {
                continue;
            }
            if let Some(mask) = control_mask {
                if idx & mask == 0 {
                    continue;
                }
            }
            let pair = Vector2::new(self.amplitudes[idx], self.amplitudes[idx | target_mask]);
            let out = unitary * pair;
            self.amplitudes[idx] = out[0];
            self.amplitudes[idx | target_mask] = out[1];
        }

        match control {
            Some(key) => debug!("register: {} on {} controlled by {}", effect, target, key),
            None => debug!("register: {} on {}", effect, target),
        }
        Ok(())
    }

    /// Exact marginal distributions, computed from the amplitudes.
    pub fn probabilities<K: AsRef<str>>(&self, objects: &[K]) -> QuantumResult<Vec<Distribution>> {
        let bits = self.qubits(objects)?;
        let basis = self.basis_probabilities();
        Ok(bits
            .iter()
            .map(|&bit| {
                let mask = 1usize << bit;
                let full: f64 = basis
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| idx & mask != 0)
                    .map(|(_, p)| p)
                    .sum();
                vec![1.0 - full, full]
            })
            .collect())
    }

    /// Marginal distribution per object, estimated from `trials` simulated
    /// measurements. The amplitudes are not touched.
    pub fn sample_probabilities<K: AsRef<str>>(&mut self, objects: &[K], trials: usize) -> QuantumResult<Vec<Distribution>> {
        let bits = self.qubits(objects)?;
        let samples = self.sample_basis(trials)?;

        let mut counts = vec![[0usize; STATE_SPACE]; bits.len()];
        for idx in samples {
            for (slot, &bit) in bits.iter().enumerate() {
                counts[slot][(idx >> bit) & 1] += 1;
            }
        }

        Ok(counts
            .iter()
            .map(|c| c.iter().map(|&n| n as f64 / trials as f64).collect())
            .collect())
    }

    /// Joint histogram over the given objects, `trials` simulated measurements.
    pub fn sample_joint_histogram<K: AsRef<str>>(&mut self, objects: &[K], trials: usize) -> QuantumResult<JointHistogram> {
        let bits = self.qubits(objects)?;
        let samples = self.sample_basis(trials)?;

        let mut histogram = JointHistogram::new();
        for idx in samples {
            let outcome: Outcome = bits.iter().map(|&bit| (idx >> bit) & 1).collect();
            *histogram.entry(outcome).or_insert(0) += 1;
        }
        Ok(histogram)
    }

    pub fn clear(&mut self) {
        info!("register: cleared {} objects", self.objects.len());
        self.amplitudes = vec![Amplitude::new(1.0, 0.0)];
        self.objects.clear();
        self.index.clear();
    }

    fn qubit(&self, key: &str) -> QuantumResult<usize> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| QuantumError::UnknownObject(key.to_string()))
    }

    fn qubits<K: AsRef<str>>(&self, objects: &[K]) -> QuantumResult<Vec<usize>> {
        objects.iter().map(|key| self.qubit(key.as_ref())).collect()
    }

    fn basis_probabilities(&self) -> Vec<f64> {
        self.amplitudes.par_iter().map(|a| a.norm_sqr()).collect()
    }

    fn sample_basis(&mut self, trials: usize) -> QuantumResult<Vec<usize>> {
        if trials == 0 {
            return Err(QuantumError::Sampling("trial count must be positive".to_string()));
        }
        let weights = self.basis_probabilities();
        let dist = WeightedIndex::new(&weights).map_err(|e| QuantumError::Sampling(e.to_string()))?;
        Ok((0..trials).map(|_| dist.sample(&mut self.rng)).collect())
    }
}

impl Default for QuantumRegister {
    fn default() -> Self {
        Self::new(None)
    }
}
