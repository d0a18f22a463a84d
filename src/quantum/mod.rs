pub mod effect;
pub mod register;
pub mod grouping;


pub use effect::{Amplitude, Effect, Unitary};
pub use register::{Distribution, JointHistogram, Outcome, QuantumRegister, STATE_SPACE};
pub use grouping::{Group, GroupId, GroupingSystem};

use log::debug;
use std::fmt;
use std::hash::Hash;

use crate::error::{QuantumError, QuantumResult};

/// Register and grouping kept in step: every registered object has a group,
/// every controlled effect joins the two groups it touched.
#[derive(Debug, Clone)]
pub struct QuantumSystem<K> {
    register: QuantumRegister,
    grouping: GroupingSystem<K>,
    trials: usize,
}

impl<K> QuantumSystem<K>
where
    K: Clone + Eq + Hash + fmt::Display + AsRef<str>,
{
    pub fn new(register: QuantumRegister, trials: usize) -> Self {
        Self {
            register,
            grouping: GroupingSystem::new(),
            trials,
        }
    }

    pub fn register(&self) -> &QuantumRegister {
        &self.register
    }

    pub fn grouping(&self) -> &GroupingSystem<K> {
        &self.grouping
    }

    /// Sampling budget used for every histogram.
    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn contains(&self, key: &K) -> bool {
        self.register.contains(key.as_ref())
    }

    pub fn add_object(&mut self, key: K) -> QuantumResult<GroupId> {
        if self.contains(&key) || self.grouping.find(&key).is_some() {
            return Err(QuantumError::DuplicateObject(key.to_string()));
        }
        self.register.add_object(key.as_ref(), STATE_SPACE)?;
        self.grouping.add(key, None)
    }

    pub fn apply(&mut self, effect: &Effect, target: &K) -> QuantumResult<()> {
        self.register.apply(effect, target.as_ref(), None)
    }

    /// quantum_if(control).apply(effect)(target), then joins both groups.
    pub fn apply_controlled(&mut self, effect: &Effect, control: &K, target: &K) -> QuantumResult<GroupId> {
        if self.grouping.find(target).is_none() {
            return Err(QuantumError::UnknownObject(target.to_string()));
        }
        self.register.apply(effect, target.as_ref(), Some(control.as_ref()))?;
        let group = self.grouping.join(control, target)?;
        debug!("quantum: {} entangled with {} in group {}", control, target, group);
        Ok(group)
    }

    /// Пересчитывает совместную гистограмму группы объекта и кэширует её
    pub fn refresh_group(&mut self, key: &K) -> QuantumResult<GroupId> {
        let id = self
            .grouping
            .find(key)
            .ok_or_else(|| QuantumError::UnknownObject(key.to_string()))?;
        let objects = self
            .grouping
            .group(id)
            .map(|g| g.objects.clone())
            .ok_or(QuantumError::UnknownGroup(id))?;
        let states = self.register.sample_joint_histogram(&objects, self.trials)?;
        self.grouping.set_states(id, states)?;
        Ok(id)
    }

    pub fn marginal(&mut self, key: &K) -> QuantumResult<Distribution> {
        let mut distributions = self.register.sample_probabilities(std::slice::from_ref(key), self.trials)?;
        distributions
            .pop()
            .ok_or_else(|| QuantumError::UnknownObject(key.to_string()))
    }

    pub fn correlation_tick(&mut self) -> Vec<(K, u8)> {
        self.grouping.correlation_tick()
    }

    pub fn clear(&mut self) {
        self.register.clear();
        self.grouping.clear();
    }
}
