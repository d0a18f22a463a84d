use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::game::position::Position;
use crate::quantum::Effect;

/// What a single gate application asks for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectDescriptor {
    Plain(Effect),
    /// Effect on the object at `target`, controlled by the object it is applied to.
    Controlled { effect: Effect, target: Position },
}

impl EffectDescriptor {
    pub fn effect(&self) -> &Effect {
        match self {
            EffectDescriptor::Plain(effect) => effect,
            EffectDescriptor::Controlled { effect, .. } => effect,
        }
    }
}

impl fmt::Display for EffectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectDescriptor::Plain(effect) => write!(f, "{}", effect),
            EffectDescriptor::Controlled { effect, target } => write!(f, "[{}, {}]", effect, target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSpec {
    pub effect: Effect,
    /// Control gates wait for a second object before anything is applied.
    pub requires_second_target: bool,
}

/// Gate name -> effect registry, handed to the world at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCatalog {
    gates: BTreeMap<String, GateSpec>,
}

impl GateCatalog {
    pub fn empty() -> Self {
        Self { gates: BTreeMap::new() }
    }

    pub fn with_gate(mut self, name: &str, effect: Effect, requires_second_target: bool) -> Self {
        self.gates.insert(
            name.to_string(),
            GateSpec {
                effect,
                requires_second_target,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&GateSpec> {
        self.gates.get(name)
    }

    pub fn is_control(&self, name: &str) -> bool {
        self.get(name).map(|g| g.requires_second_target).unwrap_or(false)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.gates.keys().map(String::as_str)
    }
}

impl Default for GateCatalog {
    /// X, H, Z, RotY and the two control gates CNOT and CHAD.
    fn default() -> Self {
        Self::empty()
            .with_gate("X", Effect::flip(), false)
            .with_gate("H", Effect::superposition(), false)
            .with_gate("Z", Effect::phase(), false)
            .with_gate("RotY", Effect::third_rotation(), false)
            .with_gate("CNOT", Effect::flip(), true)
            .with_gate("CHAD", Effect::superposition(), true)
    }
}
