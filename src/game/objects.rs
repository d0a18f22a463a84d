use crate::game::gates::EffectDescriptor;
use crate::game::hotbar::Hotbar;
use crate::game::position::{ObjectKey, Position};
use crate::quantum::{Distribution, Effect};

/// Value index of the EMPTY (pillar down) state.
pub const EMPTY: usize = 0;
/// Value index of the FULL (pillar up) state.
pub const FULL: usize = 1;

const INACTIVE_ALPHA: u8 = 150;
const PHASE_CHANNEL: u8 = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl DisplayColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Colour of a pillar from its marginal distribution and phase marker.
    ///
    /// A fully EMPTY pillar is drawn white and translucent; otherwise red follows
    /// p(EMPTY), blue follows p(FULL) and green is lit by the phase marker.
    pub fn from_state(p_empty: f64, marker: bool, p_full: f64) -> Self {
        if p_empty == 1.0 {
            return Self::new(255, 255, 255, INACTIVE_ALPHA);
        }
        Self::new(
            (255.0 * p_empty) as u8,
            if marker { PHASE_CHANNEL } else { 0 },
            (255.0 * p_full) as u8,
            255,
        )
    }
}

/// Result of the player trying to step onto an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    Blocked,
    Passable,
    /// The player may pass and the object leaves the world.
    Consumed,
}

pub trait Interactable {
    fn on_player_enter(&self, hotbar: &mut Hotbar) -> EnterOutcome;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootableObject {
    pub position: Position,
    pub item: String,
}

impl Interactable for LootableObject {
    fn on_player_enter(&self, hotbar: &mut Hotbar) -> EnterOutcome {
        hotbar.add_item(&self.item, 1);
        EnterOutcome::Consumed
    }
}

/// Quantum pillar as the game sees it: cached marginal, phase marker and colour.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumPillar {
    pub position: Position,
    pub states: Distribution,
    pub phase_marker: bool,
    pub color: DisplayColor,
}

impl QuantumPillar {
    pub fn new(position: Position, states: Distribution) -> Self {
        let mut pillar = Self {
            position,
            states,
            phase_marker: false,
            color: DisplayColor::new(255, 255, 255, 255),
        };
        pillar.recolor();
        pillar
    }

    pub fn key(&self) -> ObjectKey {
        self.position.key()
    }

    pub fn p_empty(&self) -> f64 {
        self.states.get(EMPTY).copied().unwrap_or(0.0)
    }

    pub fn p_full(&self) -> f64 {
        self.states.get(FULL).copied().unwrap_or(0.0)
    }

    /// Phase marker after `descriptor`, judged from the cached (pre-effect) state.
    ///
    /// Only plain effects match the effect clauses; controlled descriptors and
    /// refreshes only reset the marker on a fully EMPTY pillar.
    pub fn next_phase_marker(&self, descriptor: Option<&EffectDescriptor>) -> bool {
        let plain = match descriptor {
            Some(EffectDescriptor::Plain(effect)) => Some(*effect),
            _ => None,
        };
        let superposition = plain == Some(Effect::superposition());

        if superposition && self.p_full() == 1.0 {
            true
        } else if plain == Some(Effect::phase()) && self.p_empty() != 1.0 {
            !self.phase_marker
        } else if superposition || self.p_empty() == 1.0 {
            false
        } else {
            self.phase_marker
        }
    }

    pub fn recolor(&mut self) {
        self.color = DisplayColor::from_state(self.p_empty(), self.phase_marker, self.p_full());
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.color.a = alpha;
    }
}

impl Interactable for QuantumPillar {
    /// Only a pillar that is certainly down can be walked through.
    fn on_player_enter(&self, _hotbar: &mut Hotbar) -> EnterOutcome {
        if self.p_empty() == 1.0 {
            EnterOutcome::Passable
        } else {
            EnterOutcome::Blocked
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldObject {
    Lootable(LootableObject),
    Pillar(QuantumPillar),
}

impl WorldObject {
    pub fn as_pillar(&self) -> Option<&QuantumPillar> {
        match self {
            WorldObject::Pillar(pillar) => Some(pillar),
            WorldObject::Lootable(_) => None,
        }
    }

    pub fn as_pillar_mut(&mut self) -> Option<&mut QuantumPillar> {
        match self {
            WorldObject::Pillar(pillar) => Some(pillar),
            WorldObject::Lootable(_) => None,
        }
    }
}

impl Interactable for WorldObject {
    fn on_player_enter(&self, hotbar: &mut Hotbar) -> EnterOutcome {
        match self {
            WorldObject::Lootable(loot) => loot.on_player_enter(hotbar),
            WorldObject::Pillar(pillar) => pillar.on_player_enter(hotbar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar(states: Vec<f64>, marker: bool) -> QuantumPillar {
        let mut p = QuantumPillar::new(Position::new(0, 0), states);
        p.phase_marker = marker;
        p
    }

    #[test]
    fn test_color_rules() {
        assert_eq!(DisplayColor::from_state(1.0, true, 0.0), DisplayColor::new(255, 255, 255, 150));
        assert_eq!(DisplayColor::from_state(0.0, false, 1.0), DisplayColor::new(0, 0, 255, 255));
        assert_eq!(DisplayColor::from_state(0.5, true, 0.5), DisplayColor::new(127, 220, 127, 255));
    }

    #[test]
    fn test_marker_superposition_on_full() {
        let p = pillar(vec![0.0, 1.0], false);
        assert!(p.next_phase_marker(Some(&EffectDescriptor::Plain(Effect::superposition()))));
    }

    #[test]
    fn test_marker_superposition_clears() {
        let p = pillar(vec![0.5, 0.5], true);
        assert!(!p.next_phase_marker(Some(&EffectDescriptor::Plain(Effect::superposition()))));
    }

    #[test]
    fn test_marker_phase_toggles_unless_empty() {
        let mixed = pillar(vec![0.5, 0.5], false);
        let phase = EffectDescriptor::Plain(Effect::phase());
        assert!(mixed.next_phase_marker(Some(&phase)));
        assert!(!pillar(vec![0.5, 0.5], true).next_phase_marker(Some(&phase)));
        assert!(!pillar(vec![1.0, 0.0], true).next_phase_marker(Some(&phase)));
        // A fractional phase is a different effect
        let quarter = EffectDescriptor::Plain(Effect::Phase { fraction: 0.5 });
        assert!(!mixed.next_phase_marker(Some(&quarter)));
    }

    #[test]
    fn test_marker_controlled_and_refresh() {
        let controlled = EffectDescriptor::Controlled {
            effect: Effect::superposition(),
            target: Position::new(1, 0),
        };
        assert!(pillar(vec![0.0, 1.0], true).next_phase_marker(Some(&controlled)));
        assert!(!pillar(vec![1.0, 0.0], true).next_phase_marker(Some(&controlled)));
        assert!(pillar(vec![0.3, 0.7], true).next_phase_marker(None));
        assert!(!pillar(vec![1.0, 0.0], true).next_phase_marker(None));
    }

    #[test]
    fn test_interactions() {
        let mut hotbar = Hotbar::new();
        let loot = WorldObject::Lootable(LootableObject {
            position: Position::new(1, 1),
            item: "H".to_string(),
        });
        assert_eq!(loot.on_player_enter(&mut hotbar), EnterOutcome::Consumed);
        assert_eq!(hotbar.count("H"), 1);

        let down = WorldObject::Pillar(pillar(vec![1.0, 0.0], false));
        let mixed = WorldObject::Pillar(pillar(vec![0.999, 0.001], false));
        assert_eq!(down.on_player_enter(&mut hotbar), EnterOutcome::Passable);
        assert_eq!(mixed.on_player_enter(&mut hotbar), EnterOutcome::Blocked);
        assert_eq!(hotbar.count("H"), 1);
    }
}
