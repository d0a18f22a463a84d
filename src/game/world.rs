use log::{debug, info, warn};
use std::collections::HashMap;

use crate::config::GameConfig;
use crate::error::{GameError, GameResult, QuantumError};
use crate::game::gates::{EffectDescriptor, GateCatalog};
use crate::game::hotbar::Hotbar;
use crate::game::level::{LevelDescription, TileType};
use crate::game::objects::{EnterOutcome, Interactable, LootableObject, QuantumPillar, WorldObject};
use crate::game::position::{Direction, ObjectKey, Position};
use crate::quantum::{Group, QuantumRegister, QuantumSystem};

/// Append-only record of an applied effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectHistoryEntry {
    pub descriptor: EffectDescriptor,
    pub key: ObjectKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Position),
    Blocked,
    /// The player stepped onto an END tile.
    ReachedExit,
}

/// One loaded level: tiles, objects, player, hotbar and the quantum state behind the pillars.
#[derive(Debug, Clone)]
pub struct World {
    catalog: GateCatalog,
    quantum: QuantumSystem<ObjectKey>,
    tiles: HashMap<Position, TileType>,
    objects: HashMap<Position, WorldObject>,
    hotbar: Hotbar,
    player: Option<Position>,
    effect_history: Vec<EffectHistoryEntry>,
}

impl World {
    pub fn new(config: &GameConfig, catalog: GateCatalog) -> Self {
        let register = QuantumRegister::with_max_objects(config.seed, config.max_objects);
        Self {
            catalog,
            quantum: QuantumSystem::new(register, config.sampling_budget),
            tiles: HashMap::new(),
            objects: HashMap::new(),
            hotbar: Hotbar::new(),
            player: None,
            effect_history: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    pub fn quantum(&self) -> &QuantumSystem<ObjectKey> {
        &self.quantum
    }

    pub fn tiles(&self) -> &HashMap<Position, TileType> {
        &self.tiles
    }

    pub fn tile(&self, position: Position) -> Option<TileType> {
        self.tiles.get(&position).copied()
    }

    pub fn objects(&self) -> &HashMap<Position, WorldObject> {
        &self.objects
    }

    pub fn object(&self, position: Position) -> Option<&WorldObject> {
        self.objects.get(&position)
    }

    pub fn hotbar(&self) -> &Hotbar {
        &self.hotbar
    }

    pub fn player(&self) -> Option<Position> {
        self.player
    }

    pub fn effect_history(&self) -> &[EffectHistoryEntry] {
        &self.effect_history
    }

    pub fn pillar(&self, position: Position) -> GameResult<&QuantumPillar> {
        self.objects
            .get(&position)
            .and_then(WorldObject::as_pillar)
            .ok_or(GameError::UnknownPosition(position))
    }

    fn pillar_mut(&mut self, position: Position) -> GameResult<&mut QuantumPillar> {
        self.objects
            .get_mut(&position)
            .and_then(WorldObject::as_pillar_mut)
            .ok_or(GameError::UnknownPosition(position))
    }

    pub fn group_of(&self, position: Position) -> Option<&Group<ObjectKey>> {
        self.quantum.grouping().group_of(&position.key())
    }

    /// Positions entangled with the pillar at `position`, itself excluded.
    pub fn entangled_with(&self, position: Position) -> Vec<Position> {
        let Some(group) = self.group_of(position) else {
            return Vec::new();
        };
        group
            .objects
            .iter()
            .filter_map(|key| key.as_ref().parse::<Position>().ok())
            .filter(|p| *p != position)
            .collect()
    }

    /// Resets tiles, objects, hotbar, register and groups. The effect history is kept.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.objects.clear();
        self.hotbar.clear();
        self.quantum.clear();
        self.player = None;
    }

    /// Заменяет текущее содержимое мира описанием уровня
    ///
    /// The level is built on a staged copy that replaces `self` only once every
    /// pillar and load-time effect went through. On error the old level stays.
    pub fn load_level(&mut self, level: &LevelDescription) -> GameResult<()> {
        let tiles = level.tiles()?;
        let lootables = level.lootables()?;
        let pillars = level.quantum_positions()?;
        let effects = level
            .effects
            .iter()
            .map(|entry| entry.resolve())
            .collect::<GameResult<Vec<_>>>()?;
        if !tiles.iter().any(|(_, kind)| *kind == TileType::Start) {
            return Err(GameError::MissingStart);
        }

        let mut staged = self.clone();
        staged.clear();
        for (position, kind) in tiles {
            if kind == TileType::Start {
                staged.player = Some(position);
            }
            staged.tiles.insert(position, kind);
        }
        for (position, item) in lootables {
            staged
                .objects
                .insert(position, WorldObject::Lootable(LootableObject { position, item }));
        }
        for position in pillars {
            staged.add_pillar(position)?;
        }
        for (gate, count) in &level.gates {
            staged.hotbar.add_item(gate, *count);
        }
        for (position, descriptor) in effects {
            staged.apply_effect(position, Some(descriptor))?;
        }

        *self = staged;
        info!(
            "level loaded: {} tiles, {} objects, {} pillars, {} hotbar slots",
            self.tiles.len(),
            self.objects.len(),
            self.quantum.register().len(),
            self.hotbar.slots().len()
        );
        Ok(())
    }

    /// Places a pillar and registers it as a fresh EMPTY object in its own group.
    pub fn add_pillar(&mut self, position: Position) -> GameResult<()> {
        if let Some(WorldObject::Lootable(_)) = self.objects.get(&position) {
            return Err(GameError::OccupiedPosition(position));
        }
        let key = position.key();
        self.quantum.add_object(key.clone())?;
        let states = self.quantum.marginal(&key)?;
        self.objects
            .insert(position, WorldObject::Pillar(QuantumPillar::new(position, states)));
        Ok(())
    }

    /// Applies one gate to the pillar at `position`, or only refreshes it when
    /// `descriptor` is `None`.
    ///
    /// Every lookup happens before the first mutation, so a failed call leaves
    /// the register, groups, history and pillars as they were.
    pub fn apply_effect(&mut self, position: Position, descriptor: Option<EffectDescriptor>) -> GameResult<()> {
        let marker = self.pillar(position)?.next_phase_marker(descriptor.as_ref());

        let reference = match descriptor {
            Some(EffectDescriptor::Controlled { target, .. }) => {
                if target == position {
                    return Err(QuantumError::InvalidControl(position.key().to_string()).into());
                }
                Some((target, self.pillar(target)?.next_phase_marker(None)))
            }
            _ => None,
        };

        if let Some(descriptor) = descriptor {
            self.apply_and_log(position, descriptor)?;
        }
        if let Some((target, target_marker)) = reference {
            self.refresh_display_state(target, target_marker)?;
        }
        self.refresh_display_state(position, marker)
    }

    /// Register mutation, group merge, history entry and group histogram.
    fn apply_and_log(&mut self, position: Position, descriptor: EffectDescriptor) -> GameResult<()> {
        let key = position.key();
        match descriptor {
            EffectDescriptor::Plain(effect) => {
                self.quantum.apply(&effect, &key)?;
            }
            EffectDescriptor::Controlled { effect, target } => {
                self.quantum.apply_controlled(&effect, &key, &target.key())?;
            }
        }

        debug!("effect {} applied at {}", descriptor, key);
        self.effect_history.push(EffectHistoryEntry {
            descriptor,
            key: key.clone(),
        });
        self.quantum.refresh_group(&key)?;
        Ok(())
    }

    /// Resamples the pillar's marginal and recolours it.
    fn refresh_display_state(&mut self, position: Position, marker: bool) -> GameResult<()> {
        let states = self.quantum.marginal(&position.key())?;
        let pillar = self.pillar_mut(position)?;
        pillar.states = states;
        pillar.phase_marker = marker;
        pillar.recolor();
        Ok(())
    }

    /// Uses one item of gate `name` on the pillar at `position`.
    ///
    /// Control gates need `second_target`, the pillar the controlled effect lands on.
    /// The item is consumed only when the effect went through.
    pub fn use_gate(&mut self, name: &str, position: Position, second_target: Option<Position>) -> GameResult<()> {
        let spec = *self
            .catalog
            .get(name)
            .ok_or_else(|| GameError::UnknownGate(name.to_string()))?;
        if self.hotbar.count(name) == 0 {
            return Err(GameError::GateUnavailable(name.to_string()));
        }
        let player = self.player.ok_or(GameError::MissingStart)?;
        if !player.within_reach(&position) {
            return Err(GameError::OutOfReach(position));
        }
        self.pillar(position)?;

        let descriptor = if spec.requires_second_target {
            match second_target {
                Some(target) if target != position => EffectDescriptor::Controlled {
                    effect: spec.effect,
                    target,
                },
                _ => return Err(GameError::MissingSecondTarget(name.to_string())),
            }
        } else {
            EffectDescriptor::Plain(spec.effect)
        };

        self.apply_effect(position, Some(descriptor))?;
        self.hotbar.remove_one(name)
    }

    /// Player step state machine: exit, object interaction, free tile, or nothing.
    pub fn move_player(&mut self, direction: Direction) -> MoveOutcome {
        let Some(current) = self.player else {
            return MoveOutcome::Blocked;
        };
        let destination = current.step(direction);
        let tile = self.tile(destination);

        if tile == Some(TileType::End) {
            self.player = Some(destination);
            return MoveOutcome::ReachedExit;
        }

        if let Some(object) = self.objects.get(&destination) {
            return match object.on_player_enter(&mut self.hotbar) {
                EnterOutcome::Blocked => MoveOutcome::Blocked,
                EnterOutcome::Passable => {
                    self.player = Some(destination);
                    MoveOutcome::Moved(destination)
                }
                EnterOutcome::Consumed => {
                    self.objects.remove(&destination);
                    self.player = Some(destination);
                    MoveOutcome::Moved(destination)
                }
            };
        }

        match tile {
            Some(kind) if kind != TileType::Wall => {
                self.player = Some(destination);
                MoveOutcome::Moved(destination)
            }
            _ => MoveOutcome::Blocked,
        }
    }

    /// Steps the correlation display: pillars of multi-outcome groups get the
    /// alpha of the currently shown joint outcome.
    pub fn correlation_update(&mut self) {
        for (key, alpha) in self.quantum.correlation_tick() {
            match key.as_ref().parse::<Position>() {
                Ok(position) => {
                    if let Ok(pillar) = self.pillar_mut(position) {
                        pillar.set_alpha(alpha);
                    }
                }
                Err(_) => warn!("correlation update: bad object key {}", key),
            }
        }
    }
}
