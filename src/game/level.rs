use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{GameError, GameResult};
use crate::game::gates::EffectDescriptor;
use crate::game::position::Position;
use crate::quantum::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Empty,
    Start,
    End,
    Del,
    Wall,
}

impl FromStr for TileType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPTY" => Ok(TileType::Empty),
            "START" => Ok(TileType::Start),
            "END" => Ok(TileType::End),
            "DEL" => Ok(TileType::Del),
            "WALL" => Ok(TileType::Wall),
            other => Err(GameError::UnknownTile(other.to_string())),
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileType::Empty => "EMPTY",
            TileType::Start => "START",
            TileType::End => "END",
            TileType::Del => "DEL",
            TileType::Wall => "WALL",
        };
        f.write_str(name)
    }
}

/// One load-time effect: `effect` applied to the object at `position`,
/// controlled onto `target` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub effect: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl EffectEntry {
    pub fn resolve(&self) -> GameResult<(Position, EffectDescriptor)> {
        let position: Position = self.position.parse()?;
        let effect: Effect = self.effect.parse()?;
        let descriptor = match &self.target {
            Some(target) => EffectDescriptor::Controlled {
                effect,
                target: target.parse()?,
            },
            None => EffectDescriptor::Plain(effect),
        };
        Ok((position, descriptor))
    }
}

/// Level file as stored on disk (`<levels_dir>/<n>.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    #[serde(default)]
    pub tiles: BTreeMap<String, String>,
    /// Position -> lootable item name.
    #[serde(default)]
    pub objects: BTreeMap<String, String>,
    #[serde(default)]
    pub quantum_objects: Vec<String>,
    /// Gate name -> initial hotbar count, in file order.
    #[serde(default, with = "gate_counts")]
    pub gates: Vec<(String, u32)>,
    #[serde(default)]
    pub effects: Vec<EffectEntry>,
}

impl LevelDescription {
    pub fn from_json_str(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> GameResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn tiles(&self) -> GameResult<Vec<(Position, TileType)>> {
        self.tiles
            .iter()
            .map(|(pos, kind)| -> GameResult<(Position, TileType)> { Ok((pos.parse()?, kind.parse()?)) })
            .collect()
    }

    pub fn lootables(&self) -> GameResult<Vec<(Position, String)>> {
        self.objects
            .iter()
            .map(|(pos, item)| -> GameResult<(Position, String)> { Ok((pos.parse()?, item.clone())) })
            .collect()
    }

    pub fn quantum_positions(&self) -> GameResult<Vec<Position>> {
        self.quantum_objects.iter().map(|pos| pos.parse()).collect()
    }
}

/// `{"X": 2, "CNOT": 1}` read and written as an ordered list of pairs.
mod gate_counts {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(gates: &[(String, u32)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(gates.iter().map(|(name, count)| (name, count)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, u32)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GateCountsVisitor;

        impl<'de> Visitor<'de> for GateCountsVisitor {
            type Value = Vec<(String, u32)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of gate name to count")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut gates = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, count)) = map.next_entry::<String, u32>()? {
                    gates.push((name, count));
                }
                Ok(gates)
            }
        }

        deserializer.deserialize_map(GateCountsVisitor)
    }
}

pub fn level_path(levels_dir: &Path, level: u32) -> PathBuf {
    levels_dir.join(format!("{}.json", level))
}
