pub mod position;
pub mod gates;
pub mod hotbar;
pub mod objects;
pub mod level;
pub mod world;
pub mod session;

pub use position::{Direction, ObjectKey, Position};
pub use gates::{EffectDescriptor, GateCatalog, GateSpec};
pub use hotbar::{Hotbar, ItemSlot};
pub use objects::{DisplayColor, EnterOutcome, Interactable, LootableObject, QuantumPillar, WorldObject};
pub use level::{EffectEntry, LevelDescription, TileType};
pub use world::{EffectHistoryEntry, MoveOutcome, World};
pub use session::{Session, SessionState};
