pub mod quantum;
pub mod game;
pub mod config;
pub mod error;

pub use config::GameConfig;
pub use error::{GameError, QuantumError};
pub use game::{GateCatalog, Session, World};
pub use quantum::{Effect, GroupingSystem, QuantumRegister, QuantumSystem};
