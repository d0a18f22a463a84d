use thiserror::Error;
use std::io;

use crate::game::position::Position;

/// Ошибки квантового регистра и системы групп
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantumError {
    /// Объект не зарегистрирован в регистре
    #[error("Unknown quantum object: {0}")]
    UnknownObject(String),

    /// Объект с таким ключом уже существует
    #[error("Quantum object already registered: {0}")]
    DuplicateObject(String),

    #[error("Unsupported state space of size {size} for {key} (only 2-level objects are simulated)")]
    UnsupportedStateSpace { key: String, size: usize },

    #[error("Register is full: at most {max} objects can be simulated")]
    RegisterFull { max: usize },

    /// Управляющий и целевой объект совпадают
    #[error("Control and target are the same object: {0}")]
    InvalidControl(String),

    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(u64),

    #[error("Sampling failed: {0}")]
    Sampling(String),
}

/// Ошибки игрового уровня
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Quantum(#[from] QuantumError),

    /// В клетке нет квантового объекта
    #[error("No quantum object at {0}")]
    UnknownPosition(Position),

    #[error("Cell {0} already holds an object")]
    OccupiedPosition(Position),

    #[error("Invalid coordinate: {0:?}")]
    InvalidCoordinate(String),

    #[error("Unknown tile type: {0}")]
    UnknownTile(String),

    #[error("Level has no START tile")]
    MissingStart,

    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Нет такого предмета в хотбаре
    #[error("Gate not in hotbar: {0}")]
    GateUnavailable(String),

    #[error("Gate {0} needs a second target")]
    MissingSecondTarget(String),

    #[error("Object at {0} is out of reach")]
    OutOfReach(Position),

    /// Ошибка ввода-вывода
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Ошибка разбора JSON уровня
    #[error("Level parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type QuantumResult<T> = Result<T, QuantumError>;
pub type GameResult<T> = Result<T, GameError>;
