use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Grid coordinate of a tile or object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::from(*self)
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// True when `other` is this cell or one of its eight neighbours.
    pub fn within_reach(&self, other: &Position) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Accepts "(x, y)" as written in level files, and the bare "x,y" key form.
impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidCoordinate(s.to_string());
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let mut parts = inner.split(',');
        let x = parts.next().ok_or_else(invalid)?.trim().parse().map_err(|_| invalid())?;
        let y = parts.next().ok_or_else(invalid)?.trim().parse().map_err(|_| invalid())?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(x, y))
    }
}

/// Identity of a quantum object: its grid position formatted as "x,y".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey(String);

impl From<Position> for ObjectKey {
    fn from(position: Position) -> Self {
        ObjectKey(position.to_string())
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// WASD key mapping.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("(3, 4)".parse::<Position>().unwrap(), Position::new(3, 4));
        assert_eq!("3,4".parse::<Position>().unwrap(), Position::new(3, 4));
        assert_eq!(" ( -1 ,2 ) ".parse::<Position>().unwrap(), Position::new(-1, 2));
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "3", "(3, 4, 5)", "x,y", "(3 4)"] {
            assert!(matches!(bad.parse::<Position>(), Err(GameError::InvalidCoordinate(_))), "{}", bad);
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(Position::new(2, 7).key().as_ref(), "2,7");
        assert_eq!(Position::new(2, 7).key().to_string().parse::<Position>().unwrap(), Position::new(2, 7));
    }

    #[test]
    fn test_reach_and_step() {
        let p = Position::new(1, 1);
        assert!(p.within_reach(&Position::new(2, 2)));
        assert!(p.within_reach(&p));
        assert!(!p.within_reach(&Position::new(3, 1)));
        assert_eq!(p.step(Direction::Up), Position::new(1, 0));
        assert_eq!(p.step(Direction::Right), Position::new(2, 1));
        assert_eq!(Direction::from_key('A'), Some(Direction::Left));
        assert_eq!(Direction::from_key('x'), None);
    }

    #[test]
    fn test_step_at_grid_edge() {
        let corner = Position::new(i32::MAX, i32::MIN);
        assert_eq!(corner.step(Direction::Right), corner);
        assert_eq!(corner.step(Direction::Up), corner);
        assert_eq!(corner.step(Direction::Left), Position::new(i32::MAX - 1, i32::MIN));
        assert!(!corner.within_reach(&Position::new(i32::MIN, i32::MAX)));
    }
}
