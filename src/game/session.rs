use log::{debug, info};
use std::time::Duration;

use crate::config::GameConfig;
use crate::error::GameResult;
use crate::game::gates::GateCatalog;
use crate::game::level::{level_path, LevelDescription};
use crate::game::position::Direction;
use crate::game::world::{MoveOutcome, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    /// The last level was cleared; no further level file exists.
    Completed,
}

/// Level progression over the numbered level files of `levels_dir`.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    level: u32,
    world: World,
    state: SessionState,
    /// Time accumulated towards the next correlation tick.
    since_tick: Duration,
}

impl Session {
    /// Starts at `config.start_level`.
    pub fn new(config: GameConfig, catalog: GateCatalog) -> GameResult<Self> {
        let world = World::new(&config, catalog);
        let mut session = Self {
            level: config.start_level,
            config,
            world,
            state: SessionState::Playing,
            since_tick: Duration::ZERO,
        };
        session.load(session.level)?;
        Ok(session)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn load(&mut self, level: u32) -> GameResult<()> {
        let path = level_path(&self.config.levels_dir, level);
        let description = LevelDescription::from_file(&path)?;
        self.world.load_level(&description)?;
        self.level = level;
        self.state = SessionState::Playing;
        info!("level {} loaded from {}", level, path.display());
        Ok(())
    }

    /// Reloads the current level from disk.
    pub fn reset(&mut self) -> GameResult<()> {
        self.load(self.level)
    }

    /// Переходит на следующий уровень; если файла нет, игра пройдена
    pub fn advance(&mut self) -> GameResult<SessionState> {
        let next = self.level + 1;
        if level_path(&self.config.levels_dir, next).is_file() {
            self.load(next)?;
        } else {
            info!("no level {} after level {}: game completed", next, self.level);
            self.state = SessionState::Completed;
        }
        Ok(self.state)
    }

    /// Runs one correlation update per full `correlation_interval_ms` in
    /// `elapsed`, carrying the remainder over. Returns the number of updates.
    pub fn elapse(&mut self, elapsed: Duration) -> u32 {
        let interval = Duration::from_millis(self.config.correlation_interval_ms.max(1));
        self.since_tick += elapsed;
        let mut ticks = 0;
        while self.since_tick >= interval {
            self.since_tick -= interval;
            self.world.correlation_update();
            ticks += 1;
        }
        if ticks > 0 {
            debug!("{} correlation ticks", ticks);
        }
        ticks
    }

    pub fn handle_move(&mut self, direction: Direction) -> GameResult<MoveOutcome> {
        let outcome = self.world.move_player(direction);
        if outcome == MoveOutcome::ReachedExit {
            self.advance()?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::game::position::Position;
    use std::fs;
    use std::path::Path;

    const CORRIDOR: &str = r#"{
        "tiles": {"(0, 0)": "START", "(1, 0)": "EMPTY", "(2, 0)": "END"},
        "quantum_objects": ["(1, 0)"],
        "gates": {"X": 1}
    }"#;

    fn write_level(dir: &Path, n: u32, json: &str) {
        fs::write(dir.join(format!("{}.json", n)), json).unwrap();
    }

    fn config(dir: &Path) -> GameConfig {
        GameConfig {
            levels_dir: dir.to_path_buf(),
            seed: Some(5),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_progression_and_completion() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), 1, CORRIDOR);
        write_level(dir.path(), 2, CORRIDOR);

        let mut session = Session::new(config(dir.path()), GateCatalog::default()).unwrap();
        assert_eq!(session.level(), 1);

        session.handle_move(Direction::Right).unwrap();
        assert_eq!(session.handle_move(Direction::Right).unwrap(), MoveOutcome::ReachedExit);
        assert_eq!(session.level(), 2);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.world().player(), Some(Position::new(0, 0)));

        session.handle_move(Direction::Right).unwrap();
        session.handle_move(Direction::Right).unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn test_reset_restores_level() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), 1, CORRIDOR);
        let mut session = Session::new(config(dir.path()), GateCatalog::default()).unwrap();

        let pillar = Position::new(1, 0);
        session.world_mut().use_gate("X", pillar, None).unwrap();
        assert_eq!(session.handle_move(Direction::Right).unwrap(), MoveOutcome::Blocked);
        assert_eq!(session.world().hotbar().count("X"), 0);

        session.reset().unwrap();
        assert_eq!(session.world().hotbar().count("X"), 1);
        assert_eq!(session.world().pillar(pillar).unwrap().states, vec![1.0, 0.0]);
        assert_eq!(session.world().quantum().register().len(), 1);
        // History survives the reset
        assert_eq!(session.world().effect_history().len(), 1);
    }

    #[test]
    fn test_broken_next_level_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), 1, CORRIDOR);
        write_level(
            dir.path(),
            2,
            r#"{"tiles": {"(0, 0)": "START"}, "effects": [{"effect": "Flip", "position": "(3, 3)"}]}"#,
        );
        let mut session = Session::new(config(dir.path()), GateCatalog::default()).unwrap();

        assert!(matches!(session.advance(), Err(GameError::UnknownPosition(_))));
        assert_eq!(session.level(), 1);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.world().hotbar().count("X"), 1);
        assert!(session.world().pillar(Position::new(1, 0)).is_ok());
        assert!(session.world().effect_history().is_empty());
    }

    #[test]
    fn test_elapse_drives_correlation_ticks() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), 1, CORRIDOR);
        let mut session = Session::new(
            GameConfig {
                correlation_interval_ms: 100,
                ..config(dir.path())
            },
            GateCatalog::default(),
        )
        .unwrap();

        assert_eq!(session.elapse(Duration::from_millis(50)), 0);
        assert_eq!(session.elapse(Duration::from_millis(60)), 1);
        assert_eq!(session.elapse(Duration::from_millis(290)), 3);
        assert_eq!(session.elapse(Duration::ZERO), 0);
    }

    #[test]
    fn test_missing_start_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::new(config(dir.path()), GateCatalog::default()).unwrap_err();
        assert!(matches!(err, GameError::Io(_)));
    }
}
