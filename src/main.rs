use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use qungeon::game::{Direction, MoveOutcome, Position, Session, SessionState, TileType, World, WorldObject};
use qungeon::{GameConfig, GateCatalog};

/// Headless Qungeon: plays the level files from stdin commands.
#[derive(Parser, Debug)]
#[command(name = "qungeon", version, about)]
struct Cli {
    /// Starting level number
    level: Option<u32>,

    /// Directory holding <n>.json level files
    #[arg(long)]
    levels_dir: Option<PathBuf>,

    /// Seed for reproducible measurement sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated measurements per histogram
    #[arg(long)]
    samples: Option<usize>,
}

impl Cli {
    fn into_config(self) -> GameConfig {
        let mut config = GameConfig::from_env();
        if let Some(level) = self.level {
            config.start_level = level;
        }
        if let Some(dir) = self.levels_dir {
            config.levels_dir = dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(samples) = self.samples {
            config.sampling_budget = samples;
        }
        config.normalized()
    }
}

const HELP: &str = "commands: w/a/s/d move | gate NAME X,Y [X,Y] | tick | reset | show | quit";

fn main() -> ExitCode {
    // Init logging
    let env = Env::default().filter_or("RUST_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();

    let config = Cli::parse().into_config();
    info!(
        "starting qungeon: level={}, levels_dir={}, samples={}",
        config.start_level,
        config.levels_dir.display(),
        config.sampling_budget
    );

    let mut session = match Session::new(config, GateCatalog::default()) {
        Ok(session) => session,
        Err(e) => {
            error!("failed to load starting level: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", HELP);
    println!("{}", render(session.world()));

    let stdin = io::stdin();
    let mut last_tick = Instant::now();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("stdin: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let now = Instant::now();
        session.elapse(now.duration_since(last_tick));
        last_tick = now;

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        let result = match command {
            "q" | "quit" => break,
            "show" => Ok(()),
            "tick" => {
                session.world_mut().correlation_update();
                Ok(())
            }
            "reset" => session.reset(),
            "gate" => run_gate(&mut session, words.collect()),
            key if key.chars().count() == 1 => match key.chars().next().and_then(Direction::from_key) {
                Some(direction) => session.handle_move(direction).map(|outcome| {
                    if outcome == MoveOutcome::Blocked {
                        info!("move blocked");
                    }
                }),
                None => {
                    println!("{}", HELP);
                    Ok(())
                }
            },
            _ => {
                println!("{}", HELP);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("action ignored: {}", e);
        }
        if session.state() == SessionState::Completed {
            println!("Game completed!");
            return ExitCode::SUCCESS;
        }
        println!("{}", render(session.world()));
        let _ = io::stdout().flush();
    }
    ExitCode::SUCCESS
}

fn run_gate(session: &mut Session, args: Vec<&str>) -> qungeon::error::GameResult<()> {
    let Some(name) = args.first() else {
        println!("usage: gate NAME X,Y [X,Y]");
        return Ok(());
    };
    let target: Position = args.get(1).copied().unwrap_or_default().parse()?;
    let second = match args.get(2) {
        Some(raw) => Some(raw.parse::<Position>()?),
        None => None,
    };
    session.world_mut().use_gate(name, target, second)
}

/// Text view: tiles, pillars as their dominant state, boxes, player; then the hotbar.
fn render(world: &World) -> String {
    let mut cells: Vec<Position> = world.tiles().keys().copied().collect();
    cells.extend(world.objects().keys().copied());
    let (Some(min_x), Some(max_x)) = (cells.iter().map(|p| p.x).min(), cells.iter().map(|p| p.x).max()) else {
        return String::new();
    };
    let min_y = cells.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = cells.iter().map(|p| p.y).max().unwrap_or(0);

    let mut out = String::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let position = Position::new(x, y);
            let glyph = if world.player() == Some(position) {
                '@'
            } else {
                match (world.object(position), world.tile(position)) {
                    (Some(WorldObject::Lootable(_)), _) => 'b',
                    (Some(WorldObject::Pillar(pillar)), _) if pillar.p_empty() == 1.0 => '_',
                    (Some(WorldObject::Pillar(pillar)), _) if pillar.p_full() == 1.0 => '#',
                    (Some(WorldObject::Pillar(_)), _) => '?',
                    (None, Some(TileType::Wall)) => 'W',
                    (None, Some(TileType::End)) => 'E',
                    (None, Some(_)) => '.',
                    (None, None) => ' ',
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    let slots: Vec<String> = world
        .hotbar()
        .slots()
        .iter()
        .map(|s| format!("{} x{}", s.name, s.count))
        .collect();
    out.push_str(&format!("hotbar: [{}]", slots.join(", ")));
    out
}
