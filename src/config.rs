use std::path::PathBuf;

use clap::Parser;

use crate::games::GameId;
use crate::scores::default_scores_path;

const MIN_FPS: u32 = 15;
const MAX_FPS: u32 = 240;

/// minicade - eight mini-games in one terminal cabinet
#[derive(Parser, Debug)]
#[command(name = "minicade", version)]
#[command(about = "Memory, Dino, Snake, Tetris, Flappy, 2048, Breakout and Minesweeper in the terminal", long_about = None)]
pub struct Cli {
    /// Redraw / input poll rate. The simulation always runs at 60 steps per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Best-score file (defaults to the user data directory)
    #[arg(long, value_name = "PATH")]
    pub scores: Option<PathBuf>,

    /// Keep best scores in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Log file (defaults next to the score file)
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Open a game straight away
    ///
    /// One of: memory, dino, snake, tetris, flappy, 2048, breakout, minesweeper
    #[arg(long, value_name = "ID", value_parser = parse_game)]
    pub game: Option<GameId>,

    /// Seed every game's random source
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    pub fn fps(&self) -> u32 {
        self.fps.clamp(MIN_FPS, MAX_FPS)
    }

    pub fn scores_path(&self) -> PathBuf {
        self.scores.clone().unwrap_or_else(default_scores_path)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log.clone().unwrap_or_else(|| {
            default_scores_path()
                .parent()
                .map(|dir| dir.join("minicade.log"))
                .unwrap_or_else(|| PathBuf::from("minicade.log"))
        })
    }
}

fn parse_game(slug: &str) -> Result<GameId, String> {
    GameId::from_slug(slug).ok_or_else(|| {
        let known: Vec<_> = GameId::ALL.iter().map(|g| g.slug()).collect();
        format!("unknown game '{}', expected one of {}", slug, known.join(", "))
    })
}
