pub mod breakout;
pub mod dino_run;
pub mod flappy;
pub mod game2048;
pub mod memory;
pub mod minesweeper;
pub mod snake;
pub mod tetris;

use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::input::{Input, InputKind};
use crate::scores::{ScoreKey, ScoreStore};

pub type GameRng = StdRng;

/// Seeded when a seed is given, otherwise from OS entropy.
pub fn game_rng(seed: Option<u64>) -> GameRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Coarse lifecycle stage shared by every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// A value the host should offer to the score store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub key: ScoreKey,
    pub value: u32,
}

/// One label/value pair for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
}

impl Stat {
    pub fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }

    /// Best value, shown as a dash while no record exists.
    pub fn best(key: ScoreKey, value: u32) -> Self {
        if key.is_set(value) {
            Self::new("Best", value)
        } else {
            Self::new("Best", "—")
        }
    }
}

pub trait Game {
    fn id(&self) -> GameId;
    fn phase(&self) -> Phase;
    /// Logical size of the drawing surface.
    fn surface(&self) -> (f32, f32);
    fn handle_input(&mut self, input: Input);
    /// Advance one fixed simulation step.
    fn update(&mut self);
    fn render(&self, canvas: &mut Canvas);
    /// Replace the state with a fresh one, keeping only the best value.
    fn reset(&mut self);
    fn score(&self) -> u32;
    fn result(&self) -> Option<RunResult>;
    fn stats(&self) -> Vec<Stat>;
    /// Controls line. The host appends its own close hint.
    fn help(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameId {
    Memory,
    Dino,
    Snake,
    Tetris,
    Flappy,
    Game2048,
    Breakout,
    Minesweeper,
}

impl GameId {
    pub const ALL: [GameId; 8] = [
        GameId::Memory,
        GameId::Dino,
        GameId::Snake,
        GameId::Tetris,
        GameId::Flappy,
        GameId::Game2048,
        GameId::Breakout,
        GameId::Minesweeper,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GameId::Memory => "memory",
            GameId::Dino => "dino",
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::Flappy => "flappy",
            GameId::Game2048 => "2048",
            GameId::Breakout => "breakout",
            GameId::Minesweeper => "minesweeper",
        }
    }

    pub fn from_slug(slug: &str) -> Option<GameId> {
        GameId::ALL.into_iter().find(|g| g.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            GameId::Memory => "Memory Cards",
            GameId::Dino => "Dino Runner",
            GameId::Snake => "Snake",
            GameId::Tetris => "Tetris",
            GameId::Flappy => "Flappy Bird",
            GameId::Game2048 => "2048",
            GameId::Breakout => "Breakout",
            GameId::Minesweeper => "Minesweeper",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameId::Memory => "Match all pairs in\nthe fewest moves.",
            GameId::Dino => "Jump obstacles.\nHow far can you go?",
            GameId::Snake => "Grow without\nhitting yourself.",
            GameId::Tetris => "Clear lines.\nOld school perfection.",
            GameId::Flappy => "Stay airborne.\nOne tap at a time.",
            GameId::Game2048 => "Slide and merge\nuntil you reach 2048.",
            GameId::Breakout => "Smash every brick\nwith the ball.",
            GameId::Minesweeper => "Clear the field\nwithout a boom.",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            GameId::Memory => "🃏",
            GameId::Dino => "🦕",
            GameId::Snake => "🐍",
            GameId::Tetris => "🧱",
            GameId::Flappy => "🐦",
            GameId::Game2048 => "🔢",
            GameId::Breakout => "🏓",
            GameId::Minesweeper => "💣",
        }
    }

    pub fn color(self) -> Color {
        match self {
            GameId::Memory => Color::Rgb(124, 58, 237),
            GameId::Dino => Color::Rgb(5, 150, 105),
            GameId::Snake => Color::Rgb(8, 145, 178),
            GameId::Tetris => Color::Rgb(220, 38, 38),
            GameId::Flappy => Color::Rgb(245, 158, 11),
            GameId::Game2048 => Color::Rgb(167, 139, 250),
            GameId::Breakout => Color::Rgb(255, 71, 87),
            GameId::Minesweeper => Color::Rgb(100, 116, 139),
        }
    }

    /// Key whose best is shown on the game card.
    pub fn headline_key(self) -> ScoreKey {
        match self {
            GameId::Memory => ScoreKey::Memory,
            GameId::Dino => ScoreKey::Dino,
            GameId::Snake => ScoreKey::Snake,
            GameId::Tetris => ScoreKey::Tetris,
            GameId::Flappy => ScoreKey::Flappy,
            GameId::Game2048 => ScoreKey::Game2048,
            GameId::Breakout => ScoreKey::Breakout,
            GameId::Minesweeper => ScoreKey::MinesBeginner,
        }
    }

    /// Input kinds the engine consumes; the host drops everything else.
    pub fn accepts(self) -> &'static [InputKind] {
        use InputKind::*;
        match self {
            GameId::Memory => &[Direction, Primary, Click],
            GameId::Dino => &[Direction, Primary, Click],
            GameId::Snake => &[Direction, Swipe],
            GameId::Tetris => &[Direction, Primary, Rotate, Hold],
            GameId::Flappy => &[Direction, Primary, Click],
            GameId::Game2048 => &[Direction, Swipe],
            GameId::Breakout => &[Direction, Primary, Pointer, Click],
            GameId::Minesweeper => &[Direction, Primary, Flag, Select, Click, AltClick],
        }
    }
}

/// Build a fresh engine for `id`, seeded with its stored best.
pub fn create(id: GameId, scores: &ScoreStore, seed: Option<u64>) -> Box<dyn Game> {
    let rng = game_rng(seed);
    match id {
        GameId::Memory => Box::new(memory::MemoryMatch::with_rng(scores.best(ScoreKey::Memory), rng)),
        GameId::Dino => Box::new(dino_run::DinoRun::with_rng(scores.best(ScoreKey::Dino), rng)),
        GameId::Snake => Box::new(snake::Snake::with_rng(scores.best(ScoreKey::Snake), rng)),
        GameId::Tetris => Box::new(tetris::Tetris::with_rng(scores.best(ScoreKey::Tetris), rng)),
        GameId::Flappy => Box::new(flappy::FlappyBird::with_rng(scores.best(ScoreKey::Flappy), rng)),
        GameId::Game2048 => {
            Box::new(game2048::Game2048::with_rng(scores.best(ScoreKey::Game2048), rng))
        }
        GameId::Breakout => {
            Box::new(breakout::Breakout::with_rng(scores.best(ScoreKey::Breakout), rng))
        }
        GameId::Minesweeper => Box::new(minesweeper::Minesweeper::with_rng(
            [
                scores.best(ScoreKey::MinesBeginner),
                scores.best(ScoreKey::MinesIntermediate),
            ],
            rng,
        )),
    }
}

/// Record a new best locally when `candidate` improves on it.
pub(crate) fn raise_best(key: ScoreKey, best: &mut u32, candidate: u32) -> bool {
    if key.ranking().improves(candidate, *best) {
        *best = candidate;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_slug(id.slug()), Some(id));
        }
        assert_eq!(GameId::from_slug("pong"), None);
    }

    #[test]
    fn every_engine_mounts_fresh() {
        let scores = ScoreStore::in_memory();
        for id in GameId::ALL {
            let game = create(id, &scores, Some(7));
            assert_eq!(game.id(), id);
            assert_eq!(game.score(), 0);
            assert!(!game.phase().is_terminal());
            let (w, h) = game.surface();
            assert!(w > 0.0 && h > 0.0);
        }
    }

    #[test]
    fn raise_best_respects_ranking() {
        let mut best = 10;
        assert!(raise_best(ScoreKey::Snake, &mut best, 11));
        assert!(!raise_best(ScoreKey::Snake, &mut best, 3));
        let mut moves = 20;
        assert!(raise_best(ScoreKey::Memory, &mut moves, 12));
        assert_eq!(moves, 12);
    }
}
