use rand::seq::SliceRandom;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::clock::{format_mmss, Interval, Stopwatch};
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

const SYMBOLS: [&str; 8] = ["♠", "♥", "♦", "♣", "★", "☀", "☂", "♪"];
const SYMBOL_COLORS: [Color; 8] = [
    Color::Rgb(196, 181, 253),
    Color::Rgb(248, 113, 113),
    Color::Rgb(251, 191, 36),
    Color::Rgb(52, 211, 153),
    Color::Rgb(250, 204, 21),
    Color::Rgb(251, 146, 60),
    Color::Rgb(96, 165, 250),
    Color::Rgb(244, 114, 182),
];
const GRID: usize = 4;
const CARD_COUNT: usize = GRID * GRID;
const MISMATCH_DELAY_MS: f32 = 900.0;

const GAP: f32 = 8.0;
const CARD: f32 = 80.0;
const SIZE: f32 = GAP + GRID as f32 * (CARD + GAP);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub symbol: usize,
    pub flipped: bool,
    pub matched: bool,
}

impl Card {
    fn face_up(&self) -> bool {
        self.flipped || self.matched
    }
}

/// Two unequal cards left face up until the delay runs out.
#[derive(Debug, Clone)]
struct Mismatch {
    cards: (usize, usize),
    delay: Interval,
}

pub struct MemoryMatch {
    cards: Vec<Card>,
    first: Option<usize>,
    mismatch: Option<Mismatch>,
    moves: u32,
    best: u32,
    phase: Phase,
    clock: Stopwatch,
    cursor: usize,
    rng: GameRng,
}

impl MemoryMatch {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, mut rng: GameRng) -> Self {
        let mut cards: Vec<Card> = (0..CARD_COUNT)
            .map(|i| Card {
                symbol: i % SYMBOLS.len(),
                flipped: false,
                matched: false,
            })
            .collect();
        cards.shuffle(&mut rng);
        Self {
            cards,
            first: None,
            mismatch: None,
            moves: 0,
            best,
            phase: Phase::Idle,
            clock: Stopwatch::default(),
            cursor: 0,
            rng,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_locked(&self) -> bool {
        self.mismatch.is_some()
    }

    /// Turn card `idx` face up. Ignored while a mismatch is showing, after
    /// the win, and for cards already face up.
    pub fn flip(&mut self, idx: usize) {
        if self.is_locked() || self.phase == Phase::Won {
            return;
        }
        let Some(card) = self.cards.get(idx) else { return };
        if card.face_up() {
            return;
        }
        if self.phase == Phase::Idle {
            self.phase = Phase::Playing;
            self.clock.start();
        }
        self.cards[idx].flipped = true;

        let Some(first) = self.first.take() else {
            self.first = Some(idx);
            return;
        };

        self.moves += 1;
        if self.cards[first].symbol == self.cards[idx].symbol {
            self.cards[first].matched = true;
            self.cards[idx].matched = true;
            if self.cards.iter().all(|c| c.matched) {
                self.phase = Phase::Won;
                self.clock.stop();
                if raise_best(ScoreKey::Memory, &mut self.best, self.moves) {
                    tracing::info!("memory: new best {} moves", self.moves);
                }
            }
        } else {
            self.mismatch = Some(Mismatch {
                cards: (first, idx),
                delay: Interval::new(MISMATCH_DELAY_MS),
            });
        }
    }

    fn card_origin(idx: usize) -> (f32, f32) {
        let col = idx % GRID;
        let row = idx / GRID;
        (
            GAP + col as f32 * (CARD + GAP),
            GAP + row as f32 * (CARD + GAP),
        )
    }

    fn card_at(x: f32, y: f32) -> Option<usize> {
        (0..CARD_COUNT).find(|&i| {
            let (cx, cy) = Self::card_origin(i);
            x >= cx && x < cx + CARD && y >= cy && y < cy + CARD
        })
    }

    fn move_cursor(&mut self, dir: Dir) {
        let (dx, dy) = dir.delta();
        let col = (self.cursor % GRID) as i32 + dx;
        let row = (self.cursor / GRID) as i32 + dy;
        if (0..GRID as i32).contains(&col) && (0..GRID as i32).contains(&row) {
            self.cursor = row as usize * GRID + col as usize;
        }
    }
}

impl Game for MemoryMatch {
    fn id(&self) -> GameId {
        GameId::Memory
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (SIZE, SIZE)
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Move(dir) => self.move_cursor(dir),
            Input::Primary => {
                if self.phase == Phase::Won {
                    self.reset();
                } else {
                    self.flip(self.cursor);
                }
            }
            Input::Click { x, y } => {
                if let Some(idx) = Self::card_at(x, y) {
                    self.cursor = idx;
                    self.flip(idx);
                }
            }
            _ => {}
        }
    }

    fn update(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.clock.step();
        let elapsed = match self.mismatch.as_mut() {
            Some(m) => m.delay.step(),
            None => false,
        };
        if elapsed {
            if let Some(Mismatch { cards: (a, b), .. }) = self.mismatch.take() {
                self.cards[a].flipped = false;
                self.cards[b].flipped = false;
            }
        }
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(10, 10, 15));

        for (i, card) in self.cards.iter().enumerate() {
            let (x, y) = Self::card_origin(i);
            if i == self.cursor && self.phase != Phase::Won {
                canvas.rect(x - 3.0, y - 3.0, CARD + 6.0, CARD + 6.0, Color::Rgb(250, 204, 21));
            }
            let face = if card.matched {
                Color::Rgb(46, 16, 101)
            } else if card.flipped {
                Color::Rgb(30, 27, 58)
            } else {
                Color::Rgb(45, 45, 90)
            };
            canvas.rect(x, y, CARD, CARD, face);
            if card.face_up() {
                canvas.label(
                    x + CARD / 2.0,
                    y + CARD / 2.0,
                    SYMBOLS[card.symbol],
                    SYMBOL_COLORS[card.symbol],
                );
            } else {
                canvas.rect(x + 6.0, y + 6.0, CARD - 12.0, 4.0, Color::Rgb(70, 70, 120));
            }
        }

        if self.phase == Phase::Won {
            canvas.banner(
                "All pairs found!",
                Color::Rgb(241, 245, 249),
                &format!(
                    "{} moves · {} · Space to play again",
                    self.moves,
                    format_mmss(self.clock.secs())
                ),
            );
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = MemoryMatch::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.moves
    }

    fn result(&self) -> Option<RunResult> {
        (self.phase == Phase::Won).then_some(RunResult {
            key: ScoreKey::Memory,
            value: self.moves,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Moves", self.moves),
            Stat::new("Time", format_mmss(self.clock.secs())),
            Stat::best(ScoreKey::Memory, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "↑↓←→ Select │ Space/Click Flip │ R Restart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::STEP_MS;
    use crate::games::game_rng;
    use crate::scores::UNSET_LOWER_BEST;

    fn game() -> MemoryMatch {
        MemoryMatch::with_rng(UNSET_LOWER_BEST, game_rng(Some(11)))
    }

    fn pair_of(g: &MemoryMatch, symbol: usize) -> (usize, usize) {
        let idx: Vec<usize> = (0..CARD_COUNT).filter(|&i| g.cards[i].symbol == symbol).collect();
        (idx[0], idx[1])
    }

    fn non_pair(g: &MemoryMatch) -> (usize, usize) {
        let a = 0;
        let b = (1..CARD_COUNT)
            .find(|&i| g.cards[i].symbol != g.cards[a].symbol)
            .unwrap();
        (a, b)
    }

    fn wait_ms(g: &mut MemoryMatch, ms: f32) {
        for _ in 0..(ms / STEP_MS).ceil() as usize + 1 {
            g.update();
        }
    }

    #[test]
    fn deck_holds_two_of_each_symbol() {
        let g = game();
        for s in 0..SYMBOLS.len() {
            assert_eq!(g.cards.iter().filter(|c| c.symbol == s).count(), 2);
        }
        assert!(g.cards.iter().all(|c| !c.flipped && !c.matched));
    }

    #[test]
    fn matching_pair_locks_in_without_delay() {
        let mut g = game();
        let (a, b) = pair_of(&g, 3);
        g.flip(a);
        assert_eq!(g.phase(), Phase::Playing);
        g.flip(b);
        assert!(g.cards[a].matched && g.cards[b].matched);
        assert!(!g.is_locked());
        assert_eq!(g.moves(), 1);
    }

    #[test]
    fn mismatch_flips_back_after_delay() {
        let mut g = game();
        let (a, b) = non_pair(&g);
        g.flip(a);
        g.flip(b);
        assert!(g.is_locked());
        assert_eq!(g.moves(), 1);

        // Input is ignored while the pair is showing.
        let other = (0..CARD_COUNT).find(|&i| i != a && i != b).unwrap();
        g.flip(other);
        assert!(!g.cards[other].flipped);

        wait_ms(&mut g, MISMATCH_DELAY_MS);
        assert!(!g.is_locked());
        assert!(!g.cards[a].flipped && !g.cards[b].flipped);
    }

    #[test]
    fn matched_cards_never_unflip() {
        let mut g = game();
        let (a, b) = pair_of(&g, 0);
        g.flip(a);
        g.flip(b);
        let c = (0..CARD_COUNT).find(|&i| !g.cards[i].matched).unwrap();
        let d = (0..CARD_COUNT)
            .find(|&i| !g.cards[i].matched && g.cards[i].symbol != g.cards[c].symbol)
            .unwrap();
        g.flip(c);
        g.flip(d);
        wait_ms(&mut g, MISMATCH_DELAY_MS);
        assert!(g.cards[a].matched && g.cards[b].matched);
        assert!(g.cards[a].face_up());
    }

    #[test]
    fn same_card_twice_is_not_a_move() {
        let mut g = game();
        g.flip(5);
        g.flip(5);
        assert_eq!(g.moves(), 0);
        assert_eq!(g.first, Some(5));
    }

    #[test]
    fn clearing_the_board_wins_and_records_moves() {
        let mut g = game();
        for s in 0..SYMBOLS.len() {
            let (a, b) = pair_of(&g, s);
            g.flip(a);
            g.flip(b);
        }
        assert_eq!(g.phase(), Phase::Won);
        assert_eq!(g.moves(), 8);
        assert_eq!(
            g.result(),
            Some(RunResult {
                key: ScoreKey::Memory,
                value: 8
            })
        );
        assert_eq!(g.best, 8);

        g.reset();
        assert_eq!(g.phase(), Phase::Idle);
        assert_eq!(g.moves(), 0);
        assert_eq!(g.best, 8);
        assert_eq!(g.result(), None);
    }

    #[test]
    fn click_hits_cards_but_not_gaps() {
        assert_eq!(MemoryMatch::card_at(GAP + 1.0, GAP + 1.0), Some(0));
        assert_eq!(MemoryMatch::card_at(GAP / 2.0, GAP / 2.0), None);
        let (x, y) = MemoryMatch::card_origin(15);
        assert_eq!(MemoryMatch::card_at(x + CARD - 1.0, y + CARD - 1.0), Some(15));
    }
}
