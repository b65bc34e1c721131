use std::collections::VecDeque;

use rand::seq::IteratorRandom;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::clock::Interval;
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

pub const COLS: i32 = 20;
pub const ROWS: i32 = 18;
const CELL: f32 = 22.0;

const BASE_TICK_MS: u32 = 130;
const MIN_TICK_MS: u32 = 55;
const SPEEDUP_EVERY: u32 = 5;

pub type Pos = (i32, i32);

pub struct Snake {
    /// Head first.
    body: VecDeque<Pos>,
    dir: Dir,
    next_dir: Dir,
    food: Pos,
    score: u32,
    best: u32,
    phase: Phase,
    tick: Interval,
    rng: GameRng,
}

fn tick_ms(score: u32) -> u32 {
    BASE_TICK_MS.saturating_sub(score * 3).max(MIN_TICK_MS)
}

impl Snake {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, rng: GameRng) -> Self {
        Self {
            body: VecDeque::from([(10, 9)]),
            dir: Dir::Right,
            next_dir: Dir::Right,
            food: (15, 9),
            score: 0,
            best,
            phase: Phase::Idle,
            tick: Interval::new(BASE_TICK_MS as f32),
            rng,
        }
    }

    /// Start mid-game from an explicit body (head first) and heading.
    pub fn from_parts(body: Vec<Pos>, dir: Dir, food: Pos, rng: GameRng) -> Self {
        let mut snake = Self::with_rng(0, rng);
        snake.body = body.into();
        snake.dir = dir;
        snake.next_dir = dir;
        snake.food = food;
        snake.phase = Phase::Playing;
        snake
    }

    pub fn body(&self) -> &VecDeque<Pos> {
        &self.body
    }

    pub fn food(&self) -> Pos {
        self.food
    }

    pub fn tick_interval_ms(&self) -> f32 {
        self.tick.period_ms()
    }

    /// Buffer a turn for the next step. Turning back onto the current
    /// heading is ignored; the first accepted turn starts the game.
    pub fn steer(&mut self, dir: Dir) {
        if self.phase.is_terminal() || dir == self.dir.opposite() {
            return;
        }
        self.next_dir = dir;
        if self.phase == Phase::Idle {
            self.phase = Phase::Playing;
        }
    }

    /// One grid move.
    pub fn step(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.dir = self.next_dir;
        let (dx, dy) = self.dir.delta();
        let Some(&(hx, hy)) = self.body.front() else { return };
        let head = ((hx + dx).rem_euclid(COLS), (hy + dy).rem_euclid(ROWS));

        if self.body.contains(&head) {
            self.phase = Phase::Lost;
            if raise_best(ScoreKey::Snake, &mut self.best, self.score) {
                tracing::info!("snake: new best {}", self.score);
            }
            return;
        }

        self.body.push_front(head);
        if head != self.food {
            self.body.pop_back();
            return;
        }

        self.score += 1;
        if self.score % SPEEDUP_EVERY == 0 {
            self.tick.set_period(tick_ms(self.score) as f32);
        }
        match self.free_cell() {
            Some(cell) => self.food = cell,
            None => {
                self.phase = Phase::Won;
                raise_best(ScoreKey::Snake, &mut self.best, self.score);
            }
        }
    }

    fn free_cell(&mut self) -> Option<Pos> {
        let body = &self.body;
        (0..COLS)
            .flat_map(|x| (0..ROWS).map(move |y| (x, y)))
            .filter(|p| !body.contains(p))
            .choose(&mut self.rng)
    }
}

impl Game for Snake {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (COLS as f32 * CELL, ROWS as f32 * CELL)
    }

    fn handle_input(&mut self, input: Input) {
        if let Input::Move(dir) | Input::Swipe(dir) = input {
            self.steer(dir);
        }
    }

    fn update(&mut self) {
        if self.phase == Phase::Playing && self.tick.step() {
            self.step();
        }
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(10, 10, 15));

        // Checkerboard so the grid reads at terminal resolution
        for x in 0..COLS {
            for y in 0..ROWS {
                if (x + y) % 2 == 0 {
                    canvas.rect(x as f32 * CELL, y as f32 * CELL, CELL, CELL, Color::Rgb(16, 16, 24));
                }
            }
        }

        let (fx, fy) = self.food;
        canvas.circle(
            (fx as f32 + 0.5) * CELL,
            (fy as f32 + 0.5) * CELL,
            CELL * 0.4,
            Color::Rgb(239, 68, 68),
        );

        let len = self.body.len().max(1) as f32;
        for (i, &(x, y)) in self.body.iter().enumerate() {
            let color = if i == 0 {
                Color::Rgb(103, 232, 249)
            } else {
                // Fade from cyan towards teal along the body
                let t = i as f32 / len;
                Color::Rgb(8, (178.0 - 60.0 * t) as u8, (210.0 - 70.0 * t) as u8)
            };
            canvas.rect(x as f32 * CELL + 1.0, y as f32 * CELL + 1.0, CELL - 2.0, CELL - 2.0, color);
        }

        match self.phase {
            Phase::Idle => canvas.banner(
                "SNAKE",
                Color::Rgb(103, 232, 249),
                "Press an arrow key to start",
            ),
            Phase::Lost => canvas.banner(
                "GAME OVER",
                Color::Rgb(239, 68, 68),
                &format!("Score {} · Best {} · R to restart", self.score, self.best),
            ),
            Phase::Won => canvas.banner(
                "BOARD FILLED",
                Color::Rgb(52, 211, 153),
                &format!("Score {} · R to restart", self.score),
            ),
            Phase::Playing => {}
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Snake::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn result(&self) -> Option<RunResult> {
        self.phase.is_terminal().then_some(RunResult {
            key: ScoreKey::Snake,
            value: self.score,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Score", self.score),
            Stat::new("Length", self.body.len()),
            Stat::best(ScoreKey::Snake, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "↑↓←→/WASD/Drag Steer │ P Pause │ R Restart"
    }
}
