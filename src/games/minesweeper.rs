use rand::seq::IteratorRandom;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::clock::{format_mmss, Stopwatch};
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::Input;
use crate::scores::ScoreKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
}

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Difficulty::Beginner, Difficulty::Intermediate];

    pub fn rows(self) -> usize {
        match self {
            Difficulty::Beginner => 9,
            Difficulty::Intermediate => 16,
        }
    }

    pub fn cols(self) -> usize {
        self.rows()
    }

    pub fn mines(self) -> usize {
        match self {
            Difficulty::Beginner => 10,
            Difficulty::Intermediate => 40,
        }
    }

    fn cell_px(self) -> f32 {
        match self {
            Difficulty::Beginner => 36.0,
            Difficulty::Intermediate => 24.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
        }
    }

    pub fn key(self) -> ScoreKey {
        match self {
            Difficulty::Beginner => ScoreKey::MinesBeginner,
            Difficulty::Intermediate => ScoreKey::MinesIntermediate,
        }
    }

    fn index(self) -> usize {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub mine: bool,
    pub revealed: bool,
    pub flagged: bool,
    pub adjacent: u8,
}

const NUMBER_COLORS: [Color; 9] = [
    Color::Rgb(100, 116, 139),
    Color::Rgb(59, 130, 246),
    Color::Rgb(22, 163, 74),
    Color::Rgb(220, 38, 38),
    Color::Rgb(29, 78, 216),
    Color::Rgb(185, 28, 28),
    Color::Rgb(8, 145, 178),
    Color::Rgb(107, 114, 128),
    Color::Rgb(107, 114, 128),
];

pub struct Minesweeper {
    difficulty: Difficulty,
    cells: Vec<Cell>,
    /// Mines are placed on the first reveal.
    built: bool,
    phase: Phase,
    clock: Stopwatch,
    best: [u32; 2],
    cursor: (usize, usize),
    rng: GameRng,
}

impl Minesweeper {
    pub fn new(best: [u32; 2]) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: [u32; 2], rng: GameRng) -> Self {
        Self::with_difficulty(Difficulty::Beginner, best, rng)
    }

    pub fn with_difficulty(difficulty: Difficulty, best: [u32; 2], rng: GameRng) -> Self {
        Self {
            difficulty,
            cells: vec![Cell::default(); difficulty.rows() * difficulty.cols()],
            built: false,
            phase: Phase::Idle,
            clock: Stopwatch::default(),
            best,
            cursor: (difficulty.rows() / 2, difficulty.cols() / 2),
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rows(&self) -> usize {
        self.difficulty.rows()
    }

    pub fn cols(&self) -> usize {
        self.difficulty.cols()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.clock.secs()
    }

    pub fn best_for(&self, difficulty: Difficulty) -> u32 {
        self.best[difficulty.index()]
    }

    pub fn mines_left(&self) -> i32 {
        let flags = self.cells.iter().filter(|c| c.flagged).count();
        self.difficulty.mines() as i32 - flags as i32
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows() && col < self.cols()).then(|| row * self.cols() + col)
    }

    fn neighbours(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let (rows, cols) = (self.rows() as i32, self.cols() as i32);
        let (row, col) = (row as i32, col as i32);
        (-1..=1)
            .flat_map(move |dr| (-1..=1).map(move |dc| (row + dr, col + dc)))
            .filter(move |&(r, c)| (r, c) != (row, col) && r >= 0 && r < rows && c >= 0 && c < cols)
            .map(|(r, c)| (r as usize, c as usize))
    }

    /// Lay mines anywhere except the 3x3 block around the first reveal,
    /// then count neighbours once. Flags placed beforehand are kept.
    fn build(&mut self, safe_row: usize, safe_col: usize) {
        let cols = self.cols();
        let safe = |i: usize| {
            let (r, c) = (i / cols, i % cols);
            r.abs_diff(safe_row) <= 1 && c.abs_diff(safe_col) <= 1
        };
        let picks = (0..self.cells.len())
            .filter(|&i| !safe(i))
            .choose_multiple(&mut self.rng, self.difficulty.mines());
        for i in picks {
            self.cells[i].mine = true;
        }
        self.count_adjacent();
        self.built = true;
    }

    fn count_adjacent(&mut self) {
        let cols = self.cols();
        for i in 0..self.cells.len() {
            if self.cells[i].mine {
                continue;
            }
            let count = self
                .neighbours(i / cols, i % cols)
                .filter(|&(r, c)| self.cells[r * cols + c].mine)
                .count();
            self.cells[i].adjacent = count as u8;
        }
    }

    /// Open a cell. The first reveal lays the mines and starts the clock.
    pub fn reveal(&mut self, row: usize, col: usize) {
        if self.phase.is_terminal() {
            return;
        }
        let Some(idx) = self.index(row, col) else { return };
        if self.cells[idx].revealed || self.cells[idx].flagged {
            return;
        }
        if !self.built {
            self.build(row, col);
            self.phase = Phase::Playing;
            self.clock.start();
        }

        if self.cells[idx].mine {
            for cell in &mut self.cells {
                cell.revealed = true;
            }
            self.phase = Phase::Lost;
            self.clock.stop();
            return;
        }

        self.flood(row, col);

        if self.cells.iter().all(|c| c.mine || c.revealed) {
            self.phase = Phase::Won;
            self.clock.stop();
            let secs = self.clock.secs_ceil();
            let slot = self.difficulty.index();
            if raise_best(self.difficulty.key(), &mut self.best[slot], secs) {
                tracing::info!("minesweeper: new best {}s on {}", secs, self.difficulty.label());
            }
        }
    }

    /// Reveal outward from a cell, spreading through zero counts. Flagged,
    /// revealed and mined cells stop the spread.
    fn flood(&mut self, row: usize, col: usize) {
        let cols = self.cols();
        let mut stack = vec![(row, col)];
        while let Some((r, c)) = stack.pop() {
            let cell = &mut self.cells[r * cols + c];
            if cell.revealed || cell.flagged || cell.mine {
                continue;
            }
            cell.revealed = true;
            if cell.adjacent == 0 {
                stack.extend(self.neighbours(r, c));
            }
        }
    }

    pub fn toggle_flag(&mut self, row: usize, col: usize) {
        if self.phase.is_terminal() {
            return;
        }
        if let Some(idx) = self.index(row, col) {
            let cell = &mut self.cells[idx];
            if !cell.revealed {
                cell.flagged = !cell.flagged;
            }
        }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        let rng = self.rng.clone();
        *self = Minesweeper::with_difficulty(difficulty, self.best, rng);
    }

    fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let size = self.difficulty.cell_px();
        let (row, col) = ((y / size) as usize, (x / size) as usize);
        self.index(row, col).map(|_| (row, col))
    }

    fn move_cursor(&mut self, dr: i32, dc: i32) {
        let r = (self.cursor.0 as i32 + dr).clamp(0, self.rows() as i32 - 1);
        let c = (self.cursor.1 as i32 + dc).clamp(0, self.cols() as i32 - 1);
        self.cursor = (r as usize, c as usize);
    }
}

impl Game for Minesweeper {
    fn id(&self) -> GameId {
        GameId::Minesweeper
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        let size = self.difficulty.cell_px();
        (self.cols() as f32 * size, self.rows() as f32 * size)
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Move(dir) => {
                let (dc, dr) = dir.delta();
                self.move_cursor(dr, dc);
            }
            Input::Primary if self.phase.is_terminal() => self.reset(),
            Input::Primary => self.reveal(self.cursor.0, self.cursor.1),
            Input::Flag => self.toggle_flag(self.cursor.0, self.cursor.1),
            Input::Select(1) => self.set_difficulty(Difficulty::Beginner),
            Input::Select(2) => self.set_difficulty(Difficulty::Intermediate),
            Input::Click { .. } if self.phase.is_terminal() => self.reset(),
            Input::Click { x, y } => {
                if let Some((r, c)) = self.cell_at(x, y) {
                    self.cursor = (r, c);
                    self.reveal(r, c);
                }
            }
            Input::AltClick { x, y } => {
                if let Some((r, c)) = self.cell_at(x, y) {
                    self.cursor = (r, c);
                    self.toggle_flag(r, c);
                }
            }
            _ => {}
        }
    }

    fn update(&mut self) {
        self.clock.step();
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(15, 15, 26));
        let size = self.difficulty.cell_px();
        let cols = self.cols();

        for (i, cell) in self.cells.iter().enumerate() {
            let (r, c) = (i / cols, i % cols);
            let (x, y) = (c as f32 * size, r as f32 * size);
            if (r, c) == self.cursor && !self.phase.is_terminal() {
                canvas.rect(x, y, size, size, Color::Rgb(250, 204, 21));
            }
            let face = if cell.revealed {
                if cell.mine {
                    Color::Rgb(127, 29, 29)
                } else {
                    Color::Rgb(22, 22, 38)
                }
            } else {
                Color::Rgb(45, 45, 90)
            };
            canvas.rect(x + 1.5, y + 1.5, size - 3.0, size - 3.0, face);

            let (cx, cy) = (x + size / 2.0, y + size / 2.0);
            if cell.revealed && cell.mine {
                canvas.circle(cx, cy, size * 0.28, Color::Rgb(248, 113, 113));
            } else if cell.revealed && cell.adjacent > 0 {
                canvas.label(cx, cy, cell.adjacent.to_string(), NUMBER_COLORS[cell.adjacent as usize]);
            } else if cell.flagged {
                canvas.label(cx, cy, "⚑", Color::Rgb(239, 68, 68));
            }
        }

        match self.phase {
            Phase::Lost => canvas.banner("Boom!", Color::Rgb(239, 68, 68), "Space / Click to try again"),
            Phase::Won => canvas.banner(
                "Cleared!",
                Color::Rgb(52, 211, 153),
                &format!("{}s on {} · Space to play again", self.clock.secs_ceil(), self.difficulty.label()),
            ),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.set_difficulty(self.difficulty);
    }

    fn score(&self) -> u32 {
        self.clock.secs()
    }

    fn result(&self) -> Option<RunResult> {
        (self.phase == Phase::Won).then(|| RunResult {
            key: self.difficulty.key(),
            value: self.clock.secs_ceil(),
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Mode", self.difficulty.label()),
            Stat::new("Mines", self.mines_left()),
            Stat::new("Time", format_mmss(self.clock.secs())),
            Stat::best(self.difficulty.key(), self.best_for(self.difficulty)),
        ]
    }

    fn help(&self) -> &'static str {
        "↑↓←→ Move │ Space/Click Reveal │ F/Right-click Flag │ 1/2 Difficulty │ R Restart"
    }
}
