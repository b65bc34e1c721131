use rand::Rng;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::clock::Interval;
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

pub const COLS: usize = 10;
pub const ROWS: usize = 20;
const CELL: f32 = 26.0;
const BOARD_W: f32 = COLS as f32 * CELL;
const BOARD_H: f32 = ROWS as f32 * CELL;
const PANEL_X: f32 = BOARD_W + 10.0;
const PANEL_W: f32 = 4.0 * CELL;

/// Points per simultaneous clear, before the level multiplier.
pub const POINTS: [u32; 5] = [0, 100, 300, 500, 800];
const SPAWN_X: i32 = 3;
/// Sideways nudges tried, in order, when a rotation does not fit.
const KICKS: [i32; 5] = [0, 1, -1, 2, -2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    I,
    O,
    T,
    Z,
    S,
    J,
    L,
}

impl Kind {
    pub const ALL: [Kind; 7] = [Kind::I, Kind::O, Kind::T, Kind::Z, Kind::S, Kind::J, Kind::L];

    fn rows(self) -> &'static [&'static [u8]] {
        match self {
            Kind::I => &[&[1, 1, 1, 1]],
            Kind::O => &[&[1, 1], &[1, 1]],
            Kind::T => &[&[0, 1, 0], &[1, 1, 1]],
            Kind::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Kind::S => &[&[0, 1, 1], &[1, 1, 0]],
            Kind::J => &[&[1, 0, 0], &[1, 1, 1]],
            Kind::L => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }

    pub fn color(self) -> Color {
        match self {
            Kind::I => Color::Rgb(6, 182, 212),
            Kind::O => Color::Rgb(245, 158, 11),
            Kind::T => Color::Rgb(124, 58, 237),
            Kind::Z => Color::Rgb(220, 38, 38),
            Kind::S => Color::Rgb(22, 163, 74),
            Kind::J => Color::Rgb(37, 99, 235),
            Kind::L => Color::Rgb(234, 88, 12),
        }
    }
}

/// Row-major occupancy grid of a piece.
pub type Shape = Vec<Vec<bool>>;

fn shape_of(kind: Kind) -> Shape {
    kind.rows()
        .iter()
        .map(|row| row.iter().map(|&c| c == 1).collect())
        .collect()
}

/// Clockwise quarter turn.
pub fn rotate(shape: &Shape) -> Shape {
    let height = shape.len();
    let width = shape.first().map_or(0, Vec::len);
    (0..width)
        .map(|c| (0..height).rev().map(|r| shape[r][c]).collect())
        .collect()
}

fn filled(shape: &Shape) -> impl Iterator<Item = (i32, i32)> + '_ {
    shape.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .filter(|&(_, &on)| on)
            .map(move |(c, _)| (c as i32, r as i32))
    })
}

pub type Board = [[Option<Kind>; COLS]; ROWS];

#[derive(Debug, Clone)]
pub struct Piece {
    pub kind: Kind,
    pub shape: Shape,
}

impl Piece {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            shape: shape_of(kind),
        }
    }
}

fn drop_interval_ms(level: u32) -> f32 {
    500u32.saturating_sub(level * 35).max(80) as f32
}

pub struct Tetris {
    board: Board,
    piece: Piece,
    px: i32,
    py: i32,
    next: Kind,
    hold: Option<Kind>,
    can_hold: bool,
    score: u32,
    lines: u32,
    level: u32,
    best: u32,
    phase: Phase,
    gravity: Interval,
    rng: GameRng,
}

impl Tetris {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, mut rng: GameRng) -> Self {
        let first = random_kind(&mut rng);
        let next = random_kind(&mut rng);
        Self {
            board: [[None; COLS]; ROWS],
            piece: Piece::new(first),
            px: SPAWN_X,
            py: 0,
            next,
            hold: None,
            can_hold: true,
            score: 0,
            lines: 0,
            level: 1,
            best,
            phase: Phase::Playing,
            gravity: Interval::new(drop_interval_ms(1)),
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn position(&self) -> (i32, i32) {
        (self.px, self.py)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn held(&self) -> Option<Kind> {
        self.hold
    }

    pub fn next_kind(&self) -> Kind {
        self.next
    }

    /// Cells above the board are allowed; walls and the floor are not.
    pub fn fits(&self, shape: &Shape, px: i32, py: i32) -> bool {
        filled(shape).all(|(c, r)| {
            let (x, y) = (px + c, py + r);
            if x < 0 || x >= COLS as i32 || y >= ROWS as i32 {
                return false;
            }
            y < 0 || self.board[y as usize][x as usize].is_none()
        })
    }

    pub fn shift(&mut self, dx: i32) -> bool {
        if self.phase.is_terminal() || !self.fits(&self.piece.shape, self.px + dx, self.py) {
            return false;
        }
        self.px += dx;
        true
    }

    /// Rotate clockwise, nudging sideways if needed. Rejected when no nudge fits.
    pub fn rotate(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        let turned = rotate(&self.piece.shape);
        let Some(dx) = KICKS
            .into_iter()
            .find(|&dx| self.fits(&turned, self.px + dx, self.py))
        else {
            return false;
        };
        self.piece.shape = turned;
        self.px += dx;
        true
    }

    /// Move down one row, locking the piece when it cannot.
    pub fn soft_drop(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        if self.fits(&self.piece.shape, self.px, self.py + 1) {
            self.py += 1;
        } else {
            self.lock();
        }
    }

    pub fn hard_drop(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.py = self.ghost_y();
        self.lock();
    }

    /// Lowest row the current piece could fall to.
    pub fn ghost_y(&self) -> i32 {
        let mut y = self.py;
        while self.fits(&self.piece.shape, self.px, y + 1) {
            y += 1;
        }
        y
    }

    /// Swap the falling piece into the hold slot. Once per piece.
    pub fn hold(&mut self) -> bool {
        if !self.can_hold || self.phase.is_terminal() {
            return false;
        }
        self.can_hold = false;
        let current = self.piece.kind;
        let incoming = match self.hold.replace(current) {
            Some(kind) => kind,
            None => {
                let kind = self.next;
                self.next = random_kind(&mut self.rng);
                kind
            }
        };
        self.piece = Piece::new(incoming);
        self.px = SPAWN_X;
        self.py = 0;
        if !self.fits(&self.piece.shape, self.px, self.py) {
            self.py = -1;
        }
        true
    }

    fn lock(&mut self) {
        for (c, r) in filled(&self.piece.shape) {
            let (x, y) = (self.px + c, self.py + r);
            // Cells still above the board (after a raised hold spawn) are dropped.
            if y >= 0 {
                self.board[y as usize][x as usize] = Some(self.piece.kind);
            }
        }

        let cleared = self.clear_lines();
        if cleared > 0 {
            self.lines += cleared as u32;
            self.score += POINTS[cleared] * self.level;
            let level = self.lines / 10 + 1;
            if level != self.level {
                self.level = level;
                self.gravity.set_period(drop_interval_ms(level));
                tracing::debug!("tetris: level {}", level);
            }
        }

        self.piece = Piece::new(self.next);
        self.next = random_kind(&mut self.rng);
        self.px = SPAWN_X;
        self.py = 0;
        self.can_hold = true;
        if !self.fits(&self.piece.shape, self.px, self.py) {
            self.phase = Phase::Lost;
            if raise_best(ScoreKey::Tetris, &mut self.best, self.score) {
                tracing::info!("tetris: new best {}", self.score);
            }
        }
    }

    /// Remove full rows bottom-up, dropping everything above. Returns the count.
    fn clear_lines(&mut self) -> usize {
        let kept: Vec<[Option<Kind>; COLS]> = self
            .board
            .iter()
            .filter(|row| row.iter().any(Option::is_none))
            .copied()
            .collect();
        let cleared = ROWS - kept.len();
        if cleared > 0 {
            let mut board = [[None; COLS]; ROWS];
            board[cleared..].copy_from_slice(&kept);
            self.board = board;
        }
        cleared
    }

    fn draw_block(canvas: &mut Canvas, x: f32, y: f32, color: Color) {
        canvas.rect(x + 1.0, y + 1.0, CELL - 2.0, CELL - 2.0, color);
        canvas.rect(x + 1.0, y + 1.0, CELL - 2.0, 4.0, lighten(color));
    }

    fn draw_preview(canvas: &mut Canvas, y: f32, title: &str, kind: Option<Kind>) {
        canvas.text(PANEL_X, y, title, Color::Rgb(100, 116, 139));
        let top = y + 12.0;
        canvas.rect(PANEL_X, top, PANEL_W, PANEL_W, Color::Rgb(15, 15, 26));
        let Some(kind) = kind else { return };
        let shape = shape_of(kind);
        let w = shape.first().map_or(0, Vec::len) as f32;
        let h = shape.len() as f32;
        let ox = PANEL_X + ((4.0 - w) / 2.0).floor() * CELL;
        let oy = top + ((4.0 - h) / 2.0).floor() * CELL;
        for (c, r) in filled(&shape) {
            Self::draw_block(canvas, ox + c as f32 * CELL, oy + r as f32 * CELL, kind.color());
        }
    }
}

fn random_kind(rng: &mut GameRng) -> Kind {
    Kind::ALL[rng.gen_range(0..Kind::ALL.len())]
}

fn lighten(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(46),
            g.saturating_add(46),
            b.saturating_add(46),
        ),
        other => other,
    }
}

impl Game for Tetris {
    fn id(&self) -> GameId {
        GameId::Tetris
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (PANEL_X + PANEL_W, BOARD_H)
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Move(Dir::Left) => {
                self.shift(-1);
            }
            Input::Move(Dir::Right) => {
                self.shift(1);
            }
            Input::Move(Dir::Down) => self.soft_drop(),
            Input::Move(Dir::Up) | Input::Rotate => {
                self.rotate();
            }
            Input::Primary => self.hard_drop(),
            Input::Hold => {
                self.hold();
            }
            _ => {}
        }
    }

    fn update(&mut self) {
        if self.phase == Phase::Playing && self.gravity.step() {
            self.soft_drop();
        }
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(9, 9, 15));
        canvas.rect(0.0, 0.0, BOARD_W, BOARD_H, Color::Rgb(13, 12, 24));

        for (r, row) in self.board.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(kind) = cell {
                    Self::draw_block(canvas, c as f32 * CELL, r as f32 * CELL, kind.color());
                }
            }
        }

        if !self.phase.is_terminal() {
            let ghost = self.ghost_y();
            if ghost > self.py {
                for (c, r) in filled(&self.piece.shape) {
                    canvas.rect(
                        (self.px + c) as f32 * CELL + 1.0,
                        (ghost + r) as f32 * CELL + 1.0,
                        CELL - 2.0,
                        CELL - 2.0,
                        Color::Rgb(40, 38, 64),
                    );
                }
            }
        }
        for (c, r) in filled(&self.piece.shape) {
            Self::draw_block(
                canvas,
                (self.px + c) as f32 * CELL,
                (self.py + r) as f32 * CELL,
                self.piece.kind.color(),
            );
        }

        Self::draw_preview(canvas, 8.0, "HOLD", self.hold);
        Self::draw_preview(canvas, 140.0, "NEXT", Some(self.next));
        let info = Color::Rgb(196, 181, 253);
        canvas.text(PANEL_X, 280.0, format!("LEVEL {}", self.level), info);
        canvas.text(PANEL_X, 300.0, format!("LINES {}", self.lines), info);

        if self.phase == Phase::Lost {
            canvas.veil(Color::Rgb(0, 0, 0), 0.72);
            canvas.label(BOARD_W / 2.0, BOARD_H / 2.0 - 16.0, "Game Over", Color::Rgb(241, 245, 249));
            canvas.label(
                BOARD_W / 2.0,
                BOARD_H / 2.0 + 8.0,
                format!("Score {} · R to restart", self.score),
                Color::Rgb(167, 139, 250),
            );
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Tetris::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn result(&self) -> Option<RunResult> {
        (self.phase == Phase::Lost).then_some(RunResult {
            key: ScoreKey::Tetris,
            value: self.score,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Score", self.score),
            Stat::new("Level", self.level),
            Stat::new("Lines", self.lines),
            Stat::best(ScoreKey::Tetris, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "←→ Move │ ↑/X Rotate │ ↓ Soft drop │ Space Hard drop │ C Hold │ P Pause │ R Restart"
    }
}
