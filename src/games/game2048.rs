use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

pub const SIZE: usize = 4;
pub const WIN_VALUE: u32 = 2048;
const FOUR_CHANCE: f64 = 0.15;

const GRID_PX: f32 = 308.0;
const GAP_PX: f32 = 6.0;
const CELL_PX: f32 = (GRID_PX - GAP_PX * 5.0) / 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: u32,
    pub value: u32,
    pub row: usize,
    pub col: usize,
    /// Produced by a merge on the last move.
    pub merged: bool,
}

impl Tile {
    pub fn new(id: u32, value: u32, row: usize, col: usize) -> Self {
        Self {
            id,
            value,
            row,
            col,
            merged: false,
        }
    }
}

/// Outcome of sliding a board, before any spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub tiles: Vec<Tile>,
    pub gained: u32,
    pub moved: bool,
}

/// Grid cell of the `k`th slot from the leading edge of `line`.
fn slot(dir: Dir, line: usize, k: usize) -> (usize, usize) {
    match dir {
        Dir::Left => (line, k),
        Dir::Right => (line, SIZE - 1 - k),
        Dir::Up => (k, line),
        Dir::Down => (SIZE - 1 - k, line),
    }
}

/// Slide every row or column towards `dir`. Equal neighbours merge once
/// per move; the tile nearer the leading edge survives and keeps its id.
pub fn slide(tiles: &[Tile], dir: Dir) -> Slide {
    let mut grid = [[None::<Tile>; SIZE]; SIZE];
    for t in tiles {
        grid[t.row][t.col] = Some(*t);
    }

    let mut out = Vec::with_capacity(tiles.len());
    let mut gained = 0;
    let mut merges = 0;

    for line in 0..SIZE {
        let filled: Vec<Tile> = (0..SIZE)
            .filter_map(|k| {
                let (r, c) = slot(dir, line, k);
                grid[r][c]
            })
            .collect();

        let mut packed: Vec<Tile> = Vec::with_capacity(SIZE);
        let mut i = 0;
        while i < filled.len() {
            let mut tile = filled[i];
            tile.merged = false;
            if i + 1 < filled.len() && filled[i + 1].value == tile.value {
                tile.value *= 2;
                tile.merged = true;
                gained += tile.value;
                merges += 1;
                i += 2;
            } else {
                i += 1;
            }
            packed.push(tile);
        }

        for (k, mut tile) in packed.into_iter().enumerate() {
            let (r, c) = slot(dir, line, k);
            tile.row = r;
            tile.col = c;
            out.push(tile);
        }
    }

    let shifted = out.iter().any(|t| {
        tiles
            .iter()
            .find(|o| o.id == t.id)
            .is_some_and(|o| o.row != t.row || o.col != t.col)
    });

    Slide {
        tiles: out,
        gained,
        moved: shifted || merges > 0,
    }
}

/// True while some move can still change the board.
pub fn can_move(tiles: &[Tile]) -> bool {
    if tiles.len() < SIZE * SIZE {
        return true;
    }
    let mut grid = [[0u32; SIZE]; SIZE];
    for t in tiles {
        grid[t.row][t.col] = t.value;
    }
    (0..SIZE).any(|r| {
        (0..SIZE).any(|c| {
            (c + 1 < SIZE && grid[r][c] == grid[r][c + 1])
                || (r + 1 < SIZE && grid[r][c] == grid[r + 1][c])
        })
    })
}

fn tile_colors(value: u32) -> (Color, Color) {
    match value {
        2 => (Color::Rgb(30, 27, 58), Color::Rgb(196, 181, 253)),
        4 => (Color::Rgb(46, 32, 96), Color::Rgb(221, 214, 254)),
        8 => (Color::Rgb(124, 58, 237), Color::White),
        16 => (Color::Rgb(109, 40, 217), Color::White),
        32 => (Color::Rgb(234, 88, 12), Color::White),
        64 => (Color::Rgb(220, 38, 38), Color::White),
        128 => (Color::Rgb(217, 119, 6), Color::White),
        256 => (Color::Rgb(202, 138, 4), Color::White),
        512 => (Color::Rgb(22, 163, 74), Color::White),
        1024 => (Color::Rgb(8, 145, 178), Color::White),
        2048 => (Color::Rgb(124, 58, 237), Color::Rgb(255, 241, 118)),
        _ => (Color::Rgb(88, 28, 135), Color::White),
    }
}

fn tile_pos(n: usize) -> f32 {
    GAP_PX + n as f32 * (CELL_PX + GAP_PX)
}

pub struct Game2048 {
    tiles: Vec<Tile>,
    next_id: u32,
    score: u32,
    best: u32,
    phase: Phase,
    /// Set once when a 2048 tile first appears; play continues.
    reached_goal: bool,
    show_goal: bool,
    rng: GameRng,
}

impl Game2048 {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, rng: GameRng) -> Self {
        let mut game = Self::from_tiles(Vec::new(), best, rng);
        game.phase = Phase::Idle;
        game.spawn();
        game.spawn();
        game
    }

    /// Start from a fixed layout. Ids are renumbered from 1.
    pub fn from_tiles(tiles: Vec<Tile>, best: u32, rng: GameRng) -> Self {
        let tiles: Vec<Tile> = tiles
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tile { id: i as u32 + 1, ..t })
            .collect();
        Self {
            next_id: tiles.len() as u32 + 1,
            tiles,
            score: 0,
            best,
            phase: Phase::Playing,
            reached_goal: false,
            show_goal: false,
            rng,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    fn spawn(&mut self) -> bool {
        let free: Vec<(usize, usize)> = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| !self.tiles.iter().any(|t| t.row == r && t.col == c))
            .collect();
        let Some(&(row, col)) = free.choose(&mut self.rng) else {
            return false;
        };
        let value = if self.rng.gen_bool(FOUR_CHANCE) { 4 } else { 2 };
        self.tiles.push(Tile::new(self.next_id, value, row, col));
        self.next_id += 1;
        true
    }

    /// Slide, then spawn one tile if anything changed. Returns whether the
    /// move did anything.
    pub fn shift(&mut self, dir: Dir) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        let Slide { tiles, gained, moved } = slide(&self.tiles, dir);
        if !moved {
            return false;
        }
        self.phase = Phase::Playing;
        self.tiles = tiles;
        self.score += gained;
        self.show_goal = false;
        if raise_best(ScoreKey::Game2048, &mut self.best, self.score) {
            tracing::debug!("2048: best now {}", self.best);
        }
        self.spawn();

        if !self.reached_goal && self.tiles.iter().any(|t| t.value >= WIN_VALUE) {
            self.reached_goal = true;
            self.show_goal = true;
            tracing::info!("2048: reached {} with score {}", WIN_VALUE, self.score);
        }
        if !can_move(&self.tiles) {
            self.phase = Phase::Lost;
        }
        true
    }
}

impl Game for Game2048 {
    fn id(&self) -> GameId {
        GameId::Game2048
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (GRID_PX, GRID_PX)
    }

    fn handle_input(&mut self, input: Input) {
        if let Input::Move(dir) | Input::Swipe(dir) = input {
            self.shift(dir);
        }
    }

    // Turn-based: nothing advances between moves.
    fn update(&mut self) {}

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(19, 19, 42));
        for r in 0..SIZE {
            for c in 0..SIZE {
                canvas.rect(tile_pos(c), tile_pos(r), CELL_PX, CELL_PX, Color::Rgb(28, 28, 56));
            }
        }

        for tile in &self.tiles {
            let (bg, fg) = tile_colors(tile.value);
            let (x, y) = (tile_pos(tile.col), tile_pos(tile.row));
            if tile.merged {
                canvas.rect(x - 2.0, y - 2.0, CELL_PX + 4.0, CELL_PX + 4.0, fg);
            }
            canvas.rect(x, y, CELL_PX, CELL_PX, bg);
            canvas.label(x + CELL_PX / 2.0, y + CELL_PX / 2.0, tile.value.to_string(), fg);
        }

        if self.phase == Phase::Lost {
            canvas.banner(
                "Game Over",
                Color::White,
                &format!("Score {} · R to play again", self.score),
            );
        } else if self.show_goal {
            canvas.banner("You Won!", Color::Rgb(255, 241, 118), "Keep sliding or R to restart");
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Game2048::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.score
    }

    // Best is tracked live, not only at game over.
    fn result(&self) -> Option<RunResult> {
        Some(RunResult {
            key: ScoreKey::Game2048,
            value: self.score,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        let top = self.tiles.iter().map(|t| t.value).max().unwrap_or(0);
        vec![
            Stat::new("Score", self.score),
            Stat::new("Tile", top),
            Stat::best(ScoreKey::Game2048, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "↑↓←→/WASD/Drag Slide │ R Restart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: u32, row: usize, col: usize) -> Tile {
        Tile::new(0, value, row, col)
    }

    fn at(tiles: &[Tile], row: usize, col: usize) -> Option<u32> {
        tiles.iter().find(|t| t.row == row && t.col == col).map(|t| t.value)
    }

    fn board(cells: [[u32; 4]; 4]) -> Vec<Tile> {
        let mut out = Vec::new();
        let mut id = 1;
        for (r, row) in cells.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v != 0 {
                    out.push(Tile::new(id, v, r, c));
                    id += 1;
                }
            }
        }
        out
    }

    #[test]
    fn pair_merges_into_leading_tile() {
        let tiles = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let s = slide(&tiles, Dir::Left);
        assert!(s.moved);
        assert_eq!(s.gained, 4);
        assert_eq!(s.tiles.len(), 1);
        assert_eq!(s.tiles[0].value, 4);
        assert_eq!((s.tiles[0].row, s.tiles[0].col), (0, 0));
        assert_eq!(s.tiles[0].id, 1);
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        let tiles = board([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]);
        let s = slide(&tiles, Dir::Left);
        assert_eq!(at(&s.tiles, 0, 0), Some(4));
        assert_eq!(at(&s.tiles, 0, 1), Some(4));
        assert_eq!(s.gained, 4);
    }

    #[test]
    fn four_equal_make_two_pairs() {
        let tiles = board([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let s = slide(&tiles, Dir::Right);
        assert_eq!(s.tiles.len(), 2);
        assert_eq!(at(&s.tiles, 0, 3), Some(4));
        assert_eq!(at(&s.tiles, 0, 2), Some(4));
        assert_eq!(s.gained, 8);
    }

    #[test]
    fn merge_preserves_total_plus_gain() {
        let tiles = board([[2, 4, 4, 8], [2, 0, 2, 2], [16, 16, 16, 0], [0, 2, 0, 2]]);
        for dir in [Dir::Left, Dir::Right, Dir::Up, Dir::Down] {
            let before: u32 = tiles.iter().map(|t| t.value).sum();
            let s = slide(&tiles, dir);
            let after: u32 = s.tiles.iter().map(|t| t.value).sum();
            assert_eq!(before, after, "{dir:?}");
            let merged: u32 = s.tiles.iter().filter(|t| t.merged).map(|t| t.value).sum();
            assert_eq!(merged, s.gained, "{dir:?}");
        }
    }

    #[test]
    fn columns_slide_vertically() {
        let tiles = board([[0, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0]]);
        let s = slide(&tiles, Dir::Down);
        assert_eq!(at(&s.tiles, 3, 0), Some(4));
        let s = slide(&tiles, Dir::Up);
        assert_eq!(at(&s.tiles, 0, 0), Some(4));
    }

    #[test]
    fn blocked_move_is_a_no_op() {
        let tiles = board([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(!slide(&tiles, Dir::Left).moved);

        let mut g = Game2048::from_tiles(tiles, 0, game_rng(Some(1)));
        assert!(!g.shift(Dir::Left));
        assert_eq!(g.tiles().len(), 2);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn each_real_move_spawns_exactly_one_tile() {
        let mut g = Game2048::from_tiles(vec![t(2, 0, 0), t(2, 0, 1)], 0, game_rng(Some(9)));
        assert!(g.shift(Dir::Left));
        assert_eq!(g.score(), 4);
        assert_eq!(g.tiles().len(), 2);
        assert_eq!(at(g.tiles(), 0, 0), Some(4));
        let spawned = g.tiles().iter().find(|t| (t.row, t.col) != (0, 0)).unwrap();
        assert!(spawned.value == 2 || spawned.value == 4);
    }

    #[test]
    fn swipe_left_merges_like_the_arrow_key() {
        let mut g = Game2048::from_tiles(vec![t(2, 0, 0), t(2, 0, 1)], 0, game_rng(Some(9)));
        g.handle_input(Input::Swipe(Dir::Left));
        assert_eq!(g.score(), 4);
        assert_eq!(at(g.tiles(), 0, 0), Some(4));
    }

    #[test]
    fn full_board_without_pairs_is_lost() {
        let stuck = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!can_move(&stuck));
        let open = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]);
        assert!(can_move(&open));
    }

    #[test]
    fn reaching_2048_fires_once_and_play_continues() {
        let mut g = Game2048::from_tiles(vec![t(1024, 0, 0), t(1024, 0, 1)], 0, game_rng(Some(4)));
        assert!(g.shift(Dir::Left));
        assert!(g.reached_goal());
        assert!(g.show_goal);
        assert!(!g.phase().is_terminal());
        assert!(g.shift(Dir::Right) || g.shift(Dir::Down));
        assert!(!g.show_goal);
        assert!(g.reached_goal());
    }

    #[test]
    fn best_follows_score_live() {
        let mut g = Game2048::from_tiles(vec![t(8, 0, 0), t(8, 0, 1)], 10, game_rng(Some(2)));
        g.shift(Dir::Left);
        assert_eq!(g.best, 16);
        assert_eq!(g.result().map(|r| r.value), Some(16));
        g.reset();
        assert_eq!(g.best, 16);
        assert_eq!(g.score(), 0);
        assert_eq!(g.tiles().len(), 2);
    }
}
