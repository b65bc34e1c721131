use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use rand::Rng;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

const CW: f32 = 460.0;
const CH: f32 = 360.0;
const BRICK_ROWS: usize = 6;
const BRICK_COLS: usize = 8;
const BW: f32 = 50.0;
const BH: f32 = 18.0;
const BG: f32 = 4.0;
const BL: f32 = (CW - (BRICK_COLS as f32 * (BW + BG) - BG)) / 2.0;
const BT: f32 = 52.0;
const PAD_W: f32 = 86.0;
const PAD_H: f32 = 12.0;
const PAD_Y: f32 = CH - 25.0;
const PAD_STEP: f32 = 24.0;
const BALL_R: f32 = 8.0;
const BALL_SPEED: f32 = 4.8;
const MAX_SPEED: f32 = BALL_SPEED + 2.5;
const SPEED_STEP: f32 = 0.08;
const SERVE_Y: f32 = CH - 60.0;
const BRICK_POINTS: u32 = 10;
const START_LIVES: u32 = 3;

const ROW_COLORS: [Color; BRICK_ROWS] = [
    Color::Rgb(255, 71, 87),
    Color::Rgb(255, 107, 129),
    Color::Rgb(255, 165, 2),
    Color::Rgb(255, 221, 89),
    Color::Rgb(46, 213, 115),
    Color::Rgb(30, 144, 255),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub x: f32,
    pub y: f32,
    pub color: Color,
    pub alive: bool,
}

fn layout_bricks() -> Vec<Brick> {
    (0..BRICK_ROWS)
        .flat_map(|r| {
            (0..BRICK_COLS).map(move |c| Brick {
                x: BL + c as f32 * (BW + BG),
                y: BT + r as f32 * (BH + BG),
                color: ROW_COLORS[r],
                alive: true,
            })
        })
        .collect()
}

pub struct Breakout {
    bricks: Vec<Brick>,
    paddle_x: f32,
    ball_x: f32,
    ball_y: f32,
    ball_dx: f32,
    ball_dy: f32,
    ball_speed: f32,
    lives: u32,
    score: u32,
    best: u32,
    /// Idle means the ball sits on the paddle waiting for launch.
    phase: Phase,
    rng: GameRng,
}

impl Breakout {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, rng: GameRng) -> Self {
        let paddle_x = CW / 2.0 - PAD_W / 2.0;
        Self {
            bricks: layout_bricks(),
            paddle_x,
            ball_x: CW / 2.0,
            ball_y: PAD_Y - BALL_R,
            ball_dx: 0.0,
            ball_dy: 0.0,
            ball_speed: BALL_SPEED,
            lives: START_LIVES,
            score: 0,
            best,
            phase: Phase::Idle,
            rng,
        }
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn ball(&self) -> (f32, f32) {
        (self.ball_x, self.ball_y)
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.ball_dx, self.ball_dy)
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Send the ball upwards at a random angle within `spread` of vertical.
    fn serve(&mut self, spread: f32) {
        let angle = -FRAC_PI_2 + (self.rng.gen::<f32>() - 0.5) * spread;
        self.ball_dx = self.ball_speed * angle.cos();
        self.ball_dy = self.ball_speed * angle.sin();
    }

    pub fn launch(&mut self) {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Playing;
                self.serve(0.6);
            }
            Phase::Won | Phase::Lost => self.reset(),
            Phase::Playing => {}
        }
    }

    pub fn move_paddle_to(&mut self, center_x: f32) {
        self.paddle_x = (center_x - PAD_W / 2.0).clamp(0.0, CW - PAD_W);
        if self.phase == Phase::Idle {
            self.ball_x = self.paddle_x + PAD_W / 2.0;
        }
    }

    fn nudge_paddle(&mut self, dx: f32) {
        self.move_paddle_to(self.paddle_x + PAD_W / 2.0 + dx);
    }

    fn hit_brick(ball_x: f32, ball_y: f32, b: &Brick) -> bool {
        b.alive
            && ball_x + BALL_R > b.x
            && ball_x - BALL_R < b.x + BW
            && ball_y + BALL_R > b.y
            && ball_y - BALL_R < b.y + BH
    }

    fn finish(&mut self, phase: Phase) {
        self.phase = phase;
        if raise_best(ScoreKey::Breakout, &mut self.best, self.score) {
            tracing::info!("breakout: new best {}", self.score);
        }
    }
}

impl Game for Breakout {
    fn id(&self) -> GameId {
        GameId::Breakout
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (CW, CH)
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Move(Dir::Left) => self.nudge_paddle(-PAD_STEP),
            Input::Move(Dir::Right) => self.nudge_paddle(PAD_STEP),
            Input::Pointer { x, .. } => self.move_paddle_to(x),
            Input::Primary | Input::Move(Dir::Up) | Input::Click { .. } => self.launch(),
            _ => {}
        }
    }

    fn update(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }

        self.ball_x += self.ball_dx;
        self.ball_y += self.ball_dy;

        // Walls
        if self.ball_x - BALL_R < 0.0 {
            self.ball_x = BALL_R;
            self.ball_dx = self.ball_dx.abs();
        }
        if self.ball_x + BALL_R > CW {
            self.ball_x = CW - BALL_R;
            self.ball_dx = -self.ball_dx.abs();
        }
        if self.ball_y - BALL_R < 0.0 {
            self.ball_y = BALL_R;
            self.ball_dy = self.ball_dy.abs();
        }

        // Missed
        if self.ball_y - BALL_R > CH {
            self.lives = self.lives.saturating_sub(1);
            if self.lives == 0 {
                self.finish(Phase::Lost);
                return;
            }
            tracing::debug!("breakout: ball lost, {} lives left", self.lives);
            self.ball_x = self.paddle_x + PAD_W / 2.0;
            self.ball_y = SERVE_Y;
            self.serve(0.5);
        }

        // Paddle: outgoing angle follows where the ball lands on it
        if self.ball_dy > 0.0
            && self.ball_y + BALL_R >= PAD_Y
            && self.ball_y + BALL_R <= PAD_Y + PAD_H
            && self.ball_x > self.paddle_x
            && self.ball_x < self.paddle_x + PAD_W
        {
            let rel = (self.ball_x - (self.paddle_x + PAD_W / 2.0)) / (PAD_W / 2.0);
            let angle = rel * FRAC_PI_3;
            self.ball_dx = self.ball_speed * angle.sin();
            self.ball_dy = -self.ball_speed * angle.cos();
            self.ball_y = PAD_Y - BALL_R;
        }

        // At most one brick per step; bounce off the shallower overlap
        let (bx, by) = (self.ball_x, self.ball_y);
        if let Some(brick) = self.bricks.iter_mut().find(|b| Self::hit_brick(bx, by, b)) {
            brick.alive = false;
            let overlap_x = (bx + BALL_R - brick.x).min(brick.x + BW - (bx - BALL_R));
            let overlap_y = (by + BALL_R - brick.y).min(brick.y + BH - (by - BALL_R));
            if overlap_x < overlap_y {
                self.ball_dx = -self.ball_dx;
            } else {
                self.ball_dy = -self.ball_dy;
            }
            self.score += BRICK_POINTS;

            let faster = (self.ball_speed + SPEED_STEP).min(MAX_SPEED);
            let scale = faster / self.ball_speed;
            self.ball_speed = faster;
            self.ball_dx *= scale;
            self.ball_dy *= scale;
        }

        if self.bricks.iter().all(|b| !b.alive) {
            self.finish(Phase::Won);
        }
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(9, 9, 15));

        for b in self.bricks.iter().filter(|b| b.alive) {
            canvas.rect(b.x, b.y, BW, BH, b.color);
            canvas.rect(b.x + 2.0, b.y + 2.0, BW - 4.0, 4.0, Color::Rgb(255, 255, 255));
        }

        canvas.rect(self.paddle_x, PAD_Y, PAD_W, PAD_H, Color::Rgb(124, 58, 237));
        canvas.rect(self.paddle_x + 4.0, PAD_Y + 2.0, PAD_W - 8.0, 3.0, Color::Rgb(167, 139, 250));
        canvas.circle(self.ball_x, self.ball_y, BALL_R, Color::Rgb(196, 181, 253));

        let hud = Color::Rgb(200, 200, 210);
        canvas.text(10.0, 14.0, format!("Score: {}", self.score), hud);
        canvas.label(CW / 2.0, 14.0, "♥".repeat(self.lives as usize), Color::Rgb(255, 71, 87));
        canvas.text(CW - 90.0, 14.0, format!("Best: {}", self.best), hud);

        match self.phase {
            Phase::Idle => canvas.text_centered(CH - 90.0, "Space / Click to launch", Color::Rgb(167, 139, 250), false),
            Phase::Lost => canvas.banner(
                "Game Over",
                Color::Rgb(241, 245, 249),
                &format!("Score {} · Best {} · Space to restart", self.score, self.best),
            ),
            Phase::Won => canvas.banner(
                "You Win!",
                Color::Rgb(167, 139, 250),
                &format!("Score {} · Space to play again", self.score),
            ),
            Phase::Playing => {}
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Breakout::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn result(&self) -> Option<RunResult> {
        self.phase.is_terminal().then_some(RunResult {
            key: ScoreKey::Breakout,
            value: self.score,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Score", self.score),
            Stat::new("Lives", self.lives),
            Stat::best(ScoreKey::Breakout, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "←→/Mouse Paddle │ Space/Click Launch │ P Pause │ R Restart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_play() -> Breakout {
        let mut b = Breakout::with_rng(0, game_rng(Some(13)));
        b.launch();
        // Clear the field so only the surfaces under test matter.
        for brick in &mut b.bricks {
            brick.alive = false;
        }
        b.bricks[0].alive = true;
        b.bricks[0].x = -1000.0;
        b
    }

    fn aim(b: &mut Breakout, x: f32, y: f32, dx: f32, dy: f32) {
        b.ball_x = x;
        b.ball_y = y;
        b.ball_dx = dx;
        b.ball_dy = dy;
    }

    #[test]
    fn layout_is_six_by_eight() {
        let b = Breakout::with_rng(0, game_rng(Some(1)));
        assert_eq!(b.bricks().len(), 48);
        assert!(b.bricks().iter().all(|br| br.alive));
        let first = b.bricks()[0];
        assert_eq!((first.x, first.y), (BL, BT));
        assert_eq!(first.color, ROW_COLORS[0]);
        assert_eq!(b.bricks()[47].color, ROW_COLORS[5]);
    }

    #[test]
    fn ball_rides_the_paddle_until_launch() {
        let mut b = Breakout::with_rng(0, game_rng(Some(1)));
        b.handle_input(Input::Move(Dir::Left));
        b.update();
        assert_eq!(b.phase(), Phase::Idle);
        assert_eq!(b.ball().0, b.paddle_x + PAD_W / 2.0);

        b.handle_input(Input::Primary);
        assert_eq!(b.phase(), Phase::Playing);
        let (dx, dy) = b.velocity();
        assert!(dy < 0.0);
        assert!(((dx * dx + dy * dy).sqrt() - BALL_SPEED).abs() < 1e-4);
    }

    #[test]
    fn pointer_centres_paddle_within_court() {
        let mut b = Breakout::with_rng(0, game_rng(Some(1)));
        b.handle_input(Input::Pointer { x: 5.0, y: 0.0 });
        assert_eq!(b.paddle_x, 0.0);
        b.handle_input(Input::Pointer { x: CW + 50.0, y: 0.0 });
        assert_eq!(b.paddle_x, CW - PAD_W);
    }

    #[test]
    fn side_walls_flip_only_dx() {
        let mut b = in_play();
        aim(&mut b, BALL_R + 1.0, 200.0, -3.0, -2.0);
        b.update();
        assert_eq!(b.velocity(), (3.0, -2.0));
        aim(&mut b, CW - BALL_R - 1.0, 200.0, 3.0, 2.0);
        b.update();
        assert_eq!(b.velocity(), (-3.0, 2.0));
    }

    #[test]
    fn ceiling_flips_only_dy() {
        let mut b = in_play();
        aim(&mut b, 200.0, BALL_R + 1.0, 1.5, -3.0);
        b.update();
        assert_eq!(b.velocity(), (1.5, 3.0));
    }

    #[test]
    fn paddle_centre_sends_ball_straight_up() {
        let mut b = in_play();
        let centre = b.paddle_x + PAD_W / 2.0;
        aim(&mut b, centre, PAD_Y - BALL_R - 2.0, 0.0, 3.0);
        b.update();
        let (dx, dy) = b.velocity();
        assert!(dx.abs() < 1e-4);
        assert!(dy < 0.0);
        assert_eq!(b.ball().1, PAD_Y - BALL_R);
    }

    #[test]
    fn paddle_edge_angles_outwards() {
        let mut b = in_play();
        let right = b.paddle_x + PAD_W - 4.0;
        aim(&mut b, right, PAD_Y - BALL_R - 2.0, 0.0, 3.0);
        b.update();
        let (dx, dy) = b.velocity();
        assert!(dx > 0.0 && dy < 0.0);
        // Never flatter than 60 degrees from vertical.
        assert!(dx.atan2(-dy) <= FRAC_PI_3 + 1e-4);
    }

    #[test]
    fn brick_side_hit_flips_dx() {
        let mut b = in_play();
        b.bricks[0] = Brick {
            x: 200.0,
            y: 150.0,
            color: Color::Red,
            alive: true,
        };
        // Ball just left of the brick, vertically centred: shallow x overlap.
        aim(&mut b, 200.0 - BALL_R + 1.0 - 2.0, 150.0 + BH / 2.0, 2.0, 0.5);
        b.update();
        assert!(!b.bricks[0].alive);
        let (dx, dy) = b.velocity();
        assert!(dx < 0.0 && dy > 0.0);
        assert_eq!(b.score(), BRICK_POINTS);
    }

    #[test]
    fn brick_underside_hit_flips_dy_and_speeds_up() {
        let mut b = in_play();
        b.bricks[0] = Brick {
            x: 200.0,
            y: 150.0,
            color: Color::Red,
            alive: true,
        };
        b.bricks[1] = Brick {
            x: 0.0,
            y: 0.0,
            color: Color::Red,
            alive: true,
        };
        b.bricks[1].x = -1000.0;
        aim(&mut b, 225.0, 150.0 + BH + BALL_R + 1.0, 0.0, -3.0);
        b.update();
        assert!(!b.bricks[0].alive);
        let (dx, dy) = b.velocity();
        assert_eq!(dx, 0.0);
        assert!(dy > 0.0);
        assert!((b.ball_speed - (BALL_SPEED + SPEED_STEP)).abs() < 1e-5);
        assert_eq!(b.phase(), Phase::Playing);
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let mut b = in_play();
        b.ball_speed = MAX_SPEED;
        b.bricks[0] = Brick {
            x: 200.0,
            y: 150.0,
            color: Color::Red,
            alive: true,
        };
        b.bricks[1].alive = true;
        b.bricks[1].x = -1000.0;
        aim(&mut b, 225.0, 150.0 + BH + BALL_R + 1.0, 0.0, -3.0);
        b.update();
        assert_eq!(b.ball_speed, MAX_SPEED);
    }

    #[test]
    fn losing_every_ball_ends_the_game() {
        let mut b = in_play();
        b.score = 70;
        for expected in [2, 1] {
            aim(&mut b, 30.0, CH + BALL_R + 1.0, 0.0, 2.0);
            b.update();
            assert_eq!(b.lives(), expected);
            assert_eq!(b.phase(), Phase::Playing);
            assert!(b.velocity().1 < 0.0);
        }
        aim(&mut b, 30.0, CH + BALL_R + 1.0, 0.0, 2.0);
        b.update();
        assert_eq!(b.phase(), Phase::Lost);
        assert_eq!(b.result().map(|r| r.value), Some(70));
    }

    #[test]
    fn last_brick_wins() {
        let mut b = in_play();
        b.bricks[0] = Brick {
            x: 200.0,
            y: 150.0,
            color: Color::Red,
            alive: true,
        };
        aim(&mut b, 225.0, 150.0 + BH + BALL_R + 1.0, 0.0, -3.0);
        b.update();
        assert_eq!(b.phase(), Phase::Won);
        assert_eq!(b.best, BRICK_POINTS);
        b.launch();
        assert_eq!(b.phase(), Phase::Idle);
        assert_eq!(b.bricks().iter().filter(|br| br.alive).count(), 48);
    }
}
