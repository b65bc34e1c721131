use rand::Rng;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

const W: f32 = 360.0;
const H: f32 = 480.0;
const BIRD_R: f32 = 13.0;
const BIRD_X: f32 = 75.0;
const PIPE_W: f32 = 52.0;
const GAP_BASE: f32 = 130.0;
const GAP_MIN: f32 = 88.0;
const GRAVITY: f32 = 0.38;
const FLAP_VELOCITY: f32 = -7.8;
const PIPE_SPEED_BASE: f32 = 2.8;
const SPAWN_EVERY: u64 = 120;
const WARMUP: u64 = 60;
const GROUND_H: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Centre of the opening.
    pub gap_y: f32,
    /// Full height of the opening.
    pub gap: f32,
    pub scored: bool,
}

impl Pipe {
    fn top(&self) -> f32 {
        self.gap_y - self.gap / 2.0
    }

    fn bottom(&self) -> f32 {
        self.gap_y + self.gap / 2.0
    }
}

pub fn gap_for(score: u32) -> f32 {
    (GAP_BASE - score as f32 * 2.0).max(GAP_MIN)
}

pub struct FlappyBird {
    bird_y: f32,
    bird_vy: f32,
    angle: f32,
    pipes: Vec<Pipe>,
    pipe_speed: f32,
    frame: u64,
    score: u32,
    best: u32,
    phase: Phase,
    rng: GameRng,
}

impl FlappyBird {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, rng: GameRng) -> Self {
        Self {
            bird_y: H / 2.0,
            bird_vy: 0.0,
            angle: 0.0,
            pipes: Vec::new(),
            pipe_speed: PIPE_SPEED_BASE,
            frame: 0,
            score: 0,
            best,
            phase: Phase::Idle,
            rng,
        }
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn pipe_speed(&self) -> f32 {
        self.pipe_speed
    }

    /// Flap; the first flap starts the run and a flap after death restarts.
    pub fn flap(&mut self) {
        match self.phase {
            Phase::Lost | Phase::Won => {
                self.reset();
                return;
            }
            Phase::Idle => self.phase = Phase::Playing,
            Phase::Playing => {}
        }
        self.bird_vy = FLAP_VELOCITY;
    }

    fn spawn_pipe(&mut self) {
        let gap_y = 80.0 + self.rng.gen::<f32>() * (H - 160.0);
        self.pipes.push(Pipe {
            x: W + PIPE_W,
            gap_y,
            gap: gap_for(self.score),
            scored: false,
        });
    }

    fn crashed(&self) -> bool {
        if self.bird_y + BIRD_R > H || self.bird_y - BIRD_R < 0.0 {
            return true;
        }
        self.pipes.iter().any(|p| {
            let in_x = BIRD_X + BIRD_R - 4.0 > p.x && BIRD_X - BIRD_R + 4.0 < p.x + PIPE_W;
            in_x && (self.bird_y - BIRD_R + 4.0 < p.top() || self.bird_y + BIRD_R - 4.0 > p.bottom())
        })
    }

    fn draw_bird(&self, canvas: &mut Canvas) {
        let dead = self.phase == Phase::Lost;
        let (x, y) = (BIRD_X, self.bird_y);
        let (body, wing) = if dead {
            (Color::Rgb(239, 68, 68), Color::Rgb(220, 38, 38))
        } else {
            (Color::Rgb(251, 191, 36), Color::Rgb(245, 158, 11))
        };
        canvas.circle(x, y, BIRD_R, body);
        canvas.circle(x - 3.0, y + 3.0 + self.angle * 3.0, 6.0, wing);
        canvas.circle(x + 6.0, y - 4.0, 3.5, Color::Rgb(10, 10, 15));
        // Beak dips as the bird noses down
        canvas.rect(x + 10.0, y - 2.0 + self.angle * 6.0, 8.0, 5.0, Color::Rgb(249, 115, 22));
    }
}

impl Game for FlappyBird {
    fn id(&self) -> GameId {
        GameId::Flappy
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (W, H)
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Primary | Input::Move(Dir::Up) | Input::Click { .. } => self.flap(),
            _ => {}
        }
    }

    fn update(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }

        self.bird_vy += GRAVITY;
        self.bird_y += self.bird_vy;
        self.angle = (self.bird_vy * 0.08).clamp(-0.5, 1.2);

        self.frame += 1;
        if self.frame % SPAWN_EVERY == 0 || (self.pipes.is_empty() && self.frame > WARMUP) {
            self.spawn_pipe();
        }

        for p in &mut self.pipes {
            p.x -= self.pipe_speed;
        }
        self.pipes.retain(|p| p.x + PIPE_W > -10.0);

        for p in &mut self.pipes {
            if !p.scored && p.x + PIPE_W < BIRD_X {
                p.scored = true;
                self.score += 1;
                self.pipe_speed = PIPE_SPEED_BASE + self.score as f32 * 0.06;
            }
        }

        if self.crashed() {
            self.phase = Phase::Lost;
            if raise_best(ScoreKey::Flappy, &mut self.best, self.score) {
                tracing::info!("flappy: new best {}", self.score);
            }
        }
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(15, 12, 41));
        canvas.rect(0.0, H * 0.5, W, H * 0.5, Color::Rgb(36, 30, 80));

        // Stars drift slowly with the frame counter
        for i in 0..30u64 {
            let sx = ((i * 137) as f32 + self.frame as f32 * 0.2) % W;
            let sy = ((i * 89) as f32) % (H * 0.65);
            let size = if i % 2 == 0 { 1.0 } else { 2.0 };
            canvas.rect(sx, sy, size, size, Color::Rgb(140, 140, 170));
        }

        for p in &self.pipes {
            let top = p.top();
            let bottom = p.bottom();
            canvas.rect(p.x, 0.0, PIPE_W, top, Color::Rgb(16, 185, 129));
            canvas.rect(p.x - 4.0, top - 14.0, PIPE_W + 8.0, 14.0, Color::Rgb(5, 150, 105));
            canvas.rect(p.x, bottom, PIPE_W, H - bottom, Color::Rgb(16, 185, 129));
            canvas.rect(p.x - 4.0, bottom, PIPE_W + 8.0, 14.0, Color::Rgb(5, 150, 105));
        }

        canvas.rect(0.0, H - GROUND_H, W, GROUND_H, Color::Rgb(146, 64, 14));
        canvas.rect(0.0, H - GROUND_H, W, 3.0, Color::Rgb(161, 98, 7));

        self.draw_bird(canvas);

        match self.phase {
            Phase::Idle => canvas.banner("Flappy Bird", Color::Rgb(251, 191, 36), "Space / Click to flap"),
            Phase::Lost => canvas.banner(
                "Oops!",
                Color::Rgb(241, 245, 249),
                &format!("Score {} · Space to restart", self.score),
            ),
            _ => canvas.label(W / 2.0, 26.0, self.score.to_string(), Color::Rgb(241, 245, 249)),
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = FlappyBird::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn result(&self) -> Option<RunResult> {
        (self.phase == Phase::Lost).then_some(RunResult {
            key: ScoreKey::Flappy,
            value: self.score,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Score", self.score),
            Stat::best(ScoreKey::Flappy, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "Space/↑/Click Flap │ P Pause │ R Restart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flying() -> FlappyBird {
        let mut f = FlappyBird::with_rng(0, game_rng(Some(21)));
        f.flap();
        f
    }

    #[test]
    fn waits_for_the_first_flap() {
        let mut f = FlappyBird::with_rng(0, game_rng(Some(1)));
        for _ in 0..100 {
            f.update();
        }
        assert_eq!(f.bird_y, H / 2.0);
        f.handle_input(Input::Click { x: 0.0, y: 0.0 });
        assert_eq!(f.phase(), Phase::Playing);
        assert_eq!(f.bird_vy, FLAP_VELOCITY);
    }

    #[test]
    fn falling_into_the_floor_kills() {
        let mut f = flying();
        for _ in 0..400 {
            f.update();
            if f.phase() == Phase::Lost {
                break;
            }
        }
        assert_eq!(f.phase(), Phase::Lost);
        assert!(f.bird_y + BIRD_R > H);
    }

    #[test]
    fn tilt_is_clamped() {
        let mut f = flying();
        f.bird_vy = 50.0;
        f.update();
        assert_eq!(f.angle, 1.2);
        f.bird_vy = -50.0;
        f.bird_y = 300.0;
        f.update();
        assert_eq!(f.angle, -0.5);
    }

    #[test]
    fn first_pipe_after_warmup() {
        let mut f = flying();
        for _ in 0..WARMUP {
            f.update();
            // Keep the bird centred.
            f.bird_y = H / 2.0;
            f.bird_vy = 0.0;
        }
        assert!(f.pipes().is_empty());
        f.update();
        assert_eq!(f.pipes().len(), 1);
        let p = f.pipes()[0];
        assert_eq!(p.gap, GAP_BASE);
        assert!(p.gap_y >= 80.0 && p.gap_y <= H - 80.0);
    }

    #[test]
    fn gap_shrinks_to_a_floor() {
        assert_eq!(gap_for(0), 130.0);
        assert_eq!(gap_for(10), 110.0);
        assert_eq!(gap_for(50), GAP_MIN);
    }

    #[test]
    fn pipe_scores_once_and_speeds_up() {
        let mut f = flying();
        f.frame = 1;
        f.pipes.push(Pipe {
            x: BIRD_X - PIPE_W + 1.0,
            gap_y: H / 2.0,
            gap: 400.0,
            scored: false,
        });
        f.bird_y = H / 2.0;
        f.bird_vy = 0.0;
        f.update();
        assert_eq!(f.score(), 1);
        assert!((f.pipe_speed() - (PIPE_SPEED_BASE + 0.06)).abs() < 1e-6);
        f.bird_y = H / 2.0;
        f.bird_vy = 0.0;
        f.update();
        assert_eq!(f.score(), 1);
    }

    #[test]
    fn pipe_lip_kills() {
        let mut f = flying();
        f.frame = 1;
        f.pipes.push(Pipe {
            x: BIRD_X,
            gap_y: 100.0,
            gap: 100.0,
            scored: false,
        });
        f.bird_y = 300.0;
        f.bird_vy = 0.0;
        f.update();
        assert_eq!(f.phase(), Phase::Lost);
    }

    #[test]
    fn flying_through_the_gap_is_safe() {
        let mut f = flying();
        f.frame = 1;
        f.pipes.push(Pipe {
            x: BIRD_X,
            gap_y: 240.0,
            gap: 120.0,
            scored: false,
        });
        f.bird_y = 240.0;
        f.bird_vy = 0.0;
        f.update();
        assert_eq!(f.phase(), Phase::Playing);
    }

    #[test]
    fn flap_after_death_restarts() {
        let mut f = flying();
        f.score = 9;
        f.bird_y = -100.0;
        f.update();
        assert_eq!(f.phase(), Phase::Lost);
        assert_eq!(f.result().map(|r| r.value), Some(9));
        f.flap();
        assert_eq!(f.phase(), Phase::Idle);
        assert_eq!(f.best, 9);
    }
}
