use rand::Rng;
use ratatui::style::Color;

use crate::canvas::Canvas;
use crate::games::{game_rng, raise_best, Game, GameId, GameRng, Phase, RunResult, Stat};
use crate::input::{Dir, Input};
use crate::scores::ScoreKey;

const W: f32 = 600.0;
const H: f32 = 160.0;
const GROUND_Y: f32 = 128.0;
const DINO_W: f32 = 26.0;
const DINO_H: f32 = 34.0;
const DINO_X: f32 = 54.0;
const REST_Y: f32 = GROUND_Y - DINO_H;
const OBS_W: f32 = 16.0;
const OBS_MIN: f32 = 30.0;
const OBS_MAX: f32 = 56.0;
const GRAVITY: f32 = 0.6;
const JUMP_VELOCITY: f32 = -13.5;
const START_SPEED: f32 = 4.5;
const MAX_SPEED: f32 = 16.0;
const FIRST_OBSTACLE: f32 = 90.0;

const BODY: Color = Color::Rgb(155, 106, 245);
const DEAD: Color = Color::Rgb(239, 68, 68);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub height: f32,
}

pub struct DinoRun {
    dino_y: f32,
    dino_vy: f32,
    obstacles: Vec<Obstacle>,
    score: u32,
    best: u32,
    speed: f32,
    distance: u64,
    next_obstacle: f32, // steps until the next spawn
    leg_frame: bool,
    phase: Phase,
    rng: GameRng,
}

impl DinoRun {
    pub fn new(best: u32) -> Self {
        Self::with_rng(best, game_rng(None))
    }

    pub fn with_rng(best: u32, rng: GameRng) -> Self {
        Self {
            dino_y: REST_Y,
            dino_vy: 0.0,
            obstacles: Vec::new(),
            score: 0,
            best,
            speed: START_SPEED,
            distance: 0,
            next_obstacle: FIRST_OBSTACLE,
            leg_frame: false,
            phase: Phase::Idle,
            rng,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn grounded(&self) -> bool {
        self.dino_y >= REST_Y
    }

    /// Jump when grounded. Also starts a new run and restarts a lost one.
    pub fn jump(&mut self) {
        match self.phase {
            Phase::Lost | Phase::Won => {
                self.reset();
                return;
            }
            Phase::Idle => self.phase = Phase::Playing,
            Phase::Playing => {}
        }
        if self.grounded() {
            self.dino_vy = JUMP_VELOCITY;
        }
    }

    fn spawn_obstacle(&mut self) {
        let height = OBS_MIN + self.rng.gen::<f32>() * (OBS_MAX - OBS_MIN);
        self.obstacles.push(Obstacle { x: W + 10.0, height });
        self.next_obstacle = 70.0 + self.rng.gen::<f32>() * 70.0 - self.speed * 1.5;
    }

    /// Shrunk boxes on both sides so grazes don't count.
    fn hits(&self, obs: &Obstacle) -> bool {
        DINO_X + DINO_W - 5.0 > obs.x + 3.0
            && DINO_X + 5.0 < obs.x + OBS_W - 3.0
            && self.dino_y + DINO_H - 3.0 > GROUND_Y - obs.height
    }

    fn draw_dino(&self, canvas: &mut Canvas) {
        let (x, y) = (DINO_X, self.dino_y);
        let dead = self.phase == Phase::Lost;
        let body = if dead { DEAD } else { BODY };

        canvas.rect(x, y + 10.0, DINO_W, DINO_H - 16.0, body);
        canvas.rect(x + 4.0, y, DINO_W - 2.0, 16.0, body);
        canvas.rect(x + DINO_W - 6.0, y + 3.0, 4.0, 4.0, Color::Rgb(10, 10, 15));
        canvas.rect(x - 6.0, y + 14.0, 8.0, 6.0, body);

        // Legs alternate while running, tuck while airborne
        let (front, back) = if !self.grounded() || dead {
            (6.0, 6.0)
        } else if self.leg_frame {
            (4.0, 8.0)
        } else {
            (8.0, 4.0)
        };
        canvas.rect(x + 2.0, y + DINO_H - front, 8.0, front, body);
        canvas.rect(x + 14.0, y + DINO_H - back, 8.0, back, body);
    }
}

impl Game for DinoRun {
    fn id(&self) -> GameId {
        GameId::Dino
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn surface(&self) -> (f32, f32) {
        (W, H)
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Primary | Input::Move(Dir::Up) | Input::Click { .. } => self.jump(),
            _ => {}
        }
    }

    fn update(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }

        self.dino_vy += GRAVITY;
        self.dino_y += self.dino_vy;
        if self.dino_y >= REST_Y {
            self.dino_y = REST_Y;
            self.dino_vy = 0.0;
        }

        // Distance scoring
        self.distance += 1;
        if self.distance % 5 == 0 {
            self.score += 1;
            if self.score % 60 == 0 {
                self.speed = (self.speed + 0.5).min(MAX_SPEED);
            }
        }

        self.next_obstacle -= 1.0;
        if self.next_obstacle <= 0.0 {
            self.spawn_obstacle();
        }
        for obs in &mut self.obstacles {
            obs.x -= self.speed;
        }
        self.obstacles.retain(|o| o.x + OBS_W > 0.0);

        if self.grounded() && self.distance % 9 == 0 {
            self.leg_frame = !self.leg_frame;
        }

        if self.obstacles.iter().any(|o| self.hits(o)) {
            self.phase = Phase::Lost;
            if raise_best(ScoreKey::Dino, &mut self.best, self.score) {
                tracing::info!("dino: new best {}", self.score);
            }
        }
    }

    fn render(&self, canvas: &mut Canvas) {
        canvas.clear(Color::Rgb(10, 10, 15));
        canvas.rect(0.0, H * 0.5, W, H * 0.5, Color::Rgb(18, 18, 43));
        canvas.rect(0.0, GROUND_Y, W, 4.0, Color::Rgb(60, 36, 110));

        // Ground speckle scrolls with distance
        let scroll = (self.distance as f32 * self.speed) % 40.0;
        let mut gx = -scroll;
        while gx < W {
            canvas.rect(gx, GROUND_Y + 10.0, 6.0, 2.0, Color::Rgb(45, 40, 70));
            gx += 40.0;
        }

        for obs in &self.obstacles {
            let top = GROUND_Y - obs.height;
            canvas.rect(obs.x, top, OBS_W, obs.height, Color::Rgb(5, 150, 105));
            canvas.rect(obs.x - 7.0, top + 10.0, 9.0, obs.height * 0.55, Color::Rgb(16, 185, 129));
            canvas.rect(obs.x + OBS_W - 2.0, top + obs.height * 0.2, 9.0, obs.height * 0.5, Color::Rgb(16, 185, 129));
        }

        self.draw_dino(canvas);

        canvas.text(W - 90.0, 12.0, format!("{:05}", self.score), Color::Rgb(167, 139, 250));

        match self.phase {
            Phase::Idle => canvas.banner("DINO RUNNER", Color::Rgb(167, 139, 250), "Space / Click to start"),
            Phase::Lost => canvas.banner(
                "Game Over!",
                Color::Rgb(241, 245, 249),
                &format!("Score {} · Space to restart", self.score),
            ),
            _ => {}
        }
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = DinoRun::with_rng(self.best, rng);
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn result(&self) -> Option<RunResult> {
        (self.phase == Phase::Lost).then_some(RunResult {
            key: ScoreKey::Dino,
            value: self.score,
        })
    }

    fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new("Score", self.score),
            Stat::new("Speed", format!("{:.1}", self.speed)),
            Stat::best(ScoreKey::Dino, self.best),
        ]
    }

    fn help(&self) -> &'static str {
        "Space/↑/Click Jump │ P Pause │ R Restart"
    }
}
