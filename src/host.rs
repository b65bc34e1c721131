//! Launch host: owns at most one mounted engine, steps it on a fixed
//! timestep, routes inputs to it and hands finished runs to the score store.

use std::time::Duration;

use crate::canvas::Canvas;
use crate::clock::FixedTimestep;
use crate::games::{self, Game, GameId, Phase};
use crate::input::Input;
use crate::scores::ScoreStore;

struct Session {
    game: Box<dyn Game>,
    timestep: FixedTimestep,
    paused: bool,
    last_phase: Phase,
    canvas: Canvas,
}

impl Session {
    fn new(game: Box<dyn Game>) -> Self {
        let (w, h) = game.surface();
        let last_phase = game.phase();
        Self {
            game,
            timestep: FixedTimestep::new(),
            paused: false,
            last_phase,
            canvas: Canvas::new(w, h),
        }
    }
}

#[derive(Default)]
pub struct GameHost {
    session: Option<Session>,
    seed: Option<u64>,
}

impl GameHost {
    pub fn new(seed: Option<u64>) -> Self {
        Self { session: None, seed }
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    pub fn active(&self) -> Option<GameId> {
        self.session.as_ref().map(|s| s.game.id())
    }

    pub fn game(&self) -> Option<&dyn Game> {
        self.session.as_ref().map(|s| s.game.as_ref())
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.paused)
    }

    /// Mount a fresh engine, replacing any open one.
    pub fn mount(&mut self, id: GameId, scores: &mut ScoreStore) {
        self.unmount(scores);
        tracing::info!("mount {}", id.slug());
        self.session = Some(Session::new(games::create(id, scores, self.seed)));
    }

    /// Drop the open engine along with its timers. A finished run is
    /// committed first.
    pub fn unmount(&mut self, scores: &mut ScoreStore) {
        if let Some(mut session) = self.session.take() {
            commit(&mut session, scores);
            tracing::info!(
                "unmount {} (score {})",
                session.game.id().slug(),
                session.game.score()
            );
        }
    }

    /// Run however many fixed steps `elapsed` wall-clock time amounts to.
    /// Returns the number of steps taken.
    pub fn advance(&mut self, elapsed: Duration, scores: &mut ScoreStore) -> u32 {
        let Some(session) = self.session.as_mut() else { return 0 };
        if session.paused {
            return 0;
        }
        let steps = session.timestep.advance(elapsed);
        for _ in 0..steps {
            session.game.update();
        }
        commit(session, scores);
        steps
    }

    pub fn dispatch(&mut self, input: Input, scores: &mut ScoreStore) {
        let Some(session) = self.session.as_mut() else { return };
        let id = session.game.id();
        match input {
            Input::Restart => {
                commit(session, scores);
                session.game.reset();
                session.paused = false;
                session.timestep.reset();
                session.last_phase = session.game.phase();
                tracing::info!("restart {}", id.slug());
            }
            Input::Pause => {
                session.paused = !session.paused;
                tracing::debug!("{} paused: {}", id.slug(), session.paused);
            }
            _ if session.paused => {}
            other => {
                let Some(kind) = other.kind() else { return };
                if id.accepts().contains(&kind) {
                    session.game.handle_input(other);
                    commit(session, scores);
                }
            }
        }
    }

    /// Logical size of the open engine's surface.
    pub fn surface(&self) -> Option<(f32, f32)> {
        self.session.as_ref().map(|s| s.game.surface())
    }

    /// Repaint the open engine and return its draw list.
    pub fn frame(&mut self) -> Option<&Canvas> {
        let session = self.session.as_mut()?;
        session.canvas.begin(session.game.surface());
        session.game.render(&mut session.canvas);
        Some(&session.canvas)
    }
}

/// Offer the engine's result to the store and log phase transitions.
fn commit(session: &mut Session, scores: &mut ScoreStore) {
    let game = &session.game;
    let phase = game.phase();
    if phase != session.last_phase {
        if phase.is_terminal() {
            tracing::info!("{} ended {:?} with {}", game.id().slug(), phase, game.score());
        }
        session.last_phase = phase;
    }
    if let Some(run) = game.result() {
        if scores.submit(run.key, run.value) {
            tracing::info!("new best for {}: {}", run.key.as_str(), run.value);
        }
    }
}
