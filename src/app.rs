use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::games::GameId;
use crate::host::GameHost;
use crate::input::{self, SwipeTracker};
use crate::scores::ScoreStore;

const GRID_COLS: usize = 4;

pub struct App {
    pub should_quit: bool,
    pub selected_game: usize, // index into GameId::ALL, 4 per row
    pub host: GameHost,
    pub scores: ScoreStore,
    /// Where the game surface was last drawn. Mouse input maps against it.
    pub surface_area: Option<Rect>,
    /// Home screen card rectangles from the last draw, in GameId::ALL order.
    pub card_areas: Vec<Rect>,
    swipe: SwipeTracker,
}

impl App {
    pub fn new(scores: ScoreStore, seed: Option<u64>) -> Self {
        Self {
            should_quit: false,
            selected_game: 0,
            host: GameHost::new(seed),
            scores,
            surface_area: None,
            card_areas: Vec::new(),
            swipe: SwipeTracker::default(),
        }
    }

    pub fn selected(&self) -> GameId {
        GameId::ALL[self.selected_game]
    }

    pub fn launch(&mut self, id: GameId) {
        if let Some(idx) = GameId::ALL.iter().position(|&g| g == id) {
            self.selected_game = idx;
        }
        self.swipe.cancel();
        self.host.mount(id, &mut self.scores);
    }

    pub fn close_game(&mut self) {
        self.host.unmount(&mut self.scores);
        self.swipe.cancel();
        self.surface_area = None;
    }

    pub fn quit(&mut self) {
        self.close_game();
        self.should_quit = true;
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.host.advance(elapsed, &mut self.scores);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        if self.host.is_mounted() {
            if key.code == KeyCode::Esc {
                self.close_game();
            } else if let Some(input) = input::from_key(key) {
                self.host.dispatch(input, &mut self.scores);
            }
            return;
        }

        let count = GameId::ALL.len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Right => self.selected_game = (self.selected_game + 1) % count,
            KeyCode::Left => self.selected_game = (self.selected_game + count - 1) % count,
            KeyCode::Up | KeyCode::Down => {
                self.selected_game = (self.selected_game + GRID_COLS) % count;
            }
            KeyCode::Enter => self.launch(self.selected()),
            KeyCode::Char(c @ '1'..='8') => {
                let idx = c as usize - '1' as usize;
                self.launch(GameId::ALL[idx]);
            }
            _ => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.host.is_mounted() {
            let (Some(area), Some(surface)) = (self.surface_area, self.host.surface()) else {
                return;
            };
            if let Some(input) = input::from_mouse(mouse, area, surface) {
                self.host.dispatch(input, &mut self.scores);
            }
            if let Some(swipe) = self.swipe.track(mouse, area, surface) {
                self.host.dispatch(swipe, &mut self.scores);
            }
            return;
        }

        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let at = Position::new(mouse.column, mouse.row);
        if let Some(idx) = self.card_areas.iter().position(|r| r.contains(at)) {
            self.launch(GameId::ALL[idx]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::Phase;
    use crossterm::event::KeyEventState;

    fn app() -> App {
        App::new(ScoreStore::in_memory(), Some(1))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn arrows_walk_the_grid() {
        let mut app = app();
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected(), GameId::Minesweeper);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected(), GameId::Tetris);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected(), GameId::Flappy);
    }

    #[test]
    fn digits_and_enter_launch() {
        let mut app = app();
        press(&mut app, KeyCode::Char('6'));
        assert_eq!(app.host.active(), Some(GameId::Game2048));
        press(&mut app, KeyCode::Esc);
        assert!(!app.host.is_mounted());
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.host.active(), Some(GameId::Breakout));
    }

    #[test]
    fn q_only_quits_from_home() {
        let mut app = app();
        app.launch(GameId::Snake);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_quits_from_a_game() {
        let mut app = app();
        app.launch(GameId::Tetris);
        app.on_key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert!(app.should_quit);
        assert!(!app.host.is_mounted());
    }

    #[test]
    fn keys_reach_the_mounted_game() {
        let mut app = app();
        app.launch(GameId::Dino);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.host.game().map(|g| g.phase()), Some(Phase::Playing));
    }

    #[test]
    fn clicking_a_card_launches_it() {
        let mut app = app();
        app.card_areas = GameId::ALL
            .iter()
            .enumerate()
            .map(|(i, _)| Rect::new((i % 4) as u16 * 10, (i / 4) as u16 * 5, 10, 5))
            .collect();
        app.on_mouse(click(15, 7));
        assert_eq!(app.host.active(), Some(GameId::Game2048));
    }

    #[test]
    fn mouse_is_ignored_until_the_surface_is_drawn() {
        let mut app = app();
        app.launch(GameId::Memory);
        app.on_mouse(click(3, 3));
        assert_eq!(app.host.game().map(|g| g.phase()), Some(Phase::Idle));
        app.surface_area = Some(Rect::new(0, 0, 36, 18));
        app.on_mouse(click(3, 3));
        assert_eq!(app.host.game().map(|g| g.phase()), Some(Phase::Playing));
    }

    #[test]
    fn drag_across_the_surface_steers_snake() {
        let mut app = app();
        app.launch(GameId::Snake);
        app.surface_area = Some(Rect::new(0, 0, 40, 20));
        app.on_mouse(click(5, 2));
        app.on_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 5, 8));
        assert_eq!(app.host.game().map(|g| g.phase()), Some(Phase::Idle));
        app.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 5, 15));
        assert_eq!(app.host.game().map(|g| g.phase()), Some(Phase::Playing));
    }
}
