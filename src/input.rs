//! Platform events normalized into the abstract vocabulary engines consume.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Unit step as (dx, dy), y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Arrow keys / WASD.
    Move(Dir),
    /// Space or Enter: jump, flap, launch, hard drop, reveal/flip at cursor.
    Primary,
    Rotate,
    Hold,
    Flag,
    Restart,
    Pause,
    Select(u8),
    /// Pointer moved or dragged, in surface coordinates.
    Pointer { x: f32, y: f32 },
    /// Left click / tap.
    Click { x: f32, y: f32 },
    /// Right click, the stand-in for long-press.
    AltClick { x: f32, y: f32 },
    /// Press-drag-release along one axis, the stand-in for a touch swipe.
    Swipe(Dir),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Direction,
    Primary,
    Rotate,
    Hold,
    Flag,
    Select,
    Pointer,
    Click,
    AltClick,
    Swipe,
}

impl Input {
    /// Host-level inputs are handled by the launch host, never filtered.
    pub fn kind(&self) -> Option<InputKind> {
        match self {
            Input::Move(_) => Some(InputKind::Direction),
            Input::Primary => Some(InputKind::Primary),
            Input::Rotate => Some(InputKind::Rotate),
            Input::Hold => Some(InputKind::Hold),
            Input::Flag => Some(InputKind::Flag),
            Input::Select(_) => Some(InputKind::Select),
            Input::Pointer { .. } => Some(InputKind::Pointer),
            Input::Click { .. } => Some(InputKind::Click),
            Input::AltClick { .. } => Some(InputKind::AltClick),
            Input::Swipe(_) => Some(InputKind::Swipe),
            Input::Restart | Input::Pause => None,
        }
    }
}

pub fn from_key(key: KeyEvent) -> Option<Input> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    let input = match key.code {
        KeyCode::Up => Input::Move(Dir::Up),
        KeyCode::Down => Input::Move(Dir::Down),
        KeyCode::Left => Input::Move(Dir::Left),
        KeyCode::Right => Input::Move(Dir::Right),
        KeyCode::Char(' ') | KeyCode::Enter => Input::Primary,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Input::Move(Dir::Up),
            's' => Input::Move(Dir::Down),
            'a' => Input::Move(Dir::Left),
            'd' => Input::Move(Dir::Right),
            'x' => Input::Rotate,
            'c' => Input::Hold,
            'f' => Input::Flag,
            'r' => Input::Restart,
            'p' => Input::Pause,
            d @ '1'..='9' => Input::Select(d as u8 - b'0'),
            _ => return None,
        },
        _ => return None,
    };
    Some(input)
}

/// Map a terminal mouse event onto a surface of `surface` logical size drawn
/// into `area`. Events outside the area are dropped.
pub fn from_mouse(mouse: MouseEvent, area: Rect, surface: (f32, f32)) -> Option<Input> {
    let (x, y) = to_surface(mouse.column, mouse.row, area, surface)?;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Input::Click { x, y }),
        MouseEventKind::Down(MouseButton::Right) => Some(Input::AltClick { x, y }),
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
            Some(Input::Pointer { x, y })
        }
        _ => None,
    }
}

/// Minimum travel, in surface units, before a drag counts as a swipe.
pub const SWIPE_MIN: f32 = 12.0;

/// Remembers where the left button went down so the release can be turned
/// into a `Swipe` along the dominant axis.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn track(&mut self, mouse: MouseEvent, area: Rect, surface: (f32, f32)) -> Option<Input> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = to_surface(mouse.column, mouse.row, area, surface);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (sx, sy) = self.start.take()?;
                let (ex, ey) = to_surface(mouse.column, mouse.row, area, surface)?;
                swipe_dir(ex - sx, ey - sy).map(Input::Swipe)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

fn swipe_dir(dx: f32, dy: f32) -> Option<Dir> {
    if dx.abs() < SWIPE_MIN && dy.abs() < SWIPE_MIN {
        return None;
    }
    let dir = if dx.abs() > dy.abs() {
        if dx > 0.0 { Dir::Right } else { Dir::Left }
    } else if dy > 0.0 {
        Dir::Down
    } else {
        Dir::Up
    };
    Some(dir)
}

/// Centre of terminal cell (`column`, `row`) in surface coordinates.
pub fn to_surface(column: u16, row: u16, area: Rect, surface: (f32, f32)) -> Option<(f32, f32)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if column < area.x
        || row < area.y
        || column >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    let (w, h) = surface;
    let x = (column - area.x) as f32 + 0.5;
    let y = (row - area.y) as f32 + 0.5;
    Some((x * w / area.width as f32, y * h / area.height as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_agree() {
        assert_eq!(from_key(key(KeyCode::Up)), Some(Input::Move(Dir::Up)));
        assert_eq!(from_key(key(KeyCode::Char('W'))), Some(Input::Move(Dir::Up)));
        assert_eq!(from_key(key(KeyCode::Char('a'))), Some(Input::Move(Dir::Left)));
        assert_eq!(from_key(key(KeyCode::Enter)), Some(Input::Primary));
        assert_eq!(from_key(key(KeyCode::Char('2'))), Some(Input::Select(2)));
        assert_eq!(from_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn control_chords_are_not_game_input() {
        let ev = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        };
        assert_eq!(from_key(ev), None);
    }

    #[test]
    fn mouse_maps_to_surface_coordinates() {
        let area = Rect::new(10, 5, 20, 10);
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            from_mouse(mouse, area, (200.0, 100.0)),
            Some(Input::Click { x: 5.0, y: 5.0 })
        );

        let outside = MouseEvent { column: 30, ..mouse };
        assert_eq!(from_mouse(outside, area, (200.0, 100.0)), None);
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn drag_release_becomes_a_swipe() {
        // 1 cell = 10 x 10 surface units
        let area = Rect::new(0, 0, 20, 10);
        let surface = (200.0, 100.0);
        let mut swipe = SwipeTracker::default();

        assert_eq!(swipe.track(mouse(MouseEventKind::Down(MouseButton::Left), 15, 5), area, surface), None);
        assert_eq!(
            swipe.track(mouse(MouseEventKind::Up(MouseButton::Left), 10, 6), area, surface),
            Some(Input::Swipe(Dir::Left))
        );

        swipe.track(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1), area, surface);
        assert_eq!(
            swipe.track(mouse(MouseEventKind::Up(MouseButton::Left), 6, 8), area, surface),
            Some(Input::Swipe(Dir::Down))
        );
    }

    #[test]
    fn short_or_unanchored_releases_are_not_swipes() {
        let area = Rect::new(0, 0, 20, 10);
        let surface = (200.0, 100.0);
        let mut swipe = SwipeTracker::default();

        // Release without a press on the surface
        assert_eq!(swipe.track(mouse(MouseEventKind::Up(MouseButton::Left), 2, 2), area, surface), None);

        // A tap: same cell, below the threshold
        swipe.track(mouse(MouseEventKind::Down(MouseButton::Left), 4, 4), area, surface);
        assert_eq!(swipe.track(mouse(MouseEventKind::Up(MouseButton::Left), 4, 4), area, surface), None);

        swipe.track(mouse(MouseEventKind::Down(MouseButton::Left), 4, 4), area, surface);
        swipe.cancel();
        assert_eq!(swipe.track(mouse(MouseEventKind::Up(MouseButton::Left), 15, 4), area, surface), None);
    }

    #[test]
    fn opposite_is_an_involution() {
        for d in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }
}
