use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEvent};

pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Polls the terminal on a background thread. A `Tick` is sent whenever a
/// poll interval passes with nothing to read.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(fps: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(1000 / fps.max(1) as u64);

        thread::spawn(move || loop {
            let next = if event::poll(tick_rate).unwrap_or(false) {
                match event::read().ok().and_then(translate) {
                    Some(next) => next,
                    None => continue,
                }
            } else {
                Event::Tick
            };
            if tx.send(next).is_err() {
                return;
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> io::Result<Event> {
        self.rx.recv().map_err(io::Error::other)
    }
}

/// Keep what the app reacts to. A held key only counts once: auto-repeat and
/// release events are dropped (terminals report them when keyboard
/// enhancement is enabled).
fn translate(event: event::Event) -> Option<Event> {
    match event {
        event::Event::Key(key) => match key.kind {
            KeyEventKind::Press => Some(Event::Key(key)),
            KeyEventKind::Repeat | KeyEventKind::Release => None,
        },
        event::Event::Mouse(mouse) => Some(Event::Mouse(mouse)),
        event::Event::Resize(..) => Some(Event::Resize),
        _ => None,
    }
}
