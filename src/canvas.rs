//! Drawing surface handed to engines each frame.
//!
//! Engines describe a frame as a list of [`DrawCommand`]s in their own logical
//! pixel space. Nothing here knows about terminals; `ui::surface` rasterizes.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Paint the whole surface.
    Clear(Color),
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        color: Color,
        bold: bool,
        align: Align,
    },
    /// Translucent wash over everything drawn so far.
    Veil { color: Color, alpha: f32 },
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::with_capacity(256),
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Drop the previous frame and adopt a (possibly new) size.
    pub fn begin(&mut self, size: (f32, f32)) {
        self.width = size.0;
        self.height = size.1;
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w > 0.0 && h > 0.0 {
            self.commands.push(DrawCommand::Rect { x, y, w, h, color });
        }
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        if r > 0.0 {
            self.commands.push(DrawCommand::Circle { cx, cy, r, color });
        }
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, color: Color) {
        self.push_text(x, y, text.into(), color, false, Align::Left);
    }

    pub fn text_centered(&mut self, y: f32, text: impl Into<String>, color: Color, bold: bool) {
        let x = self.width / 2.0;
        self.push_text(x, y, text.into(), color, bold, Align::Center);
    }

    pub fn label(&mut self, cx: f32, cy: f32, text: impl Into<String>, color: Color) {
        self.push_text(cx, cy, text.into(), color, true, Align::Center);
    }

    pub fn veil(&mut self, color: Color, alpha: f32) {
        self.commands.push(DrawCommand::Veil {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        });
    }

    /// Dimmed overlay with a headline and a subline, used by every engine for
    /// start and terminal screens.
    pub fn banner(&mut self, title: &str, title_color: Color, subtitle: &str) {
        let mid = self.height / 2.0;
        self.veil(Color::Rgb(0, 0, 0), 0.6);
        self.text_centered(mid - self.height * 0.06, title, title_color, true);
        if !subtitle.is_empty() {
            self.text_centered(mid + self.height * 0.06, subtitle, Color::Rgb(167, 139, 250), false);
        }
    }

    fn push_text(&mut self, x: f32, y: f32, text: String, color: Color, bold: bool, align: Align) {
        if !text.is_empty() {
            self.commands.push(DrawCommand::Text {
                x,
                y,
                text,
                color,
                bold,
                align,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut c = Canvas::new(100.0, 50.0);
        c.rect(0.0, 0.0, 0.0, 10.0, Color::Red);
        c.circle(5.0, 5.0, 0.0, Color::Red);
        c.text(0.0, 0.0, "", Color::Red);
        assert!(c.commands().is_empty());
    }

    #[test]
    fn begin_starts_a_fresh_frame() {
        let mut c = Canvas::new(100.0, 50.0);
        c.clear(Color::Black);
        c.begin((40.0, 40.0));
        assert!(c.commands().is_empty());
        assert_eq!(c.size(), (40.0, 40.0));
    }
}
