//! Rasterizes a [`Canvas`] into terminal cells. Each cell holds two logical
//! pixel rows drawn with an upper half block: the top pixel is the
//! foreground, the bottom pixel the background.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::canvas::{Align, Canvas, DrawCommand};

type Rgb = (u8, u8, u8);

const BACKDROP: Rgb = (10, 10, 20);

/// Largest rectangle inside `area` that keeps the surface's aspect ratio,
/// counting a terminal cell as one pixel wide and two pixels tall.
pub fn fit(area: Rect, surface: (f32, f32)) -> Rect {
    let (w, h) = surface;
    if area.width == 0 || area.height == 0 || w <= 0.0 || h <= 0.0 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let scale = (area.width as f32 / w).min(area.height as f32 * 2.0 / h);
    let width = ((w * scale).round() as u16).clamp(1, area.width);
    let height = ((h * scale / 2.0).round() as u16).clamp(1, area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn rgb(color: Color) -> Rgb {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::White => (255, 255, 255),
        Color::Red | Color::LightRed => (220, 50, 50),
        Color::Green | Color::LightGreen => (60, 200, 90),
        Color::Yellow | Color::LightYellow => (240, 200, 60),
        Color::Blue | Color::LightBlue => (70, 120, 230),
        Color::Magenta | Color::LightMagenta => (200, 90, 200),
        Color::Cyan | Color::LightCyan => (60, 200, 220),
        Color::Gray | Color::DarkGray => (128, 128, 128),
        _ => BACKDROP,
    }
}

fn blend(under: Rgb, over: Rgb, alpha: f32) -> Rgb {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * alpha).round() as u8;
    (mix(under.0, over.0), mix(under.1, over.1), mix(under.2, over.2))
}

struct Label {
    col: i32,
    row: i32,
    text: String,
    color: Rgb,
    bold: bool,
}

pub struct Surface<'a> {
    canvas: &'a Canvas,
}

impl<'a> Surface<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        Self { canvas }
    }
}

/// Pixel grid plus the text placed on top of it, in terminal cells.
struct Raster {
    cols: usize,
    rows: usize,
    sx: f32,
    sy: f32,
    pixels: Vec<Rgb>,
    labels: Vec<Label>,
}

impl Raster {
    fn new(area: Rect, size: (f32, f32)) -> Self {
        let cols = area.width as usize;
        let rows = area.height as usize * 2;
        Self {
            cols,
            rows,
            sx: size.0 / cols as f32,
            sy: size.1 / rows as f32,
            pixels: vec![BACKDROP; cols * rows],
            labels: Vec::new(),
        }
    }

    /// Pixel span covering `[from, to)` in logical units, at least one wide.
    fn span(from: f32, to: f32, scale: f32, limit: usize) -> (usize, usize) {
        let a = (from / scale).round().max(0.0);
        let b = (to / scale).round().max(a + 1.0);
        (a.min(limit as f32) as usize, b.min(limit as f32) as usize)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if x + w <= 0.0 || y + h <= 0.0 {
            return;
        }
        let (c0, c1) = Self::span(x, x + w, self.sx, self.cols);
        let (r0, r1) = Self::span(y, y + h, self.sy, self.rows);
        for r in r0..r1 {
            self.pixels[r * self.cols + c0..r * self.cols + c1].fill(color);
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        let (c0, c1) = Self::span(cx - radius, cx + radius, self.sx, self.cols);
        let (r0, r1) = Self::span(cy - radius, cy + radius, self.sy, self.rows);
        let reach = radius + self.sx.max(self.sy) * 0.35;
        for r in r0..r1 {
            for c in c0..c1 {
                let px = (c as f32 + 0.5) * self.sx - cx;
                let py = (r as f32 + 0.5) * self.sy - cy;
                if px * px + py * py <= reach * reach {
                    self.pixels[r * self.cols + c] = color;
                }
            }
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear(color) => self.pixels.fill(rgb(*color)),
            DrawCommand::Rect { x, y, w, h, color } => self.fill_rect(*x, *y, *w, *h, rgb(*color)),
            DrawCommand::Circle { cx, cy, r, color } => self.fill_circle(*cx, *cy, *r, rgb(*color)),
            DrawCommand::Text {
                x,
                y,
                text,
                color,
                bold,
                align,
            } => {
                let width = text.chars().count() as i32;
                let mut col = (x / self.sx).floor() as i32;
                if *align == Align::Center {
                    col -= width / 2;
                }
                self.labels.push(Label {
                    col,
                    row: (y / (self.sy * 2.0)).floor() as i32,
                    text: text.clone(),
                    color: rgb(*color),
                    bold: *bold,
                });
            }
            DrawCommand::Veil { color, alpha } => {
                let over = rgb(*color);
                for px in &mut self.pixels {
                    *px = blend(*px, over, *alpha);
                }
                for label in &mut self.labels {
                    label.color = blend(label.color, over, *alpha);
                }
            }
        }
    }

    fn pixel(&self, col: usize, row: usize) -> Rgb {
        self.pixels[row * self.cols + col]
    }
}

impl Widget for Surface<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut raster = Raster::new(area, self.canvas.size());
        for command in self.canvas.commands() {
            raster.draw(command);
        }

        for row in 0..area.height {
            for col in 0..area.width {
                let (tr, tg, tb) = raster.pixel(col as usize, row as usize * 2);
                let (br, bg, bb) = raster.pixel(col as usize, row as usize * 2 + 1);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▀")
                        .set_fg(Color::Rgb(tr, tg, tb))
                        .set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }

        for label in &raster.labels {
            if label.row < 0 || label.row >= area.height as i32 {
                continue;
            }
            let skip = (-label.col).max(0) as usize;
            let col = label.col.max(0) as u16;
            if col >= area.width {
                continue;
            }
            let text: String = label.text.chars().skip(skip).collect();
            let (r, g, b) = label.color;
            let mut style = Style::default().fg(Color::Rgb(r, g, b));
            if label.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            buf.set_stringn(
                area.x + col,
                area.y + label.row as u16,
                text,
                (area.width - col) as usize,
                style,
            );
        }
    }
}
