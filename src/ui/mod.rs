pub mod home;
pub mod surface;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::games::Stat;

use surface::Surface;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    app.card_areas = home::render_home(frame, area, app.selected_game, &app.scores);

    if app.host.is_mounted() {
        render_modal(frame, area, app);
    } else {
        app.surface_area = None;
    }
}

fn stats_line(stats: &[Stat]) -> Line<'static> {
    let mut spans = Vec::with_capacity(stats.len() * 3);
    for (i, stat) in stats.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  │  ", Style::default().fg(Color::Rgb(60, 60, 80))));
        }
        spans.push(Span::styled(format!("{} ", stat.label), Style::default().fg(Color::Rgb(120, 120, 140))));
        spans.push(Span::styled(
            stat.value.clone(),
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn help_line(controls: &str) -> String {
    format!("{} │ Esc Close", controls)
}

/// The launch host's overlay: title, status line, game surface, help line.
fn render_modal(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(game) = app.host.game() else { return };
    let id = game.id();
    let stats = stats_line(&game.stats());
    let help = help_line(game.help());
    let surface_size = game.surface();
    let paused = app.host.is_paused();

    let modal_w = (area.width * 9 / 10).max(20).min(area.width);
    let modal_h = (area.height * 9 / 10).max(10).min(area.height);
    let modal = Rect::new(
        area.x + (area.width - modal_w) / 2,
        area.y + (area.height - modal_h) / 2,
        modal_w,
        modal_h,
    );
    frame.render_widget(Clear, modal);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(id.color()))
        .title(format!(" {} {} ", id.icon(), id.title()))
        .title_style(Style::default().fg(id.color()).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Stats
            Constraint::Min(0),    // Surface
            Constraint::Length(1), // Help
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(stats).alignment(Alignment::Center), rows[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::Rgb(100, 100, 130))))
            .alignment(Alignment::Center),
        rows[2],
    );

    let target = surface::fit(rows[1], surface_size);
    if target.area() == 0 {
        // Nowhere to draw: skip the frame and stop mapping mouse input.
        app.surface_area = None;
        return;
    }
    app.surface_area = Some(target);
    if let Some(canvas) = app.host.frame() {
        frame.render_widget(Surface::new(canvas), target);
    }

    if paused {
        render_pause(frame, target);
    }
}

fn render_pause(frame: &mut Frame, area: Rect) {
    let w = 26u16.min(area.width);
    let h = 3u16.min(area.height);
    let x = area.x + (area.width - w) / 2;
    let y = area.y + (area.height - h) / 2;
    let overlay = Rect::new(x, y, w, h);
    frame.render_widget(Clear, overlay);
    let p = Paragraph::new(Line::from(vec![
        Span::styled("⏸ PAUSED", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" · P to resume", Style::default().fg(Color::Rgb(140, 140, 160))),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
            .style(Style::default().bg(Color::Rgb(15, 15, 25))),
    );
    frame.render_widget(p, overlay);
}
