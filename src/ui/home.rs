use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::GameId;
use crate::scores::{Ranking, ScoreKey, ScoreStore};

const BANNER: &str = r#"
 ╔══════════════════════════════════════════════════════╗
 ║  █▀▄▀█ █ █▄ █ █   █▀▀ ▄▀█ █▀▄ █▀▀                  ║
 ║  █ ▀ █ █ █ ▀█ █   █▄▄ █▀█ █▄▀ ██▄   eight in one   ║
 ╚══════════════════════════════════════════════════════╝"#;

/// Best value with its unit, or a dash when nothing is recorded yet.
pub fn best_label(key: ScoreKey, value: u32) -> String {
    if !key.is_set(value) {
        return "—".to_string();
    }
    match (key, key.ranking()) {
        (ScoreKey::Memory, _) => format!("{} moves", value),
        (_, Ranking::LowerIsBetter) => format!("{}s", value),
        (_, Ranking::HigherIsBetter) => value.to_string(),
    }
}

fn card_best(id: GameId, scores: &ScoreStore) -> String {
    if id == GameId::Minesweeper {
        let beginner = scores.best(ScoreKey::MinesBeginner);
        let intermediate = scores.best(ScoreKey::MinesIntermediate);
        return format!(
            "B {} · I {}",
            best_label(ScoreKey::MinesBeginner, beginner),
            best_label(ScoreKey::MinesIntermediate, intermediate)
        );
    }
    let key = id.headline_key();
    best_label(key, scores.best(key))
}

fn render_game_card(frame: &mut Frame, area: Rect, id: GameId, number: usize, best: &str, selected: bool) {
    let color = id.color();
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { color };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let name_color = if selected { Color::Rgb(255, 255, 255) } else { color };
    let desc_color = if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(120, 120, 140) };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{}] ", number), Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} ", id.icon())),
        Span::styled(id.title(), Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
    ])];
    for desc_line in id.description().split('\n') {
        lines.push(Line::from(Span::styled(desc_line, Style::default().fg(desc_color))));
    }
    lines.push(Line::from(vec![
        Span::styled("Best ", Style::default().fg(Color::Rgb(100, 100, 130))),
        Span::styled(best.to_string(), Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD)),
    ]));
    if selected {
        lines.push(Line::from(Span::styled(
            "▶ Enter to play",
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        )));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

fn key_line(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<17}", keys), Style::default().fg(Color::Rgb(80, 200, 255))),
        Span::styled(what, Style::default().fg(Color::Rgb(140, 140, 140))),
    ])
}

/// Draws the home screen and returns the card rectangles in `GameId::ALL`
/// order so clicks can be matched against them.
pub fn render_home(frame: &mut Frame, area: Rect, selected: usize, scores: &ScoreStore) -> Vec<Rect> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Banner
            Constraint::Length(1), // Subtitle
            Constraint::Min(12),   // Game cards
            Constraint::Length(9), // Controls
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let banner = Paragraph::new(BANNER.trim_start_matches('\n'))
        .style(Style::default().fg(Color::Rgb(167, 139, 250)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let subtitle = Paragraph::new(Line::from(Span::styled(
        "  ⚡ Pick a game, beat your best ⚡  ",
        Style::default()
            .fg(Color::Rgb(255, 220, 80))
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(subtitle, chunks[1]);

    let games_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" 🎮 Games · ↑↓←→ Select, Enter to Play ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    let games_inner = games_block.inner(chunks[2]);
    frame.render_widget(games_block, chunks[2]);

    let tile_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(games_inner);

    let mut cards = Vec::with_capacity(GameId::ALL.len());
    for row in tile_rows.iter() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(*row);
        cards.extend(cols.iter().copied());
    }

    for (i, (id, rect)) in GameId::ALL.iter().zip(&cards).enumerate() {
        let best = card_best(*id, scores);
        render_game_card(frame, *rect, *id, i + 1, &best, selected == i);
    }

    let ctrl_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[3]);

    let controls = Paragraph::new(vec![
        key_line("1-8", "Launch game"),
        key_line("↑ ↓ ← → / Click", "Select / launch"),
        key_line("Enter", "Play selected"),
        key_line("Esc", "Close game"),
        key_line("R", "Restart game"),
        key_line("P", "Pause / Unpause"),
        key_line("q / Ctrl+C", "Quit"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Controls ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, ctrl_cols[0]);

    let id = GameId::ALL[selected];
    let about = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("  {} ", id.icon())),
            Span::styled(id.title(), Style::default().fg(id.color()).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            format!("  {}", id.description().replace('\n', " ")),
            Style::default().fg(Color::Rgb(100, 100, 120)),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Best: {}", card_best(id, scores)),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(50, 100, 140)))
            .title(format!(" {} ", id.title()))
            .title_style(Style::default().fg(id.color()).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(about, ctrl_cols[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("  🦀 ", Style::default().fg(Color::Rgb(255, 100, 50))),
        Span::styled(concat!("v", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("q", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" Quit", Style::default().fg(Color::Rgb(100, 100, 130))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[4]);

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::UNSET_LOWER_BEST;

    #[test]
    fn best_labels_carry_units() {
        assert_eq!(best_label(ScoreKey::Snake, 0), "—");
        assert_eq!(best_label(ScoreKey::Snake, 12), "12");
        assert_eq!(best_label(ScoreKey::Memory, UNSET_LOWER_BEST), "—");
        assert_eq!(best_label(ScoreKey::Memory, 9), "9 moves");
        assert_eq!(best_label(ScoreKey::MinesIntermediate, 41), "41s");
    }

    #[test]
    fn minesweeper_card_shows_both_boards() {
        let mut scores = ScoreStore::in_memory();
        scores.submit(ScoreKey::MinesBeginner, 33);
        assert_eq!(card_best(GameId::Minesweeper, &scores), "B 33s · I —");
    }
}
