//! Poster overlay: title, rating and the full-size image link.

use crate::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::render::centered_rect;

pub fn render(f: &mut Frame, app: &App) {
    let snapshot = app.controller.snapshot();
    let Some(movie) = snapshot.selected_poster else {
        return;
    };

    let overlay = centered_rect(70, 50, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let link = movie
        .poster_full
        .as_deref()
        .or(movie.poster.as_deref())
        .unwrap_or("No poster available");

    let mut lines = vec![
        Line::from(Span::styled(
            movie.title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Rating {:.1}", movie.vote_average),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(Span::styled(
            link.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        )),
    ];
    if let Some(backdrop) = &movie.backdrop {
        lines.push(Line::from(Span::styled(
            format!("Backdrop: {}", backdrop),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(o) Open in browser  (Esc) Close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Poster "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, overlay);
}
