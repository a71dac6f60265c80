use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the genre bar: "All" followed by one chip per genre with movies.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Genres;
    let state = app.controller.state();
    let selected = state.selected_genre();

    let chip_style = |is_selected: bool, under_cursor: bool| {
        let mut style = if is_selected {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default()
        };
        if is_focused && under_cursor {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        style
    };

    let mut spans = vec![Span::styled(
        " All ",
        chip_style(selected.is_none(), app.genre_cursor.is_none()),
    )];
    for count in state.genre_counts() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" {} ({}) ", count.genre.name, count.count),
            chip_style(
                selected == Some(count.genre.id),
                app.genre_cursor == Some(count.genre.id),
            ),
        ));
    }

    // Keep the cursor chip in view on narrow terminals
    let cursor_chip = app
        .genre_cursor
        .and_then(|id| state.genre_counts().iter().position(|c| c.genre.id == id))
        .map_or(0, |i| i + 1);
    let skip = cursor_chip.saturating_sub(3) * 2;
    let spans: Vec<Span> = spans.into_iter().skip(skip).collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Genres"),
    );

    f.render_widget(paragraph, area);
}
