use crate::app::{App, Focus};
use crate::catalog::MovieEntry;
use crate::util::{truncate_to_width, wrap_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use std::borrow::Cow;

use super::loop_runner::SPINNER_FRAMES;

/// Cast members shown inline before "and N more".
const MAX_CAST_SHOWN: usize = 5;

/// Overview lines shown under a collapsed movie.
const OVERVIEW_PREVIEW_LINES: usize = 2;

/// Render the movie list with inline details and the loading/end footer.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    app.list_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let is_focused = app.focus == Focus::Movies;

    let snapshot = app.controller.snapshot();
    let mut items: Vec<ListItem> = snapshot
        .visible
        .iter()
        .enumerate()
        .map(|(i, visible)| {
            entry_item(
                visible.entry,
                visible.is_highlighted,
                i == app.selected,
                inner_width,
            )
        })
        .collect();

    let footer = if snapshot.is_loading {
        Some(Line::from(Span::styled(
            format!("{} Loading movies...", SPINNER_FRAMES[app.spinner_frame]),
            Style::default().fg(Color::Cyan),
        )))
    } else if !snapshot.has_more {
        Some(Line::from(Span::styled(
            "End of list",
            Style::default().fg(Color::DarkGray),
        )))
    } else if snapshot.visible.is_empty() {
        Some(Line::from("No movies"))
    } else {
        None
    };
    items.extend(footer.map(ListItem::new));

    let title = match snapshot.selected_genre_name() {
        Some(name) => format!(
            "Top Rated - {} ({}/{})",
            name,
            snapshot.visible.len(),
            snapshot.total_entries
        ),
        None => format!("Top Rated ({})", snapshot.total_entries),
    };
    let selected = (!snapshot.visible.is_empty()).then_some(app.selected);

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    let mut state = ListState::default()
        .with_offset(app.list_offset)
        .with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
    app.list_offset = state.offset();
}

fn entry_item(entry: &MovieEntry, is_highlighted: bool, is_selected: bool, width: usize) -> ListItem<'static> {
    let movie = &entry.movie;

    let title_style = if is_selected {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else if is_highlighted {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let marker = if entry.is_expanded { "v " } else { "> " };
    let rating = format!("{:>4.1}  ", movie.vote_average);
    let title_width = width.saturating_sub(marker.len() + rating.len());

    let mut lines = vec![Line::from(vec![
        Span::raw(marker),
        Span::styled(rating, Style::default().fg(Color::Green)),
        Span::styled(
            truncate_to_width(&movie.title, title_width).into_owned(),
            title_style.add_modifier(Modifier::BOLD),
        ),
    ])];

    let detail_width = width.saturating_sub(4);
    let dim = Style::default().fg(Color::Gray);
    for text in overview_lines(&movie.overview, detail_width, entry.is_expanded) {
        lines.push(Line::from(Span::styled(format!("    {}", text), dim)));
    }

    if entry.is_expanded {
        let indent = |text: String, style: Style| {
            Line::from(Span::styled(
                format!("    {}", truncate_to_width(&text, detail_width)),
                style,
            ))
        };

        match (&entry.details, entry.is_loading_details) {
            (_, true) => lines.push(indent(
                "Loading details...".to_string(),
                Style::default().fg(Color::Cyan),
            )),
            (Some(details), false) => {
                if let Some(director) = &details.director {
                    lines.push(indent(format!("Director: {}", director), dim));
                }
                if let Some(company) = &details.production_company {
                    lines.push(indent(format!("Studio: {}", company), dim));
                }
                if !details.actors.is_empty() {
                    lines.push(indent(format!("Cast: {}", cast_line(&details.actors)), dim));
                }
            }
            (None, false) => lines.push(indent(
                "No details available".to_string(),
                Style::default().fg(Color::DarkGray),
            )),
        }
    }

    ListItem::new(lines)
}

/// The full overview when expanded, else a short preview ending in an
/// ellipsis when cut.
fn overview_lines(overview: &str, width: usize, expanded: bool) -> Vec<String> {
    let mut lines = wrap_to_width(overview, width);
    if !expanded && lines.len() > OVERVIEW_PREVIEW_LINES {
        lines.truncate(OVERVIEW_PREVIEW_LINES);
        if let Some(last) = lines.last_mut() {
            *last = match truncate_to_width(last, width.saturating_sub(1)) {
                Cow::Borrowed(fits) => format!("{}…", fits),
                Cow::Owned(cut) => cut,
            };
        }
    }
    lines
}

fn cast_line(actors: &[String]) -> String {
    let shown = actors
        .iter()
        .take(MAX_CAST_SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match actors.len().saturating_sub(MAX_CAST_SHOWN) {
        0 => shown,
        rest => format!("{} and {} more", shown, rest),
    }
}
