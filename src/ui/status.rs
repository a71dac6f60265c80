use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Hints per context, rendered with whatever key is currently bound.
const MOVIE_HINTS: &[(Action, &str)] = &[
    (Action::ToggleDetails, "details"),
    (Action::ShowPoster, "poster"),
    (Action::CycleFocus, "genres"),
    (Action::ShowHelp, "help"),
    (Action::Quit, "quit"),
];
const GENRE_HINTS: &[(Action, &str)] = &[
    (Action::NextGenre, "next"),
    (Action::ToggleGenre, "filter"),
    (Action::ClearGenre, "all"),
    (Action::CycleFocus, "movies"),
    (Action::ShowHelp, "help"),
];
const POSTER_HINTS: &[(Action, &str)] = &[
    (Action::OpenPoster, "open in browser"),
    (Action::Back, "close"),
    (Action::Quit, "quit"),
];

/// Render the status bar: a transient message if any, else key hints.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.context() {
            Context::Poster => Cow::Owned(hints(app, POSTER_HINTS)),
            Context::Genres => Cow::Owned(hints(app, GENRE_HINTS)),
            _ => {
                let shown = app.visible_len();
                let position = if shown == 0 { 0 } else { app.selected + 1 };
                Cow::Owned(format!(
                    "{}/{}  {}",
                    position,
                    shown,
                    hints(app, MOVIE_HINTS)
                ))
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn hints(app: &App, entries: &[(Action, &str)]) -> String {
    entries
        .iter()
        .filter_map(|(action, label)| {
            app.keybindings
                .key_for(*action)
                .map(|key| format!("[{}]{}", key, label))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
