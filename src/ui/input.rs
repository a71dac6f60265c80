//! Keyboard input handling.
//!
//! Keys go through the [`KeybindingRegistry`](crate::keybindings::KeybindingRegistry)
//! for the current context; the help overlay captures everything while open.

use crate::app::{App, Focus};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::validate_link;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Raw mode swallows SIGINT, so Ctrl+C always quits
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.show_help {
        return handle_help_input(app, code);
    }

    let context = app.context();
    let action = app.keybindings.action_for_key(code, modifiers, context);
    tracing::trace!(?code, ?context, ?action, "Key pressed");

    match action {
        Some(action) => dispatch(app, action, context),
        None => Action::Continue,
    }
}

/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn dispatch(app: &mut App, action: KbAction, context: KbContext) -> Action {
    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::Back => {
            if context == KbContext::Poster {
                app.hide_poster();
            } else if app.focus == Focus::Genres {
                app.focus = Focus::Movies;
            }
        }
        // The poster overlay only answers to its own keys and Back
        _ if context == KbContext::Poster && action != KbAction::OpenPoster => {}
        KbAction::OpenPoster => open_poster(app),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::NavDown => match app.focus {
            Focus::Movies => app.nav_down(),
            Focus::Genres => app.next_genre(),
        },
        KbAction::NavUp => match app.focus {
            Focus::Movies => app.nav_up(),
            Focus::Genres => app.prev_genre(),
        },
        KbAction::PageDown => app.page_down(),
        KbAction::PageUp => app.page_up(),
        KbAction::JumpTop => app.jump_top(),
        KbAction::JumpBottom => app.jump_bottom(),
        KbAction::ToggleDetails => app.toggle_details(),
        KbAction::ShowPoster => app.show_poster(),
        KbAction::LoadMore => app.load_more(),
        KbAction::PrevGenre => app.prev_genre(),
        KbAction::NextGenre => app.next_genre(),
        KbAction::ToggleGenre => app.toggle_genre_at_cursor(),
        KbAction::ClearGenre => app.clear_genre(),
    }
    Action::Continue
}

/// Open the poster overlay's image in the system browser.
fn open_poster(app: &mut App) {
    let Some(link) = app.poster_link() else {
        app.set_status("No poster for this movie");
        return;
    };

    // Validate before open::that() so only public web links reach the OS
    match validate_link(&link) {
        Err(e) => app.set_status(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                tracing::warn!(error = %e, "Failed to open poster");
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opening poster...");
            }
        }
    }
}
