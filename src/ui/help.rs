//! Help overlay: keybindings grouped by context, one row per action.
//!
//! Built from the live registry, so config overrides show up here. Keys bound
//! to the same action in the same context share a row ("j, Down").

use crate::app::App;
use crate::keybindings::{Action, Context, KeybindingRegistry};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::render::centered_rect;

/// Sections in display order.
const SECTIONS: [Context; 4] = [
    Context::Global,
    Context::Movies,
    Context::Genres,
    Context::Poster,
];

/// Width of the key column, wide enough for "Ctrl+d, PageDown".
const KEY_COLUMN_WIDTH: u16 = 20;

#[derive(Debug, PartialEq, Eq)]
struct HelpRow {
    keys: String,
    description: &'static str,
}

/// Non-empty sections of `registry`, each with one row per action in
/// registration order.
fn help_sections(registry: &KeybindingRegistry) -> Vec<(Context, Vec<HelpRow>)> {
    let bindings = registry.all_bindings();

    SECTIONS
        .iter()
        .filter_map(|&context| {
            let mut grouped: Vec<(Action, Vec<&str>, &'static str)> = Vec::new();
            for (ctx, key, action, description) in &bindings {
                if *ctx != context {
                    continue;
                }
                match grouped.iter_mut().find(|(a, _, _)| a == action) {
                    Some((_, keys, _)) => keys.push(key),
                    None => grouped.push((*action, vec![key.as_str()], *description)),
                }
            }

            let rows: Vec<HelpRow> = grouped
                .into_iter()
                .map(|(_, keys, description)| HelpRow {
                    keys: keys.join(", "),
                    description,
                })
                .collect();
            (!rows.is_empty()).then_some((context, rows))
        })
        .collect()
}

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut rows: Vec<Row> = Vec::new();
    for (context, section) in help_sections(&app.keybindings) {
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(Row::new(vec![Line::from(Span::styled(
            context.label(),
            section_style,
        ))]));
        rows.extend(section.into_iter().map(|row| {
            Row::new(vec![format!("  {}", row.keys), row.description.to_string()])
        }));
    }

    // Two border rows plus the header and its margin
    let visible_height = overlay.height.saturating_sub(4) as usize;
    let max_scroll = rows.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Help ".to_string()
    };

    let widths = [Constraint::Length(KEY_COLUMN_WIDTH), Constraint::Min(20)];
    let table = Table::new(visible_rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(Style::default().add_modifier(Modifier::UNDERLINED))
                .bottom_margin(1),
        );
    f.render_widget(table, overlay);

    let hint = if scroll < max_scroll {
        " j/k scroll, ? or Esc close "
    } else {
        " ? or Esc close "
    };
    let hint_area = Rect {
        x: overlay.x + 1,
        y: overlay.y + overlay.height.saturating_sub(1),
        width: overlay.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        ))),
        hint_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn row<'a>(sections: &'a [(Context, Vec<HelpRow>)], context: Context, description: &str) -> &'a HelpRow {
        sections
            .iter()
            .find(|(c, _)| *c == context)
            .and_then(|(_, rows)| rows.iter().find(|r| r.description == description))
            .unwrap()
    }

    #[test]
    fn test_keys_for_one_action_share_a_row() {
        let sections = help_sections(&KeybindingRegistry::new());

        assert_eq!(row(&sections, Context::Global, "Navigate down").keys, "j, Down");
        assert_eq!(
            row(&sections, Context::Movies, "Page down").keys,
            "Ctrl+d, PageDown"
        );
        assert_eq!(
            row(&sections, Context::Genres, "Filter by genre (again to clear)").keys,
            "Enter, Space"
        );
    }

    #[test]
    fn test_sections_follow_display_order() {
        let sections = help_sections(&KeybindingRegistry::new());
        let order: Vec<Context> = sections.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, SECTIONS.to_vec());
    }

    #[test]
    fn test_overrides_show_in_help() {
        let mut registry = KeybindingRegistry::new();
        let overrides = HashMap::from([("quit".to_string(), "x".to_string())]);
        assert!(registry.apply_overrides(&overrides).is_empty());

        let sections = help_sections(&registry);
        assert_eq!(row(&sections, Context::Global, "Quit application").keys, "x");
    }
}
