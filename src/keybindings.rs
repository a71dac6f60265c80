//! Keybinding registry: maps keys to actions per context, with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    JumpTop,
    JumpBottom,
    CycleFocus,
    Back,
    ToggleDetails,
    ShowPoster,
    OpenPoster,
    LoadMore,
    PrevGenre,
    NextGenre,
    ToggleGenre,
    ClearGenre,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::JumpTop => "Jump to first movie",
            Self::JumpBottom => "Jump to last movie",
            Self::CycleFocus => "Switch between movies and genres",
            Self::Back => "Go back / dismiss",
            Self::ToggleDetails => "Expand / collapse details",
            Self::ShowPoster => "Show poster",
            Self::OpenPoster => "Open poster in browser",
            Self::LoadMore => "Load next page",
            Self::PrevGenre => "Previous genre",
            Self::NextGenre => "Next genre",
            Self::ToggleGenre => "Filter by genre (again to clear)",
            Self::ClearGenre => "Show all genres",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Movies,
    Genres,
    Poster,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Movies => "Movies",
            Self::Genres => "Genres",
            Self::Poster => "Poster",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right",
///   "Backspace", "Space", "Home", "End", "PageUp", "PageDown"
/// - Ctrl combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then_some(KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = n.parse::<u8>() {
            return (1..=12).contains(&n).then_some(KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(KeySpec::ch(c))
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to [`Context::Global`].
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use Context::*;

        // === Global ===
        self.bind(Global, KeySpec::ch('q'), Quit);
        self.bind(Global, KeySpec::ch('?'), ShowHelp);
        self.bind(Global, KeySpec::plain(KeyCode::Tab), CycleFocus);
        self.bind(Global, KeySpec::plain(KeyCode::Esc), Back);
        self.bind(Global, KeySpec::ch('j'), NavDown);
        self.bind(Global, KeySpec::plain(KeyCode::Down), NavDown);
        self.bind(Global, KeySpec::ch('k'), NavUp);
        self.bind(Global, KeySpec::plain(KeyCode::Up), NavUp);
        self.bind(Global, KeySpec::ch('a'), ClearGenre);

        // === Movie list ===
        self.bind(Movies, KeySpec::plain(KeyCode::Enter), ToggleDetails);
        self.bind(Movies, KeySpec::ch(' '), ToggleDetails);
        self.bind(Movies, KeySpec::ch('p'), ShowPoster);
        self.bind(Movies, KeySpec::ch('n'), LoadMore);
        self.bind(Movies, KeySpec::ctrl('d'), PageDown);
        self.bind(Movies, KeySpec::plain(KeyCode::PageDown), PageDown);
        self.bind(Movies, KeySpec::ctrl('u'), PageUp);
        self.bind(Movies, KeySpec::plain(KeyCode::PageUp), PageUp);
        self.bind(Movies, KeySpec::ch('g'), JumpTop);
        self.bind(Movies, KeySpec::plain(KeyCode::Home), JumpTop);
        self.bind(Movies, KeySpec::ch('G'), JumpBottom);
        self.bind(Movies, KeySpec::plain(KeyCode::End), JumpBottom);

        // === Genre bar ===
        self.bind(Genres, KeySpec::ch('h'), PrevGenre);
        self.bind(Genres, KeySpec::plain(KeyCode::Left), PrevGenre);
        self.bind(Genres, KeySpec::ch('l'), NextGenre);
        self.bind(Genres, KeySpec::plain(KeyCode::Right), NextGenre);
        self.bind(Genres, KeySpec::plain(KeyCode::Enter), ToggleGenre);
        self.bind(Genres, KeySpec::ch(' '), ToggleGenre);

        // === Poster overlay ===
        self.bind(Poster, KeySpec::ch('o'), OpenPoster);
        self.bind(Poster, KeySpec::ch('p'), Back);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_details").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). The new key
    /// replaces every existing binding of the action, in the same contexts.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted so conflicting overrides resolve the same way every run
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a key, trying `context` first and then Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shifted characters arrive already cased, e.g. 'G' with SHIFT
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// All bindings for the help screen as
    /// (context, key display string, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }

    /// Display string of the first key bound to `action`, for hints.
    pub fn key_for(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "page_down" => Some(Action::PageDown),
        "page_up" => Some(Action::PageUp),
        "jump_top" | "top" => Some(Action::JumpTop),
        "jump_bottom" | "bottom" => Some(Action::JumpBottom),
        "cycle_focus" | "focus" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "toggle_details" | "details" => Some(Action::ToggleDetails),
        "show_poster" | "poster" => Some(Action::ShowPoster),
        "open_poster" | "open" => Some(Action::OpenPoster),
        "load_more" | "more" => Some(Action::LoadMore),
        "prev_genre" => Some(Action::PrevGenre),
        "next_genre" => Some(Action::NextGenre),
        "toggle_genre" | "genre" => Some(Action::ToggleGenre),
        "clear_genre" | "all" => Some(Action::ClearGenre),
        "show_help" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        let action = reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global);
        assert_eq!(action, Some(Action::Quit));
    }

    #[test]
    fn test_shifted_char_matches_plain_binding() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('G'), KeyModifiers::SHIFT, Context::Movies),
            Some(Action::JumpBottom)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('?'), KeyModifiers::SHIFT, Context::Genres),
            Some(Action::ShowHelp)
        );
    }

    #[test]
    fn test_enter_depends_on_context() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Movies),
            Some(Action::ToggleDetails)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Genres),
            Some(Action::ToggleGenre)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Poster),
            None
        );
    }

    #[test]
    fn test_contexts_fall_back_to_global() {
        let reg = KeybindingRegistry::new();
        for ctx in [Context::Movies, Context::Genres, Context::Poster] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, ctx),
                Some(Action::Quit)
            );
            assert_eq!(
                reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, ctx),
                Some(Action::Back)
            );
        }
    }

    #[test]
    fn test_poster_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('p'), KeyModifiers::NONE, Context::Movies),
            Some(Action::ShowPoster)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('p'), KeyModifiers::NONE, Context::Poster),
            Some(Action::Back)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('o'), KeyModifiers::NONE, Context::Poster),
            Some(Action::OpenPoster)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('o'), KeyModifiers::NONE, Context::Movies),
            None
        );
    }

    #[test]
    fn test_ctrl_modifiers() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('d'), KeyModifiers::CONTROL, Context::Movies),
            Some(Action::PageDown)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('d'), KeyModifiers::NONE, Context::Movies),
            None
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_override_keeps_all_contexts_once() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("toggle_details".to_string(), "x".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('x'), KeyModifiers::NONE, Context::Movies),
            Some(Action::ToggleDetails)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Movies),
            None
        );
        // Two default keys collapse into one binding
        let count = reg
            .all_bindings()
            .iter()
            .filter(|(_, _, a, _)| *a == Action::ToggleDetails)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_apply_overrides_warnings() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("rewind".to_string(), "r".to_string());
        overrides.insert("quit".to_string(), "Ctrl+Alt+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("Unknown action 'rewind'")));
        assert!(warnings.iter().any(|w| w.contains("Cannot parse key")));
        // Failed override leaves the default in place
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_parse_key_string_variants() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::ch(' ')));
        assert_eq!(parse_key_string("PageDown"), Some(KeySpec::plain(KeyCode::PageDown)));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("Ctrl+dd"), None);
        assert_eq!(parse_key_string("/"), Some(KeySpec::ch('/')));
        assert_eq!(parse_key_string("é"), Some(KeySpec::ch('é')));
        assert_eq!(parse_key_string("qq"), None);
        assert_eq!(parse_key_string(""), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::ch('q')), "q");
        assert_eq!(format_key(&KeySpec::ch(' ')), "Space");
        assert_eq!(format_key(&KeySpec::ctrl('d')), "Ctrl+d");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Enter)), "Enter");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_key_for_hint() {
        let reg = KeybindingRegistry::new();
        assert_eq!(reg.key_for(Action::ShowHelp).as_deref(), Some("?"));
        assert_eq!(reg.key_for(Action::ToggleDetails).as_deref(), Some("Enter"));
    }
}
