use crate::catalog::{GenreId, MovieId};
use crate::controller::{CatalogController, CatalogEvent};
use crate::keybindings::{Context, KeybindingRegistry};
use std::borrow::Cow;
use tokio::time::Instant;

/// How long a status message stays on screen.
const STATUS_TTL_SECS: u64 = 3;

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Movies,
    Genres,
}

/// UI state wrapped around the catalog controller.
///
/// Selection is an index into the filtered projection, so it is clamped
/// whenever the projection changes shape.
pub struct App {
    pub controller: CatalogController,
    pub keybindings: KeybindingRegistry,

    pub focus: Focus,
    /// Index into the visible (filtered) movie list.
    pub selected: usize,
    /// Genre chip under the cursor; `None` is the "All" chip.
    pub genre_cursor: Option<GenreId>,
    /// Rows the movie list showed on the last frame, for paging.
    pub list_height: usize,
    /// First item drawn by the movie list, kept across frames.
    pub list_offset: usize,

    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub spinner_frame: usize,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(controller: CatalogController, keybindings: KeybindingRegistry) -> Self {
        Self {
            controller,
            keybindings,
            focus: Focus::Movies,
            selected: 0,
            genre_cursor: None,
            list_height: 10,
            list_offset: 0,
            show_help: false,
            help_scroll_offset: 0,
            status_message: None,
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    /// Keybinding context for the current screen.
    pub fn context(&self) -> Context {
        if self.controller.state().selected_poster().is_some() {
            return Context::Poster;
        }
        match self.focus {
            Focus::Movies => Context::Movies,
            Focus::Genres => Context::Genres,
        }
    }

    pub fn visible_len(&self) -> usize {
        self.controller.snapshot().visible.len()
    }

    pub fn selected_movie_id(&self) -> Option<MovieId> {
        self.controller
            .snapshot()
            .visible
            .get(self.selected)
            .map(|v| v.entry.id())
    }

    // ------------------------------------------------------------------------
    // Movie list navigation
    // ------------------------------------------------------------------------

    /// Move the cursor to `index` (clamped) and let the controller decide
    /// whether that is close enough to the end to fetch more.
    pub fn select_movie(&mut self, index: usize) {
        let len = self.visible_len();
        self.selected = index.min(len.saturating_sub(1));
        self.controller.on_cursor(self.selected);
    }

    pub fn nav_down(&mut self) {
        self.select_movie(self.selected.saturating_add(1));
    }

    pub fn nav_up(&mut self) {
        self.select_movie(self.selected.saturating_sub(1));
    }

    pub fn page_down(&mut self) {
        self.select_movie(self.selected.saturating_add(self.list_height.max(1)));
    }

    pub fn page_up(&mut self) {
        self.select_movie(self.selected.saturating_sub(self.list_height.max(1)));
    }

    pub fn jump_top(&mut self) {
        self.select_movie(0);
    }

    pub fn jump_bottom(&mut self) {
        self.select_movie(usize::MAX);
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Movies => Focus::Genres,
            Focus::Genres => Focus::Movies,
        };
    }

    // ------------------------------------------------------------------------
    // Movie actions
    // ------------------------------------------------------------------------

    pub fn toggle_details(&mut self) {
        if let Some(id) = self.selected_movie_id() {
            self.controller.toggle_expanded(id);
        }
    }

    pub fn show_poster(&mut self) {
        if let Some(id) = self.selected_movie_id() {
            self.controller.show_poster(id);
        }
    }

    pub fn hide_poster(&mut self) {
        self.controller.hide_poster();
    }

    /// Link for the open poster: the full-size image, else the list size.
    pub fn poster_link(&self) -> Option<String> {
        let snapshot = self.controller.snapshot();
        let movie = snapshot.selected_poster?;
        movie.poster_full.clone().or_else(|| movie.poster.clone())
    }

    pub fn load_more(&mut self) {
        if !self.controller.request_next_page() {
            let state = self.controller.state();
            if state.is_exhausted() {
                self.set_status("End of list");
            } else if state.is_loading() {
                self.set_status("Already loading...");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Genre bar
    // ------------------------------------------------------------------------

    /// Chip ids in display order, starting with "All".
    fn genre_chips(&self) -> Vec<Option<GenreId>> {
        std::iter::once(None)
            .chain(
                self.controller
                    .state()
                    .genre_counts()
                    .iter()
                    .map(|c| Some(c.genre.id)),
            )
            .collect()
    }

    fn genre_cursor_index(&self, chips: &[Option<GenreId>]) -> usize {
        chips
            .iter()
            .position(|c| *c == self.genre_cursor)
            .unwrap_or(0)
    }

    pub fn next_genre(&mut self) {
        let chips = self.genre_chips();
        let idx = self.genre_cursor_index(&chips);
        if let Some(next) = chips.get(idx + 1) {
            self.genre_cursor = *next;
        }
    }

    pub fn prev_genre(&mut self) {
        let chips = self.genre_chips();
        let idx = self.genre_cursor_index(&chips);
        if idx > 0 {
            self.genre_cursor = chips[idx - 1];
        }
    }

    /// Apply the chip under the cursor. A genre chip toggles, "All" clears.
    pub fn toggle_genre_at_cursor(&mut self) {
        let keep = self.selected_movie_id();
        match self.genre_cursor {
            Some(id) => self.controller.toggle_genre(id),
            None => self.controller.select_genre(None),
        }
        self.after_filter_change(keep);
    }

    pub fn clear_genre(&mut self) {
        let keep = self.selected_movie_id();
        self.controller.select_genre(None);
        self.genre_cursor = None;
        self.after_filter_change(keep);
    }

    /// Keep the cursor on the same movie if it is still visible, then give
    /// the controller a chance to fill a short projection.
    fn after_filter_change(&mut self, keep: Option<MovieId>) {
        let position = keep.and_then(|id| {
            self.controller
                .snapshot()
                .visible
                .iter()
                .position(|v| v.entry.id() == id)
        });
        self.select_movie(position.unwrap_or(0));
    }

    // ------------------------------------------------------------------------
    // Background events
    // ------------------------------------------------------------------------

    /// Apply a finished fetch.
    ///
    /// Only a page that landed re-checks the cursor against the end of the
    /// list. A failed page waits for the next cursor move before retrying.
    pub fn handle_catalog_event(&mut self, event: CatalogEvent) {
        let page_landed = matches!(event, CatalogEvent::PageLoaded { result: Ok(_), .. });
        if let Some(message) = self.controller.handle_event(event) {
            self.set_status(message);
        }
        if page_landed {
            self.select_movie(self.selected);
        } else {
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.visible_len().saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (expires after 3 seconds).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message if it expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
