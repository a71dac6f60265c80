//! The authoritative in-memory catalog.
//!
//! Every mutation takes `&mut self`, so each call is one visible transition
//! for whoever owns the state. Nothing here performs I/O: fetch results are
//! handed in by the controller once they arrive.

use super::snapshot::{CatalogSnapshot, VisibleEntry};
use super::types::{Genre, GenreCount, GenreId, Movie, MovieDetails, MovieEntry, MovieId};
use crate::source::SourceError;

/// Page cursor value for a fresh session (the source is 1-indexed).
pub const FIRST_PAGE: u32 = 1;

// ============================================================================
// Catalog State
// ============================================================================

/// Ordered movie entries, genre data, filter selection and pagination flags.
#[derive(Debug, Clone)]
pub struct CatalogState {
    /// Insertion order is fetch order. Entries are never removed or reordered.
    entries: Vec<MovieEntry>,
    genres: Vec<Genre>,
    /// Cached projection of `entries` x `genres`, rebuilt on every change to either.
    genre_counts: Vec<GenreCount>,
    selected_genre: Option<GenreId>,
    is_loading: bool,
    has_more: bool,
    next_page: u32,
    selected_poster: Option<MovieId>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogState {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            genres: Vec::new(),
            genre_counts: Vec::new(),
            selected_genre: None,
            is_loading: false,
            has_more: true,
            next_page: FIRST_PAGE,
            selected_poster: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn entries(&self) -> &[MovieEntry] {
        &self.entries
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn genre_counts(&self) -> &[GenreCount] {
        &self.genre_counts
    }

    pub fn selected_genre(&self) -> Option<GenreId> {
        self.selected_genre
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// True once a short or empty page has been seen. Never reverts.
    pub fn is_exhausted(&self) -> bool {
        !self.has_more
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn selected_poster(&self) -> Option<MovieId> {
        self.selected_poster
    }

    /// First stored entry with `movie_id`.
    pub fn entry(&self, movie_id: MovieId) -> Option<&MovieEntry> {
        self.entries.iter().find(|e| e.id() == movie_id)
    }

    // ------------------------------------------------------------------------
    // Genres
    // ------------------------------------------------------------------------

    pub fn replace_genres(&mut self, genres: Vec<Genre>) {
        self.genres = genres;
        self.recompute_genre_counts();
    }

    fn recompute_genre_counts(&mut self) {
        let entries = &self.entries;
        self.genre_counts = self
            .genres
            .iter()
            .filter_map(|genre| {
                let count = entries.iter().filter(|e| e.movie.has_genre(genre.id)).count();
                (count > 0).then(|| GenreCount {
                    genre: genre.clone(),
                    count,
                })
            })
            .collect();
    }

    // ------------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------------

    /// Claim the page fetch slot.
    ///
    /// Returns the page to fetch and marks the catalog as loading, or `None`
    /// when a fetch is already in flight or the feed is exhausted.
    pub fn begin_page_load(&mut self) -> Option<u32> {
        if self.is_loading || !self.has_more {
            return None;
        }
        self.is_loading = true;
        Some(self.next_page)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Append a page of movies that already passed the quality filter.
    ///
    /// `fetched_count` is the size of the page before filtering. The feed stays
    /// open only if the page was non-empty and nothing was filtered out.
    pub fn append_page(&mut self, movies: Vec<Movie>, fetched_count: usize) {
        let passed = movies.len();
        self.entries.extend(movies.into_iter().map(MovieEntry::new));
        self.next_page = self.next_page.saturating_add(1);
        self.has_more = fetched_count > 0 && passed == fetched_count;
        self.recompute_genre_counts();
    }

    // ------------------------------------------------------------------------
    // Filter
    // ------------------------------------------------------------------------

    /// Set the genre filter. Stored entries are untouched.
    pub fn select_genre(&mut self, genre_id: Option<GenreId>) {
        self.selected_genre = genre_id;
    }

    /// Select `genre_id`, or clear the filter when it is already selected.
    pub fn toggle_genre(&mut self, genre_id: GenreId) {
        if self.selected_genre == Some(genre_id) {
            self.selected_genre = None;
        } else {
            self.selected_genre = Some(genre_id);
        }
    }

    // ------------------------------------------------------------------------
    // Enrichment
    // ------------------------------------------------------------------------

    /// Flip the expanded flag of every entry with `movie_id`.
    ///
    /// Returns `true` when the caller must start a detail fetch: the entry is
    /// now expanded, has no details, and no fetch is in flight. The loading
    /// flag is set before returning so rapid toggles cannot start a second one.
    pub fn toggle_expanded(&mut self, movie_id: MovieId) -> bool {
        let mut needs_fetch = false;
        for entry in self.entries.iter_mut().filter(|e| e.movie.id == movie_id) {
            entry.is_expanded = !entry.is_expanded;
            if entry.is_expanded && entry.details.is_none() && !entry.is_loading_details {
                entry.is_loading_details = true;
                needs_fetch = true;
            }
        }
        needs_fetch
    }

    /// Record the outcome of a detail fetch.
    ///
    /// Failure only clears the loading flag, so a later expand fetches again.
    /// Ids that are no longer stored are ignored.
    pub fn apply_details_result(
        &mut self,
        movie_id: MovieId,
        result: Result<MovieDetails, SourceError>,
    ) {
        let mut matched = false;
        match result {
            Ok(details) => {
                for entry in self.entries.iter_mut().filter(|e| e.movie.id == movie_id) {
                    matched = true;
                    entry.is_loading_details = false;
                    if entry.details.is_none() {
                        entry.details = Some(details.clone());
                    }
                }
            }
            Err(_) => {
                for entry in self.entries.iter_mut().filter(|e| e.movie.id == movie_id) {
                    matched = true;
                    entry.is_loading_details = false;
                }
            }
        }
        if !matched {
            tracing::debug!(movie_id, "Details arrived for unknown movie, ignoring");
        }
    }

    // ------------------------------------------------------------------------
    // Poster
    // ------------------------------------------------------------------------

    pub fn set_selected_poster(&mut self, movie_id: Option<MovieId>) {
        self.selected_poster = movie_id;
    }

    // ------------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------------

    /// Borrow a read-only view with the genre filter applied.
    pub fn snapshot(&self) -> CatalogSnapshot<'_> {
        let selected = self.selected_genre;
        let visible = self
            .entries
            .iter()
            .filter(|e| selected.map_or(true, |g| e.movie.has_genre(g)))
            .map(|entry| VisibleEntry {
                entry,
                is_highlighted: selected.is_some(),
            })
            .collect();

        CatalogSnapshot {
            visible,
            genre_counts: &self.genre_counts,
            selected_genre: selected,
            is_loading: self.is_loading,
            has_more: self.has_more,
            next_page: self.next_page,
            total_entries: self.entries.len(),
            selected_poster: self
                .selected_poster
                .and_then(|id| self.entry(id))
                .map(|e| &e.movie),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
