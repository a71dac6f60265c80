//! Pagination and enrichment controller.
//!
//! [`CatalogController`] owns the [`CatalogState`] and is driven from one loop.
//! Fetches run as spawned tasks that never touch state: each posts a
//! [`CatalogEvent`] back over an mpsc channel, and the owner applies it with
//! [`CatalogController::handle_event`]. Because every mutation goes through
//! `&mut self`, the page guard is checked and claimed in one step.

use crate::catalog::{
    CatalogSnapshot, CatalogState, Genre, GenreId, Movie, MovieDetails, MovieId,
    DEFAULT_MIN_VOTE_AVERAGE,
};
use crate::source::{CatalogSource, SourceError};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default number of rows from the end of the list that triggers the next page.
pub const DEFAULT_PREFETCH_DISTANCE: usize = 3;

/// Completed fetch, sent from a background task to the state owner.
#[derive(Debug)]
pub enum CatalogEvent {
    GenresLoaded(Result<Vec<Genre>, SourceError>),
    PageLoaded {
        page: u32,
        result: Result<Vec<Movie>, SourceError>,
    },
    DetailsLoaded {
        movie_id: MovieId,
        result: Result<MovieDetails, SourceError>,
    },
}

/// Tuning knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    /// Movies rated below this are dropped, and a page that loses any movie
    /// ends pagination.
    pub min_vote_average: f64,
    pub prefetch_distance: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            min_vote_average: DEFAULT_MIN_VOTE_AVERAGE,
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
        }
    }
}

pub struct CatalogController {
    state: CatalogState,
    source: Arc<dyn CatalogSource>,
    event_tx: mpsc::Sender<CatalogEvent>,
    settings: ControllerSettings,
    /// Spawned fetches whose event has not been handled yet.
    pending: usize,
}

impl CatalogController {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        event_tx: mpsc::Sender<CatalogEvent>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            state: CatalogState::new(),
            source,
            event_tx,
            settings,
            pending: 0,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn snapshot(&self) -> CatalogSnapshot<'_> {
        self.state.snapshot()
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending
    }

    /// Kick off the initial genre and first-page fetches.
    pub fn start(&mut self) {
        self.request_genres();
        self.request_next_page();
    }

    // ------------------------------------------------------------------------
    // Fetch triggers
    // ------------------------------------------------------------------------

    /// Fetch the next page unless one is in flight or the feed is exhausted.
    ///
    /// Returns whether a fetch was started.
    pub fn request_next_page(&mut self) -> bool {
        let Some(page) = self.state.begin_page_load() else {
            tracing::trace!(
                loading = self.state.is_loading(),
                has_more = self.state.has_more(),
                "Page request ignored"
            );
            return false;
        };

        tracing::debug!(page, "Fetching page");
        let source = Arc::clone(&self.source);
        self.spawn_fetch(
            "page",
            async move { source.fetch_top_movies(page).await },
            move |result| CatalogEvent::PageLoaded { page, result },
        );
        true
    }

    pub fn request_genres(&mut self) {
        tracing::debug!("Fetching genres");
        let source = Arc::clone(&self.source);
        self.spawn_fetch(
            "genres",
            async move { source.fetch_genres().await },
            CatalogEvent::GenresLoaded,
        );
    }

    /// Start a detail fetch for `movie_id`.
    ///
    /// This does not touch the entry's loading flag; [`Self::toggle_expanded`]
    /// sets it before calling here. There is no cancellation: a result that
    /// lands after the entry was collapsed is still stored.
    pub fn request_details(&mut self, movie_id: MovieId) {
        tracing::debug!(movie_id, "Fetching details");
        let source = Arc::clone(&self.source);
        self.spawn_fetch(
            "details",
            async move { source.fetch_movie_details(movie_id).await },
            move |result| CatalogEvent::DetailsLoaded { movie_id, result },
        );
    }

    /// Pull the next page when `position` (an index into the visible list) is
    /// close to its end. Returns whether a fetch was started.
    pub fn on_cursor(&mut self, position: usize) -> bool {
        let near_end = self
            .state
            .snapshot()
            .is_near_end(position, self.settings.prefetch_distance);
        near_end && self.request_next_page()
    }

    // ------------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------------

    /// Expand or collapse a movie, fetching details on first expansion.
    ///
    /// Returns whether a detail fetch was started.
    pub fn toggle_expanded(&mut self, movie_id: MovieId) -> bool {
        if self.state.toggle_expanded(movie_id) {
            self.request_details(movie_id);
            true
        } else {
            false
        }
    }

    pub fn select_genre(&mut self, genre_id: Option<GenreId>) {
        self.state.select_genre(genre_id);
    }

    pub fn toggle_genre(&mut self, genre_id: GenreId) {
        self.state.toggle_genre(genre_id);
    }

    pub fn show_poster(&mut self, movie_id: MovieId) {
        self.state.set_selected_poster(Some(movie_id));
    }

    pub fn hide_poster(&mut self) {
        self.state.set_selected_poster(None);
    }

    // ------------------------------------------------------------------------
    // Event application
    // ------------------------------------------------------------------------

    /// Apply one completed fetch.
    ///
    /// Errors never reach the catalog; they reset the matching loading flag
    /// and are returned as a short message for a status line.
    pub fn handle_event(&mut self, event: CatalogEvent) -> Option<String> {
        self.pending = self.pending.saturating_sub(1);

        match event {
            CatalogEvent::GenresLoaded(Ok(genres)) => {
                tracing::info!(count = genres.len(), "Genres loaded");
                self.state.replace_genres(genres);
                None
            }
            CatalogEvent::GenresLoaded(Err(e)) => {
                tracing::warn!(error = %e, "Failed to load genres");
                Some(format!("Failed to load genres: {}", e))
            }
            CatalogEvent::PageLoaded {
                page,
                result: Ok(movies),
            } => {
                let fetched = movies.len();
                let min = self.settings.min_vote_average;
                let passed: Vec<Movie> = movies
                    .into_iter()
                    .filter(|m| m.passes_quality(min))
                    .collect();
                tracing::info!(page, fetched, passed = passed.len(), "Page loaded");
                self.state.append_page(passed, fetched);
                self.state.set_loading(false);
                if self.state.is_exhausted() {
                    tracing::info!(
                        page,
                        total = self.state.entries().len(),
                        "Catalog exhausted"
                    );
                }
                None
            }
            CatalogEvent::PageLoaded {
                page,
                result: Err(e),
            } => {
                tracing::warn!(page, error = %e, "Failed to load page");
                self.state.set_loading(false);
                Some(format!("Failed to load page {}: {}", page, e))
            }
            CatalogEvent::DetailsLoaded { movie_id, result } => {
                let message = match &result {
                    Ok(_) => {
                        tracing::debug!(movie_id, "Details loaded");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(movie_id, error = %e, "Failed to load details");
                        Some(format!("Failed to load details: {}", e))
                    }
                };
                self.state.apply_details_result(movie_id, result);
                message
            }
        }
    }

    fn spawn_fetch<T, F, W>(&mut self, task: &'static str, fetch: F, into_event: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, SourceError>> + Send + 'static,
        W: FnOnce(Result<T, SourceError>) -> CatalogEvent + Send + 'static,
    {
        self.pending += 1;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = match catch_task_panic(fetch).await {
                Ok(result) => result,
                Err(panic_msg) => {
                    tracing::error!(task, error = %panic_msg, "Fetch task panicked");
                    Err(SourceError::TaskPanicked(panic_msg))
                }
            };
            if let Err(e) = tx.send(into_event(result)).await {
                tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
            }
        });
    }
}

/// Run `future`, turning a panic into `Err` with the panic message.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value_through() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_reports_message() {
        let result = catch_task_panic(async {
            if true {
                panic!("boom {}", 1);
            }
        })
        .await;
        assert_eq!(result, Err("boom 1".to_string()));
    }

    #[test]
    fn test_default_settings() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.min_vote_average, 7.0);
        assert_eq!(settings.prefetch_distance, 3);
    }
}
