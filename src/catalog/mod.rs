//! Catalog state: the movie collection, its enrichment, and derived views.
//!
//! - [`types`] - Movie, details, genre and entry values
//! - [`store`] - [`CatalogState`], the single source of truth and its mutations
//! - [`snapshot`] - Borrowed, genre-filtered read view for consumers

mod snapshot;
mod store;
mod types;

pub use snapshot::{CatalogSnapshot, VisibleEntry};
pub use store::{CatalogState, FIRST_PAGE};
pub use types::{
    Genre, GenreCount, GenreId, Movie, MovieDetails, MovieEntry, MovieId,
    DEFAULT_MIN_VOTE_AVERAGE,
};
