use std::sync::Arc;

/// Stable movie key assigned by the catalog source.
pub type MovieId = i64;

/// Stable genre key assigned by the catalog source.
pub type GenreId = i64;

/// Minimum rating a movie needs to be kept when a page arrives.
pub const DEFAULT_MIN_VOTE_AVERAGE: f64 = 7.0;

// ============================================================================
// Source Values
// ============================================================================

/// A movie as received from a top-rated page. Never mutated after receipt.
///
/// Text fields use `Arc<str>` so snapshots and events can share them cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: Arc<str>,
    pub overview: Arc<str>,
    /// Absolute URL of the list-sized poster image.
    pub poster: Option<String>,
    /// Absolute URL of the full-size poster image, shown by the poster overlay.
    pub poster_full: Option<String>,
    pub backdrop: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<GenreId>,
}

impl Movie {
    /// Whether this movie belongs to `genre_id`.
    pub fn has_genre(&self, genre_id: GenreId) -> bool {
        self.genre_ids.contains(&genre_id)
    }

    /// Whether this movie clears the quality filter.
    pub fn passes_quality(&self, min_vote_average: f64) -> bool {
        self.vote_average >= min_vote_average
    }
}

/// Extended details fetched on demand for a single movie.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovieDetails {
    pub production_company: Option<String>,
    pub director: Option<String>,
    /// Cast names in billing order.
    pub actors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: Arc<str>,
}

// ============================================================================
// Derived State
// ============================================================================

/// One movie plus its enrichment state inside the stored collection.
///
/// `details` transitions from `None` to `Some` at most once and is never
/// cleared afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieEntry {
    pub movie: Movie,
    pub is_expanded: bool,
    pub details: Option<MovieDetails>,
    pub is_loading_details: bool,
}

impl MovieEntry {
    pub fn new(movie: Movie) -> Self {
        Self {
            movie,
            is_expanded: false,
            details: None,
            is_loading_details: false,
        }
    }

    pub fn id(&self) -> MovieId {
        self.movie.id
    }
}

/// Number of stored entries tagged with `genre`. Only non-zero counts exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: Genre,
    pub count: usize,
}
