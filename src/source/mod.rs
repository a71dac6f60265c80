//! Catalog data sources.
//!
//! The controller only sees the [`CatalogSource`] trait. [`TmdbSource`] is the
//! HTTP implementation used by the binary; tests supply their own.

mod tmdb;

use crate::catalog::{Genre, Movie, MovieDetails, MovieId};
use async_trait::async_trait;
use thiserror::Error;

pub use tmdb::{TmdbSettings, TmdbSource, MAX_RESPONSE_SIZE};

/// Errors from any catalog fetch.
///
/// The controller never surfaces these into catalog state; they only reset a
/// loading flag and get logged.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Not found")]
    NotFound,
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The fetch task panicked before producing a result.
    #[error("Fetch task panicked: {0}")]
    TaskPanicked(String),
}

/// Remote movie catalog.
///
/// Implementations must be cheap to share: the controller holds one behind an
/// `Arc` and calls it from spawned tasks.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_genres(&self) -> Result<Vec<Genre>, SourceError>;

    /// Fetch one page of top-rated movies. Pages are 1-indexed.
    async fn fetch_top_movies(&self, page: u32) -> Result<Vec<Movie>, SourceError>;

    /// Fetch extended details. A missing movie is [`SourceError::NotFound`].
    async fn fetch_movie_details(&self, id: MovieId) -> Result<MovieDetails, SourceError>;
}
