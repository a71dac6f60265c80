//! HTTP catalog source speaking the TMDB v3 API shape.

use super::{CatalogSource, SourceError};
use crate::catalog::{Genre, Movie, MovieDetails, MovieId};
use crate::util::strip_control_chars;
use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Upper bound on any response body.
pub const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "w780";
const FULL_POSTER_SIZE: &str = "original";

// ============================================================================
// Settings
// ============================================================================

/// Connection settings for [`TmdbSource`].
///
/// Debug output masks the API token.
#[derive(Clone)]
pub struct TmdbSettings {
    pub base_url: String,
    pub image_base_url: String,
    pub api_token: Option<SecretString>,
    pub language: String,
    pub timeout: Duration,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            api_token: None,
            language: "en-US".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for TmdbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbSettings")
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<GenreDto>,
}

#[derive(Debug, Deserialize)]
struct GenreDto {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct MoviePage {
    #[serde(default)]
    results: Vec<MovieDto>,
}

#[derive(Debug, Deserialize)]
struct MovieDto {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genre_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct DetailsDto {
    #[serde(default)]
    production_companies: Vec<CompanyDto>,
    #[serde(default)]
    credits: CreditsDto,
}

#[derive(Debug, Deserialize)]
struct CompanyDto {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct CreditsDto {
    #[serde(default)]
    cast: Vec<CastDto>,
    #[serde(default)]
    crew: Vec<CrewDto>,
}

#[derive(Debug, Deserialize)]
struct CastDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CrewDto {
    name: String,
    #[serde(default)]
    job: String,
}

// ============================================================================
// Source
// ============================================================================

/// Catalog source backed by a TMDB-compatible REST API.
pub struct TmdbSource {
    client: reqwest::Client,
    base_url: Url,
    image_base_url: String,
    api_token: Option<SecretString>,
    language: String,
}

impl TmdbSource {
    /// Build a source with its own pooled HTTP client.
    pub fn new(settings: TmdbSettings) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(settings.timeout)
            .build()?;
        Self::with_client(client, settings)
    }

    /// Build a source around an existing client.
    ///
    /// Rejects a plain-HTTP base URL unless it points at localhost, so the API
    /// token is never sent in the clear.
    pub fn with_client(client: reqwest::Client, settings: TmdbSettings) -> Result<Self, SourceError> {
        let base_url = Url::parse(settings.base_url.trim_end_matches('/'))
            .map_err(|e| SourceError::InvalidUrl(e.to_string()))?;

        match base_url.scheme() {
            "https" => {}
            "http" => {
                let is_localhost =
                    matches!(base_url.host_str(), Some("localhost") | Some("127.0.0.1"));
                if !is_localhost {
                    tracing::error!(base_url = %base_url, "Rejecting non-HTTPS catalog base URL");
                    return Err(SourceError::InsecureBaseUrl);
                }
                tracing::warn!(base_url = %base_url, "Using non-HTTPS catalog base URL (localhost only)");
            }
            other => return Err(SourceError::InvalidUrl(format!("unsupported scheme {}", other))),
        }

        Ok(Self {
            client,
            base_url,
            image_base_url: settings.image_base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token,
            language: settings.language,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("language", &self.language);
        }
        url
    }

    fn image_url(&self, size: &str, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}/{}{}", self.image_base_url, size, path)
        } else {
            format!("{}/{}/{}", self.image_base_url, size, path)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let mut request = self.client.get(url.as_str());
        if let Some(token) = &self.api_token {
            tracing::trace!("Catalog API authentication configured");
            request = request.header("Authorization", format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Network(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn movie_from_dto(&self, dto: MovieDto) -> Movie {
        Movie {
            id: dto.id,
            title: Arc::from(strip_control_chars(&dto.title).as_ref()),
            overview: Arc::from(strip_control_chars(&dto.overview).as_ref()),
            poster: dto.poster_path.as_deref().map(|p| self.image_url(POSTER_SIZE, p)),
            poster_full: dto
                .poster_path
                .as_deref()
                .map(|p| self.image_url(FULL_POSTER_SIZE, p)),
            backdrop: dto
                .backdrop_path
                .as_deref()
                .map(|p| self.image_url(BACKDROP_SIZE, p)),
            vote_average: dto.vote_average,
            genre_ids: dto.genre_ids,
        }
    }
}

fn details_from_dto(dto: DetailsDto) -> MovieDetails {
    MovieDetails {
        production_company: dto
            .production_companies
            .into_iter()
            .next()
            .map(|c| strip_control_chars(&c.name).into_owned()),
        director: dto
            .credits
            .crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| strip_control_chars(&c.name).into_owned()),
        actors: dto
            .credits
            .cast
            .iter()
            .map(|c| strip_control_chars(&c.name).into_owned())
            .collect(),
    }
}

#[async_trait]
impl CatalogSource for TmdbSource {
    async fn fetch_genres(&self) -> Result<Vec<Genre>, SourceError> {
        let list: GenreList = self.get_json(self.endpoint("genre/movie/list", &[])).await?;
        Ok(list
            .genres
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: Arc::from(strip_control_chars(&g.name).as_ref()),
            })
            .collect())
    }

    async fn fetch_top_movies(&self, page: u32) -> Result<Vec<Movie>, SourceError> {
        let url = self.endpoint("movie/top_rated", &[("page", page.to_string())]);
        let page: MoviePage = self.get_json(url).await?;
        Ok(page
            .results
            .into_iter()
            .map(|dto| self.movie_from_dto(dto))
            .collect())
    }

    async fn fetch_movie_details(&self, id: MovieId) -> Result<MovieDetails, SourceError> {
        let url = self.endpoint(
            &format!("movie/{}", id),
            &[("append_to_response", "credits".to_string())],
        );
        let dto: DetailsDto = self.get_json(url).await?;
        Ok(details_from_dto(dto))
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SourceError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(SourceError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SourceError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
