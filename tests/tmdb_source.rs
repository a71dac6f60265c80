//! HTTP source tests against a mock TMDB server.

use marquee::source::{CatalogSource, SourceError, TmdbSettings, TmdbSource, MAX_RESPONSE_SIZE};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer, token: Option<&str>) -> TmdbSource {
    let settings = TmdbSettings {
        base_url: format!("{}/3", server.uri()),
        image_base_url: "https://image.tmdb.org/t/p".to_string(),
        api_token: token.map(|t| SecretString::from(t.to_string())),
        language: "en-US".to_string(),
        timeout: Duration::from_secs(5),
    };
    TmdbSource::new(settings).unwrap()
}

#[tokio::test]
async fn test_fetch_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/genre/movie/list"))
        .and(query_param("language", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [
                {"id": 28, "name": "Action"},
                {"id": 18, "name": "Drama"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let genres = source_for(&server, None).fetch_genres().await.unwrap();
    let names: Vec<(i64, &str)> = genres.iter().map(|g| (g.id, &*g.name)).collect();
    assert_eq!(names, vec![(28, "Action"), (18, "Drama")]);
}

#[tokio::test]
async fn test_fetch_top_movies_requests_page_and_builds_image_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/top_rated"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "results": [
                {
                    "id": 238,
                    "title": "The Godfather",
                    "overview": "Spanning the years 1945 to 1955...",
                    "poster_path": "/3bhkrj58Vtu7enYsRolD1fZdja1.jpg",
                    "backdrop_path": "/tmU7GeKVybMWFButWEGl2M4GeiP.jpg",
                    "vote_average": 8.7,
                    "genre_ids": [18, 80]
                },
                {
                    "id": 999,
                    "title": "No Art",
                    "vote_average": 7.1,
                    "genre_ids": []
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let movies = source_for(&server, None).fetch_top_movies(2).await.unwrap();
    assert_eq!(movies.len(), 2);

    let godfather = &movies[0];
    assert_eq!(godfather.id, 238);
    assert_eq!(&*godfather.title, "The Godfather");
    assert_eq!(godfather.vote_average, 8.7);
    assert_eq!(godfather.genre_ids, vec![18, 80]);
    assert_eq!(
        godfather.poster.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/3bhkrj58Vtu7enYsRolD1fZdja1.jpg")
    );
    assert_eq!(
        godfather.poster_full.as_deref(),
        Some("https://image.tmdb.org/t/p/original/3bhkrj58Vtu7enYsRolD1fZdja1.jpg")
    );
    assert_eq!(
        godfather.backdrop.as_deref(),
        Some("https://image.tmdb.org/t/p/w780/tmU7GeKVybMWFButWEGl2M4GeiP.jpg")
    );

    let bare = &movies[1];
    assert_eq!(bare.poster, None);
    assert_eq!(&*bare.overview, "");
}

#[tokio::test]
async fn test_fetch_details_with_credits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/238"))
        .and(query_param("append_to_response", "credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 238,
            "production_companies": [
                {"id": 4, "name": "Paramount Pictures"},
                {"id": 10211, "name": "Alfran Productions"}
            ],
            "credits": {
                "cast": [
                    {"name": "Marlon Brando"},
                    {"name": "Al Pacino"}
                ],
                "crew": [
                    {"name": "Mario Puzo", "job": "Screenplay"},
                    {"name": "Francis Ford Coppola", "job": "Director"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let details = source_for(&server, None)
        .fetch_movie_details(238)
        .await
        .unwrap();
    assert_eq!(details.production_company.as_deref(), Some("Paramount Pictures"));
    assert_eq!(details.director.as_deref(), Some("Francis Ford Coppola"));
    assert_eq!(details.actors, vec!["Marlon Brando", "Al Pacino"]);
}

#[tokio::test]
async fn test_missing_movie_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = source_for(&server, None).fetch_movie_details(1).await;
    assert!(matches!(result, Err(SourceError::NotFound)));
}

#[tokio::test]
async fn test_server_error_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = source_for(&server, None).fetch_top_movies(1).await;
    assert!(matches!(result, Err(SourceError::HttpStatus(503))));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = source_for(&server, None).fetch_genres().await;
    assert!(matches!(result, Err(SourceError::Decode(_))));
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"genres": []})))
        .expect(1)
        .mount(&server)
        .await;

    let genres = source_for(&server, Some("secret-token"))
        .fetch_genres()
        .await
        .unwrap();
    assert!(genres.is_empty());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = MockServer::start().await;
    let body = "x".repeat(MAX_RESPONSE_SIZE + 1);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let result = source_for(&server, None).fetch_top_movies(1).await;
    assert!(matches!(result, Err(SourceError::ResponseTooLarge(_))));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"genres": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let settings = TmdbSettings {
        base_url: server.uri(),
        timeout: Duration::from_millis(200),
        ..TmdbSettings::default()
    };
    let result = TmdbSource::new(settings).unwrap().fetch_genres().await;
    assert!(matches!(result, Err(SourceError::Timeout)));
}

#[test]
fn test_plain_http_remote_rejected() {
    let settings = TmdbSettings {
        base_url: "http://api.example.com/3".to_string(),
        ..TmdbSettings::default()
    };
    assert!(matches!(
        TmdbSource::new(settings),
        Err(SourceError::InsecureBaseUrl)
    ));
}
