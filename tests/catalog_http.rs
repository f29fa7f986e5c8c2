use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cinegrid::config::{ErrorDisplay, ScreenConfig};
use cinegrid::observability::TracingReporter;
use cinegrid::screens::PopularScreen;
use cinegrid::tmdb::{CatalogApi, TmdbClient};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const API_KEY: &str = "test key";

#[derive(Deserialize)]
struct KeyQuery {
    api_key: Option<String>,
}

async fn movie_route(Path(id): Path<String>, Query(q): Query<KeyQuery>) -> Response {
    if q.api_key.as_deref() != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key.",
                "success": false
            })),
        )
            .into_response();
    }
    match id.as_str() {
        "popular" => Json(json!({
            "page": 1,
            "results": [
                {
                    "id": 1,
                    "title": "A",
                    "poster_path": "/a.jpg",
                    "vote_average": 7.25,
                    "overview": "First.",
                    "release_date": "2024-06-01"
                },
                {
                    "id": 2,
                    "title": "B",
                    "poster_path": "/b.jpg",
                    "vote_average": 6.1,
                    "overview": "Second.",
                    "release_date": "2023-01-15"
                }
            ],
            "total_pages": 1,
            "total_results": 2
        }))
        .into_response(),
        "42" => Json(json!({
            "id": 42,
            "title": "X",
            "overview": "Plot.",
            "poster_path": "/x.jpg",
            "vote_average": 7.05,
            "vote_count": 15234,
            "release_date": "2020-05-01",
            "runtime": 120,
            "tagline": "",
            "genres": [{ "id": 18, "name": "Drama" }, { "id": 53, "name": "Thriller" }],
            "spoken_languages": [{ "english_name": "English", "iso_639_1": "en", "name": "English" }],
            "production_companies": [{ "id": 1, "name": "A24", "origin_country": "US" }]
        }))
        .into_response(),
        "13" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status_code": 34,
                "status_message": "The resource you requested could not be found.",
                "success": false
            })),
        )
            .into_response(),
    }
}

async fn spawn_fake_tmdb() -> String {
    let app = Router::new().route("/3/movie/:id", get(movie_route));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake tmdb");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake tmdb server");
    });
    format!("http://{addr}/3")
}

fn client(base: &str, key: &str) -> TmdbClient {
    TmdbClient::new(key, base, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn fetches_popular_movies_in_order() {
    let base = spawn_fake_tmdb().await;
    let movies = client(&base, API_KEY).fetch_popular().await.unwrap();
    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert_eq!(movies[0].poster_path.as_deref(), Some("/a.jpg"));
    assert_eq!(movies[1].release_date.as_deref(), Some("2023-01-15"));
}

#[tokio::test]
async fn fetches_and_maps_movie_detail() {
    let base = spawn_fake_tmdb().await;
    let movie = client(&base, API_KEY).fetch_movie(42).await.unwrap();
    assert_eq!(movie.id, 42);
    assert_eq!(movie.title, "X");
    assert_eq!(movie.runtime, Some(120));
    assert_eq!(movie.vote_count, 15234);
    assert!(movie.tagline.is_none());
    assert_eq!(movie.genres, vec!["Drama", "Thriller"]);
    assert_eq!(movie.spoken_languages, vec!["English"]);
    assert_eq!(movie.production_companies, vec!["A24"]);
}

#[tokio::test]
async fn http_errors_surface_without_leaking_key() {
    let base = spawn_fake_tmdb().await;
    let err = client(&base, API_KEY).fetch_movie(999).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("/movie/999"), "{msg}");
    assert!(msg.contains("404"), "{msg}");
    assert!(!msg.contains("api_key"), "{msg}");

    let err = client(&base, "wrong").fetch_popular().await.unwrap_err();
    assert!(format!("{err:#}").contains("401"));
}

#[tokio::test]
async fn undecodable_body_is_an_error() {
    let base = spawn_fake_tmdb().await;
    let err = client(&base, API_KEY).fetch_movie(13).await.unwrap_err();
    assert!(format!("{err:#}").contains("JSON parse failed"));
}

#[tokio::test]
async fn unreachable_host_is_an_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = client(&format!("http://{addr}/3"), API_KEY)
        .fetch_popular()
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("request to /movie/popular failed"));
}

#[tokio::test]
async fn popular_screen_over_http() {
    let base = spawn_fake_tmdb().await;
    let catalog: Arc<dyn CatalogApi> = Arc::new(client(&base, API_KEY));
    let mut screen = PopularScreen::new(
        catalog,
        Arc::new(TracingReporter),
        ScreenConfig {
            image_host: "http://img.test".to_string(),
            request_timeout: Duration::from_secs(5),
            error_display: ErrorDisplay::Silent,
        },
    );
    screen.activate();
    let mut rx = screen.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_loading()))
        .await
        .expect("timed out")
        .expect("sender dropped");

    let view = screen.view();
    let tiles = view.tiles();
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[0].poster_url.as_deref(), Some("http://img.test/t/p/w500/a.jpg"));
    assert_eq!(tiles[0].rating, "7.3");
    assert_eq!(tiles[1].year.as_deref(), Some("2023"));
}
