use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::{MovieDetail, MovieSummary};

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const IMAGE_HOST: &str = "https://image.tmdb.org";
pub const POSTER_SIZE: &str = "w500";

/// Read side of the movie catalog. Screens only ever talk to this trait.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_popular(&self) -> Result<Vec<MovieSummary>>;
    async fn fetch_movie(&self, id: i32) -> Result<MovieDetail>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let user_agent = format!("cinegrid/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.api_key.clone(),
            config.api_base.clone(),
            config.screen.request_timeout,
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{path}?api_key={}",
            self.base_url,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let res = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            // The URL carries the API key, so only the path goes into the error.
            return Err(anyhow!("{} -> {} {}", path, status, text));
        }
        let parsed: T = serde_json::from_str(&text)
            .with_context(|| format!("JSON parse failed for {path}"))?;
        Ok(parsed)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn fetch_popular(&self) -> Result<Vec<MovieSummary>> {
        let data: PopularResponse = self.get_json("/movie/popular").await?;
        Ok(data.results)
    }

    async fn fetch_movie(&self, id: i32) -> Result<MovieDetail> {
        let payload: MovieDetailPayload = self.get_json(&format!("/movie/{id}")).await?;
        Ok(map_detail(id, payload))
    }
}

#[derive(Debug, Deserialize)]
struct PopularResponse {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpokenLanguage {
    english_name: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Company {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MovieDetailPayload {
    #[serde(default)]
    id: i32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
    release_date: Option<String>,
    runtime: Option<i32>,
    tagline: Option<String>,
    #[serde(default)]
    vote_count: i64,
    genres: Option<Vec<Genre>>,
    spoken_languages: Option<Vec<SpokenLanguage>>,
    production_companies: Option<Vec<Company>>,
}

fn map_detail(requested_id: i32, payload: MovieDetailPayload) -> MovieDetail {
    let id = if payload.id == 0 {
        requested_id
    } else {
        payload.id
    };
    let spoken_languages = payload
        .spoken_languages
        .unwrap_or_default()
        .into_iter()
        .filter_map(|l| non_empty(l.english_name).or_else(|| non_empty(l.name)))
        .collect();
    MovieDetail {
        id,
        title: payload.title,
        poster_path: non_empty(payload.poster_path),
        vote_average: payload.vote_average,
        overview: payload.overview,
        release_date: non_empty(payload.release_date),
        runtime: payload.runtime,
        tagline: non_empty(payload.tagline),
        vote_count: payload.vote_count,
        genres: payload
            .genres
            .map(|g| g.into_iter().map(|x| x.name).collect())
            .unwrap_or_default(),
        spoken_languages,
        production_companies: payload
            .production_companies
            .map(|c| c.into_iter().map(|x| x.name).collect())
            .unwrap_or_default(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Builds `<image_host>/t/p/w500<poster_path>`. `None` means the tile shows no image.
pub fn poster_url(image_host: &str, poster_path: Option<&str>) -> Option<String> {
    let path = poster_path.map(str::trim).filter(|p| !p.is_empty())?;
    let host = image_host.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{host}/t/p/{POSTER_SIZE}{path}"))
    } else {
        Some(format!("{host}/t/p/{POSTER_SIZE}/{path}"))
    }
}
