//! Fetch TMDB catalog records and print them as the screens receive them.
//! Usage:
//!   cargo run --bin catalog_props -- popular
//!   cargo run --bin catalog_props -- movie <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinegrid::card::{render_card, CardLayout};
use cinegrid::config::AppConfig;
use cinegrid::screens::detail::render_page;
use cinegrid::tmdb::{CatalogApi, TmdbClient};
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Endpoint {
    Popular,
    Movie,
}

impl FromStr for Endpoint {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "popular" => Ok(Endpoint::Popular),
            "movie" => Ok(Endpoint::Movie),
            _ => Err(anyhow::anyhow!("endpoint must be 'popular' or 'movie'")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin catalog_props -- popular");
        eprintln!("       cargo run --bin catalog_props -- movie <tmdb_id>");
        std::process::exit(1);
    }

    let endpoint = Endpoint::from_str(&args[1])?;
    let config = AppConfig::from_env()?;
    let client = TmdbClient::from_config(&config)?;
    let image_host = config.screen.image_host.as_str();

    let output = match endpoint {
        Endpoint::Popular => {
            let movies = client.fetch_popular().await?;
            let layout = CardLayout::default();
            let cards: Vec<_> = movies
                .iter()
                .map(|m| {
                    let card = render_card(m, image_host, &layout);
                    json!({
                        "id": card.id,
                        "title": card.title,
                        "rating": card.rating,
                        "year": card.year,
                        "poster_url": card.poster_url,
                    })
                })
                .collect();
            json!({ "raw": movies, "cards": cards })
        }
        Endpoint::Movie => {
            let id: i32 = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("missing tmdb_id for movie"))?
                .parse()
                .context("tmdb_id must be an integer")?;
            let movie = client.fetch_movie(id).await?;
            let page = render_page(&movie, image_host);
            json!({
                "raw": movie,
                "page": {
                    "title": page.title,
                    "rating": page.rating,
                    "info": page.info_line,
                    "genres": page.genres,
                    "tagline": page.tagline,
                    "languages": page.languages,
                    "studios": page.studios,
                    "total_votes": page.total_votes,
                    "poster_url": page.poster_url,
                }
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
