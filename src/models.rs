use serde::{Deserialize, Serialize};

/// One entry of the popular-movies listing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovieSummary {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Full record shown on the detail screen.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub overview: String,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub tagline: Option<String>,
    pub vote_count: i64,
    pub genres: Vec<String>,
    pub spoken_languages: Vec<String>,
    pub production_companies: Vec<String>,
}
