use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{fetch_with_timeout, RequestSlot};
use crate::card::{format_rating, release_year, star_label, thousands};
use crate::config::{ErrorDisplay, ScreenConfig};
use crate::error::FetchError;
use crate::models::MovieDetail;
use crate::navigation::{Navigator, Route};
use crate::observability::FailureReporter;
use crate::tmdb::{poster_url, CatalogApi};

pub const LOADING_TEXT: &str = "Loading...";
const DETAIL_ERROR: &str = "Couldn't load this movie.";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPhase {
    Idle,
    Loading,
    Ready(MovieDetail),
    Failed(FetchError),
}

#[derive(Debug, Clone)]
pub struct DetailState {
    generation: u64,
    movie_id: Option<i32>,
    phase: DetailPhase,
}

impl DetailState {
    pub fn movie_id(&self) -> Option<i32> {
        self.movie_id
    }

    pub fn phase(&self) -> &DetailPhase {
        &self.phase
    }

    pub fn movie(&self) -> Option<&MovieDetail> {
        match &self.phase {
            DetailPhase::Ready(movie) => Some(movie),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, DetailPhase::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub poster_url: Option<String>,
    pub title: String,
    pub rating: String,
    pub rating_label: String,
    pub year: Option<String>,
    /// "2020 • 120 min"
    pub info_line: String,
    pub genres: String,
    /// Already wrapped in quotes.
    pub tagline: Option<String>,
    pub overview: String,
    pub languages: String,
    pub studios: String,
    pub total_votes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    Page(Box<DetailPage>),
    Error { message: String },
}

pub fn render_page(movie: &MovieDetail, image_host: &str) -> DetailPage {
    let rating = format_rating(movie.vote_average);
    let year = movie.release_date.as_deref().and_then(release_year);
    let mut info = Vec::new();
    if let Some(y) = &year {
        info.push(y.clone());
    }
    if let Some(runtime) = movie.runtime {
        info.push(format!("{runtime} min"));
    }
    DetailPage {
        poster_url: poster_url(image_host, movie.poster_path.as_deref()),
        title: movie.title.clone(),
        rating_label: star_label(&rating),
        rating,
        year,
        info_line: info.join(" • "),
        genres: movie.genres.join(", "),
        tagline: movie.tagline.as_ref().map(|t| format!("\"{t}\"")),
        overview: movie.overview.clone(),
        languages: movie.spoken_languages.join(", "),
        studios: movie.production_companies.join(", "),
        total_votes: format!("{} ratings", thousands(movie.vote_count)),
    }
}

pub fn render_detail(state: &DetailState, image_host: &str) -> DetailView {
    match &state.phase {
        DetailPhase::Idle | DetailPhase::Loading => DetailView::Loading,
        DetailPhase::Ready(movie) => DetailView::Page(Box::new(render_page(movie, image_host))),
        DetailPhase::Failed(_) => DetailView::Error {
            message: DETAIL_ERROR.to_string(),
        },
    }
}

/// Single-movie page keyed by the route's id. A newer id always wins over
/// responses still in flight for an older one.
pub struct DetailScreen {
    catalog: Arc<dyn CatalogApi>,
    reporter: Arc<dyn FailureReporter>,
    navigator: Arc<dyn Navigator>,
    config: ScreenConfig,
    state: Arc<watch::Sender<DetailState>>,
    slot: RequestSlot,
}

impl DetailScreen {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        reporter: Arc<dyn FailureReporter>,
        navigator: Arc<dyn Navigator>,
        config: ScreenConfig,
    ) -> Self {
        let (state, _) = watch::channel(DetailState {
            generation: 0,
            movie_id: None,
            phase: DetailPhase::Idle,
        });
        Self {
            catalog,
            reporter,
            navigator,
            config,
            state: Arc::new(state),
            slot: RequestSlot::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> DetailView {
        render_detail(&self.state.borrow(), &self.config.image_host)
    }

    /// Mounts the screen for `route`. Returns false when the route carries no movie id.
    pub fn activate(&mut self, route: Route) -> bool {
        match route.movie_id() {
            Some(id) => {
                self.set_movie_id(id);
                true
            }
            None => {
                warn!(?route, "Detail screen activated without a movie id");
                false
            }
        }
    }

    /// Fetches `id` unless it is already the mounted id.
    pub fn set_movie_id(&mut self, id: i32) {
        let mut ticket = None;
        self.state.send_if_modified(|s| {
            if s.movie_id == Some(id) && s.phase != DetailPhase::Idle {
                return false;
            }
            s.generation += 1;
            s.movie_id = Some(id);
            s.phase = DetailPhase::Loading;
            ticket = Some(s.generation);
            true
        });
        let Some(ticket) = ticket else {
            debug!(movie_id = id, "Movie already mounted, skipping fetch");
            return;
        };

        info!(movie_id = id, "Fetching movie details");
        let catalog = Arc::clone(&self.catalog);
        let reporter = Arc::clone(&self.reporter);
        let navigator = Arc::clone(&self.navigator);
        let state = Arc::clone(&self.state);
        let timeout = self.config.request_timeout;
        let display = self.config.error_display;
        let handle = tokio::spawn(async move {
            let result = fetch_with_timeout(timeout, catalog.fetch_movie(id)).await;
            // The title lands before the record so any redraw on Ready sees both.
            if let Ok(movie) = &result {
                let current = state.borrow().generation == ticket;
                if current {
                    navigator
                        .set_title(Route::MovieDetail { id }, &movie.title)
                        .await;
                }
            }
            match apply_result(&state, ticket, result, display) {
                Outcome::Loaded => {}
                Outcome::Failed(err) => {
                    reporter.report(&format!("movie {id}"), &err);
                }
                Outcome::Stale => {
                    debug!(movie_id = id, ticket, "Dropping stale movie response");
                }
            }
        });
        self.slot.hold(handle);
    }

    pub fn unmount(&mut self) {
        self.slot.cancel();
        self.state.send_modify(|s| {
            s.generation += 1;
            s.movie_id = None;
            s.phase = DetailPhase::Idle;
        });
    }

    pub fn in_flight(&self) -> bool {
        self.slot.in_flight()
    }
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Loaded,
    Failed(FetchError),
    Stale,
}

fn apply_result(
    state: &watch::Sender<DetailState>,
    ticket: u64,
    result: Result<MovieDetail, FetchError>,
    display: ErrorDisplay,
) -> Outcome {
    let mut outcome = Outcome::Stale;
    state.send_if_modified(|s| {
        if s.generation != ticket {
            return false;
        }
        match result {
            Ok(movie) => {
                info!(movie_id = movie.id, "Loaded '{}'", movie.title);
                outcome = Outcome::Loaded;
                s.phase = DetailPhase::Ready(movie);
                true
            }
            Err(err) => {
                outcome = Outcome::Failed(err.clone());
                match display {
                    // The placeholder stays up; nothing to publish.
                    ErrorDisplay::Silent => false,
                    ErrorDisplay::Explicit => {
                        s.phase = DetailPhase::Failed(err);
                        true
                    }
                }
            }
        }
    });
    outcome
}
