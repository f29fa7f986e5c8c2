use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{fetch_with_timeout, RequestSlot};
use crate::card::{render_card, CardLayout, MovieCard};
use crate::config::{ErrorDisplay, ScreenConfig};
use crate::error::FetchError;
use crate::models::MovieSummary;
use crate::navigation::{Navigator, Route};
use crate::observability::FailureReporter;
use crate::tmdb::CatalogApi;

pub const LIST_HEADER: &str = "Popular Movies";
const LIST_ERROR: &str = "Couldn't load popular movies.";

#[derive(Debug, Clone, PartialEq)]
pub enum ListPhase {
    Idle,
    Loading,
    Ready(Vec<MovieSummary>),
    Failed(FetchError),
}

#[derive(Debug, Clone)]
pub struct ListState {
    generation: u64,
    phase: ListPhase,
}

impl ListState {
    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ListPhase::Loading)
    }

    pub fn movies(&self) -> &[MovieSummary] {
        match &self.phase {
            ListPhase::Ready(movies) => movies,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Grid { header: String, tiles: Vec<MovieCard> },
    Error { message: String },
}

impl ListView {
    pub fn tiles(&self) -> &[MovieCard] {
        match self {
            ListView::Grid { tiles, .. } => tiles,
            _ => &[],
        }
    }
}

pub fn render_list(state: &ListState, image_host: &str, layout: &CardLayout) -> ListView {
    match &state.phase {
        ListPhase::Idle | ListPhase::Loading => ListView::Loading,
        ListPhase::Ready(movies) => ListView::Grid {
            header: LIST_HEADER.to_string(),
            tiles: movies
                .iter()
                .map(|m| render_card(m, image_host, layout))
                .collect(),
        },
        ListPhase::Failed(_) => ListView::Error {
            message: LIST_ERROR.to_string(),
        },
    }
}

/// Popular-movies grid. One fetch per mount; failures never leave it loading.
pub struct PopularScreen {
    catalog: Arc<dyn CatalogApi>,
    reporter: Arc<dyn FailureReporter>,
    config: ScreenConfig,
    layout: CardLayout,
    state: Arc<watch::Sender<ListState>>,
    slot: RequestSlot,
}

impl PopularScreen {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        reporter: Arc<dyn FailureReporter>,
        config: ScreenConfig,
    ) -> Self {
        let (state, _) = watch::channel(ListState {
            generation: 0,
            phase: ListPhase::Idle,
        });
        Self {
            catalog,
            reporter,
            config,
            layout: CardLayout::default(),
            state: Arc::new(state),
            slot: RequestSlot::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> ListView {
        render_list(&self.state.borrow(), &self.config.image_host, &self.layout)
    }

    /// Starts the one fetch of this mount. Calling it again while mounted does
    /// nothing. Must run inside a Tokio runtime.
    pub fn activate(&mut self) {
        let mut ticket = None;
        self.state.send_if_modified(|s| {
            if s.phase != ListPhase::Idle {
                return false;
            }
            s.generation += 1;
            s.phase = ListPhase::Loading;
            ticket = Some(s.generation);
            true
        });
        let Some(ticket) = ticket else {
            debug!("Popular screen already mounted, skipping fetch");
            return;
        };

        info!("Fetching popular movies");
        let catalog = Arc::clone(&self.catalog);
        let reporter = Arc::clone(&self.reporter);
        let state = Arc::clone(&self.state);
        let timeout = self.config.request_timeout;
        let display = self.config.error_display;
        let handle = tokio::spawn(async move {
            let result = fetch_with_timeout(timeout, catalog.fetch_popular()).await;
            apply_result(&state, ticket, result, display, reporter.as_ref());
        });
        self.slot.hold(handle);
    }

    /// Drops any in-flight request and returns to `Idle`.
    pub fn unmount(&mut self) {
        self.slot.cancel();
        self.state.send_modify(|s| {
            s.generation += 1;
            s.phase = ListPhase::Idle;
        });
    }

    pub fn in_flight(&self) -> bool {
        self.slot.in_flight()
    }

    /// Route for the tile at `index`, if the grid has one there.
    pub fn route_for(&self, index: usize) -> Option<Route> {
        self.state
            .borrow()
            .movies()
            .get(index)
            .map(|m| Route::MovieDetail { id: m.id })
    }

    pub async fn select_tile(&self, index: usize, navigator: &dyn Navigator) -> Option<Route> {
        let route = self.route_for(index)?;
        navigator.navigate(route).await;
        Some(route)
    }
}

fn apply_result(
    state: &watch::Sender<ListState>,
    ticket: u64,
    result: Result<Vec<MovieSummary>, FetchError>,
    display: ErrorDisplay,
    reporter: &dyn FailureReporter,
) {
    let mut failure = None;
    let mut loaded = None;
    let applied = state.send_if_modified(|s| {
        if s.generation != ticket {
            return false;
        }
        s.phase = match result {
            Ok(movies) => {
                loaded = Some(movies.len());
                ListPhase::Ready(movies)
            }
            Err(err) => {
                let phase = match display {
                    ErrorDisplay::Silent => ListPhase::Ready(Vec::new()),
                    ErrorDisplay::Explicit => ListPhase::Failed(err.clone()),
                };
                failure = Some(err);
                phase
            }
        };
        true
    });
    if !applied {
        debug!(ticket, "Dropping stale popular movies response");
        return;
    }
    if let Some(count) = loaded {
        info!("Loaded {} popular movies", count);
    }
    if let Some(err) = failure {
        reporter.report("popular movies", &err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl FailureReporter for Recorder {
        fn report(&self, context: &str, err: &FetchError) {
            self.0.lock().unwrap().push(format!("{context}: {err}"));
        }
    }

    fn loading_state(generation: u64) -> watch::Sender<ListState> {
        let (tx, _) = watch::channel(ListState {
            generation,
            phase: ListPhase::Loading,
        });
        tx
    }

    fn failed() -> Result<Vec<MovieSummary>, FetchError> {
        Err(FetchError::FetchFailed {
            reason: "503".to_string(),
        })
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let state = loading_state(2);
        let recorder = Recorder::default();
        apply_result(&state, 1, Ok(Vec::new()), ErrorDisplay::Silent, &recorder);
        assert!(state.borrow().is_loading());
        apply_result(&state, 1, failed(), ErrorDisplay::Silent, &recorder);
        assert!(state.borrow().is_loading());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn silent_failure_is_an_empty_grid() {
        let state = loading_state(1);
        let recorder = Recorder::default();
        apply_result(&state, 1, failed(), ErrorDisplay::Silent, &recorder);
        assert_eq!(state.borrow().phase(), &ListPhase::Ready(Vec::new()));
        let view = render_list(&state.borrow(), "http://img", &CardLayout::default());
        assert_eq!(
            view,
            ListView::Grid {
                header: LIST_HEADER.to_string(),
                tiles: Vec::new()
            }
        );
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["popular movies: fetch failed: 503".to_string()]
        );
    }

    #[test]
    fn explicit_failure_renders_error() {
        let state = loading_state(1);
        let recorder = Recorder::default();
        apply_result(&state, 1, failed(), ErrorDisplay::Explicit, &recorder);
        let view = render_list(&state.borrow(), "http://img", &CardLayout::default());
        assert_eq!(
            view,
            ListView::Error {
                message: LIST_ERROR.to_string()
            }
        );
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }
}
