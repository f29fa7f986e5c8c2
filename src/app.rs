use crate::cache::CachedCatalog;
use crate::config::{AppConfig, ScreenConfig};
use crate::navigation::{Route, StackNavigator};
use crate::observability::{FailureReporter, TracingReporter};
use crate::screens::{DetailScreen, DetailState, ListState, PopularScreen};
use crate::terminal;
use crate::tmdb::{CatalogApi, TmdbClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The two screens plus the navigation stack between them.
pub struct Browser {
    navigator: Arc<StackNavigator>,
    list: PopularScreen,
    detail: DetailScreen,
}

impl Browser {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        reporter: Arc<dyn FailureReporter>,
        config: ScreenConfig,
    ) -> Self {
        let navigator = Arc::new(StackNavigator::new(Route::Popular));
        let list = PopularScreen::new(Arc::clone(&catalog), Arc::clone(&reporter), config.clone());
        let detail = DetailScreen::new(catalog, reporter, navigator.clone(), config);
        Self {
            navigator,
            list,
            detail,
        }
    }

    pub fn start(&mut self) {
        self.list.activate();
    }

    pub fn navigator(&self) -> &StackNavigator {
        &self.navigator
    }

    pub fn list(&self) -> &PopularScreen {
        &self.list
    }

    pub fn detail(&self) -> &DetailScreen {
        &self.detail
    }

    pub fn list_events(&self) -> watch::Receiver<ListState> {
        self.list.subscribe()
    }

    pub fn detail_events(&self) -> watch::Receiver<DetailState> {
        self.detail.subscribe()
    }

    pub async fn frame(&self) -> String {
        match self.navigator.current().await {
            Route::Popular => terminal::draw_list(&self.list.view()),
            Route::MovieDetail { .. } => {
                terminal::draw_detail(&self.detail.view(), &self.navigator.title().await)
            }
        }
    }

    pub async fn back(&mut self) -> bool {
        if !self.navigator.can_go_back().await {
            return false;
        }
        if let Route::MovieDetail { .. } = self.navigator.current().await {
            self.detail.unmount();
        }
        self.navigator.back().await.is_some()
    }

    pub async fn handle(&mut self, input: &str) -> Control {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => return Control::Quit,
            "b" | "back" => {
                self.back().await;
                return Control::Continue;
            }
            _ => {}
        }
        if self.navigator.current().await != Route::Popular {
            return Control::Continue;
        }
        let Ok(n) = input.parse::<usize>() else {
            return Control::Continue;
        };
        let selected = match n.checked_sub(1) {
            Some(index) => self.list.select_tile(index, &*self.navigator).await,
            None => None,
        };
        match selected {
            Some(route) => {
                self.detail.activate(route);
            }
            None => info!("No movie at position {}", n),
        }
        Control::Continue
    }
}

fn build_catalog(config: &AppConfig) -> Result<Arc<dyn CatalogApi>> {
    let client = TmdbClient::from_config(config)?;
    if config.cache_enabled() {
        info!(
            "Response cache enabled (ttl {}s, capacity {})",
            config.cache_ttl.as_secs(),
            config.cache_capacity
        );
        Ok(Arc::new(CachedCatalog::new(
            client,
            config.cache_ttl,
            config.cache_capacity,
        )))
    } else {
        Ok(Arc::new(client))
    }
}

enum Event {
    Redraw,
    Input(Option<String>),
    Shutdown,
}

pub async fn run_browser() -> Result<()> {
    let config = AppConfig::from_env()?;
    let catalog = build_catalog(&config)?;
    let mut browser = Browser::new(catalog, Arc::new(TracingReporter), config.screen.clone());
    let mut list_rx = browser.list_events();
    let mut detail_rx = browser.detail_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    browser.start();
    loop {
        let _ = list_rx.borrow_and_update();
        let _ = detail_rx.borrow_and_update();
        let frame = browser.frame().await;
        stdout
            .write_all(format!("\n{frame}> ").as_bytes())
            .await
            .context("writing frame failed")?;
        stdout.flush().await.context("flushing stdout failed")?;

        let on_detail = browser.navigator().current().await != Route::Popular;
        let event = tokio::select! {
            _ = next_change(&mut list_rx, &mut detail_rx, on_detail) => Event::Redraw,
            line = lines.next_line() => Event::Input(line.context("reading stdin failed")?),
            _ = &mut shutdown => Event::Shutdown,
        };
        match event {
            Event::Redraw => continue,
            Event::Input(None) | Event::Shutdown => break,
            Event::Input(Some(line)) => {
                if browser.handle(&line).await == Control::Quit {
                    break;
                }
            }
        }
    }
    info!("Browser closed");
    Ok(())
}

async fn next_change(
    list: &mut watch::Receiver<ListState>,
    detail: &mut watch::Receiver<DetailState>,
    on_detail: bool,
) {
    let changed = if on_detail {
        detail.changed().await
    } else {
        list.changed().await
    };
    if changed.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
