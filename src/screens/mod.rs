//! Headless screen view-models. Each screen owns its state in a `watch`
//! channel and at most one in-flight request.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::FetchError;

pub mod detail;
pub mod list;

pub use detail::{DetailPage, DetailPhase, DetailScreen, DetailState, DetailView};
pub use list::{ListPhase, ListState, ListView, PopularScreen};

/// Single-slot in-flight register. Holding a new task aborts the previous one;
/// the generation stored in the screen state guards writes that race the abort.
#[derive(Debug, Default)]
pub(crate) struct RequestSlot {
    task: Option<JoinHandle<()>>,
}

impl RequestSlot {
    pub(crate) fn hold(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.task.replace(handle) {
            previous.abort();
        }
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub(crate) async fn fetch_with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(FetchError::from(err)),
        Err(_) => Err(FetchError::timed_out(timeout)),
    }
}
