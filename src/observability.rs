use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::error::FetchError;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Sink for fetch failures. Failures go here and never to the render tree
/// unless the screen is configured to show them.
pub trait FailureReporter: Send + Sync {
    fn report(&self, context: &str, err: &FetchError);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, context: &str, err: &FetchError) {
        error!(context = %context, reason = %err.reason(), "Fetch failed");
    }
}
