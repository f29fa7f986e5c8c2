use anyhow::Result;
use cinegrid::observability::init_tracing;
use dotenvy::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = dotenv();
    init_tracing();
    match loaded {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    cinegrid::app::run_browser().await
}
