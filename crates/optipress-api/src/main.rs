use std::sync::Arc;

use optipress_api::{setup, state::AppState, telemetry};
use optipress_core::Config;

// Use mimalloc as the global allocator for better performance and lower
// fragmentation, especially when running on musl-based systems inside
// containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(config.clone()).await?);
    let router = setup::routes::build_router(&config, state);

    setup::server::start_server(&config, router).await?;

    Ok(())
}
