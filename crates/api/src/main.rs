use api::bootstrap::bootstrap_item_service;
use api::create_item_router;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
        eprintln!("Continuing with environment variables...");
    }

    let config = config::Config::from_env();
    api::telemetry::init_tracing(&config.logging);

    let startup = tracing::info_span!("startup", invocation_id = "startup");
    let app_state = match bootstrap_item_service(&config).instrument(startup).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(invocation_id = "startup", "FATAL startup failure: {:#}", e);
            return Err(e);
        }
    };

    api::serve(create_item_router(app_state), &config.server).await
}
