use api::bootstrap::bootstrap_vm_writer;
use api::create_vm_writer_router;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    let config = config::Config::from_env();
    api::telemetry::init_tracing(&config.logging);

    let startup = tracing::info_span!("startup", invocation_id = "startup");
    let app_state = match bootstrap_vm_writer(&config).instrument(startup).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(invocation_id = "startup", "FATAL startup failure: {:#}", e);
            return Err(e);
        }
    };

    api::serve(create_vm_writer_router(app_state), &config.server).await
}
