use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. JSON output carries the fields
/// of the current span, so every line logged while handling a request
/// includes its `invocation_id`.
pub fn init_tracing(config: &config::LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{level},api={level},services={level},database={level}",
            level = config.level
        )
        .into()
    });

    let json = config.is_json().then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
    });
    let pretty = (!config.is_json()).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}
