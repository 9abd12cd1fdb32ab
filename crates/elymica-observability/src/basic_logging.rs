use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console logging.
///
/// - **Log Level**: `RUST_LOG` when set, otherwise `LOG_LEVEL` (default: "info")
///   for the Elymica crates with noisy dependencies held at warn
/// - **Format**: compact with ANSI colors, or JSON lines when `LOG_FORMAT=json`
///
/// Calling this twice is harmless: the second initialization is ignored.
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "elymica={level},elymica_auth={level},elymica_gateway={level},\
                 elymica_observability={level},tower_http=warn,hyper=warn,reqwest=warn",
                level = log_level
            ))
        })
    };

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        let layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(env_filter());
        tracing_subscriber::registry().with(layer).try_init()
    } else {
        let layer = fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .with_filter(env_filter());
        tracing_subscriber::registry().with(layer).try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
