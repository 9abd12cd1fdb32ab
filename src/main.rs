use dotenvy::dotenv;
use elymica::router::init_router;
use elymica::state::init_app_state;
use elymica_observability::{init_basic_console_logging, init_metrics, is_observability_enabled};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_basic_console_logging();

    let metrics = if is_observability_enabled() {
        init_metrics()
    } else {
        None
    };

    let state = match init_app_state() {
        Ok(state) => state.with_metrics(metrics),
        Err(e) => {
            error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    let address = state.server_config.bind_address();
    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %address, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(address = %address, "Portal listening");
    info!("Swagger UI available at http://{}/swagger-ui", address);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
