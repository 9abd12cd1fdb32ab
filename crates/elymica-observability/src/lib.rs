//! Elymica observability.
//!
//! - [`basic_logging`]: console `tracing` subscriber
//! - [`logging`]: per-request logging middleware for axum
//! - [`metrics`]: Prometheus recorder and session-lifecycle counters
//!
//! Metrics can be switched off at runtime with `OBSERVABILITY_ENABLED=false`;
//! the tracking helpers then become no-ops.
//!
//! ```no_run
//! use elymica_observability::{init_basic_console_logging, init_metrics};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_basic_console_logging();
//!     let _handle = init_metrics();
//! }
//! ```

pub mod basic_logging;
pub mod logging;
pub mod metrics;

pub use basic_logging::init_basic_console_logging;
pub use logging::logging_middleware;
pub use metrics::{
    PrometheusHandle, RefreshOutcome, RefreshTrigger, init_metrics, is_observability_enabled,
    metrics_app, metrics_middleware, track_edge_redirect, track_login_failure,
    track_login_success, track_session_error, track_token_refresh,
};
