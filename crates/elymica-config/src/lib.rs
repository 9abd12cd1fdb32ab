//! # Elymica Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`auth`]: external Auth service location and client timeout
//! - [`session`]: session cookie, signing secret and refresh timing
//! - [`edge`]: public path prefixes, login path and portal roles
//! - [`services`]: backend microservice base URLs
//! - [`server`]: bind address and CORS origins
//!
//! # Example
//!
//! ```ignore
//! use elymica_config::{AuthServiceConfig, EdgeConfig, SessionConfig};
//!
//! let auth_config = AuthServiceConfig::from_env();
//! let session_config = SessionConfig::from_env();
//! let edge_config = EdgeConfig::from_env();
//! ```

pub mod auth;
pub mod edge;
pub mod server;
pub mod services;
pub mod session;

mod env;

pub use auth::AuthServiceConfig;
pub use edge::EdgeConfig;
pub use server::ServerConfig;
pub use services::{Service, ServiceEndpoints};
pub use session::SessionConfig;
