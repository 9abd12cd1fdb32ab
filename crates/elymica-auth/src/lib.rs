//! # Elymica Auth
//!
//! Credential lifecycle for the Elymica portals.
//!
//! - [`client`]: [`AuthClient`], the HTTP wrapper over the external Auth service
//! - [`refresh`]: pure refresh decisions ([`should_refresh`])
//! - [`coordinator`]: [`RefreshCoordinator`], single-flight token rotation shared
//!   by the session pipeline and the API gateway
//! - [`codec`]: signed encoding of a [`Session`](elymica_models::Session)
//! - [`store`]: [`SessionStore`], the per-request session state machine
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use elymica_auth::{AuthClient, RefreshCoordinator, SessionStore};
//! use elymica_config::{AuthServiceConfig, SessionConfig};
//!
//! let session_config = SessionConfig::from_env();
//! let auth = Arc::new(AuthClient::new(&AuthServiceConfig::from_env())?);
//! let coordinator = Arc::new(RefreshCoordinator::new(auth.clone(), session_config.refresh_grace));
//! let store = SessionStore::new(auth, coordinator, &session_config);
//!
//! let session = store.sign_in(&credential).await?;
//! let cookie = store.codec().encode(&session, now_millis())?;
//! ```

pub mod client;
pub mod codec;
pub mod coordinator;
pub mod error;
pub mod refresh;
pub mod store;

pub use client::{AuthClient, SignedIn};
pub use codec::SessionCodec;
pub use coordinator::{RefreshCoordinator, Rotation, TokenRefresher};
pub use error::AuthError;
pub use refresh::{DEFAULT_REFRESH_BUFFER_MS, needs_reauthentication, should_refresh};
pub use store::SessionStore;
