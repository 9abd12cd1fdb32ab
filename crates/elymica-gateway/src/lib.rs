//! # Elymica Gateway
//!
//! HTTP clients for the backend microservices.
//!
//! Every [`ApiClient`] is bound to one [`Service`](elymica_config::Service) and an
//! explicit [`ClientAuthConfig`]: where the access/refresh tokens and tenant id
//! come from, and who is told when tokens rotate or authentication is lost.
//! Outbound calls carry `Authorization: Bearer <token>` and `X-Tenant-ID` when
//! those are known. A `401` triggers at most one refresh-and-replay per
//! logical request.
//!
//! ```ignore
//! let factory = GatewayFactory::new(ServiceEndpoints::from_env(), coordinator)?;
//! let handle = SessionHandle::new(Some(session));
//! let lms = factory.client(Service::Lms, ClientAuthConfig::from_session(&handle));
//!
//! let courses: Vec<Course> = lms.get_json("/api/lms/courses").await?;
//! ```

pub mod attempt;
pub mod client;
pub mod error;
pub mod factory;
pub mod provider;
pub mod request;

pub use attempt::Attempt;
pub use client::{ApiClient, ApiResponse, TENANT_ID_HEADER};
pub use error::GatewayError;
pub use factory::GatewayFactory;
pub use provider::{AuthEvents, ClientAuthConfig, SessionHandle, TenantSource, TokenSource};
pub use request::ApiRequest;
