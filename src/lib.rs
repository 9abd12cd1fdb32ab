//! # Elymica Portal
//!
//! Session and credential lifecycle for the multi-tenant Elymica portals.
//!
//! A portal sits between the browser and the backend microservices. It signs
//! users in against the external Auth service, keeps their token pair in a
//! signed session cookie, renews it before expiry, and forwards calls to the
//! backend services with the right bearer token and tenant id.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── elymica-core/          # AppError, time helpers
//! ├── elymica-config/        # from_env() configuration structs
//! ├── elymica-models/        # Auth service DTOs, Session, TenantContext
//! ├── elymica-auth/          # Auth client, refresh decisions, coordinator, session store
//! ├── elymica-gateway/       # Per-service API clients with 401 refresh-and-retry
//! └── elymica-observability/ # Logging and Prometheus metrics
//! src/
//! ├── middleware/            # Edge gate, session materialization, role checks
//! └── modules/
//!     ├── auth/              # /login, /api/auth/{login,session,logout}
//!     └── portal/            # /dashboard, /health, /api/services/{service}/{*path}
//! ```
//!
//! ## Session lifecycle
//!
//! ```text
//! Anonymous ──login──▶ Authenticated ──(inside refresh buffer)──▶ rotate
//!                           │                                       │
//!                           │                     ok ◀──────────────┤
//!                           │                                       └──▶ Error{RefreshAccessTokenError}
//!                           └──(no refresh token)──▶ Error{RefreshTokenMissing}
//! ```
//!
//! Proactive renewal (during materialization) and reactive renewal (after a
//! backend `401`) share one [`RefreshCoordinator`](elymica_auth::RefreshCoordinator),
//! so a refresh token is never presented twice.
//!
//! ## Environment Variables
//!
//! ```bash
//! AUTH_SERVICE_BASE_URL=https://auth.elymica.com
//! API_BASE_URL=https://api.elymica.com
//! SESSION_SECRET=your-secure-secret-key
//! PORTAL_ROLES=teacher
//! ```
//!
//! API documentation is served at `/swagger-ui`.

pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;

pub use elymica_auth;
pub use elymica_config;
pub use elymica_core;
pub use elymica_gateway;
pub use elymica_models;
