//! Request pipeline ahead of the portal handlers.
//!
//! Layer order, outermost first:
//!
//! 1. [`edge`]: tenant header and [`TenantContext`](elymica_models::TenantContext)
//!    from the host, public/protected classification, redirect to login when a
//!    protected path has no valid session
//! 2. [`session`]: decodes the session cookie, runs the refresh state machine
//!    and hands handlers a request-scoped [`SessionHandle`](elymica_gateway::SessionHandle);
//!    writes the cookie back when the session changed
//!
//! Handlers then pick the session up through the [`session::CurrentSession`] or
//! [`session::AuthenticatedSession`] extractors.

pub mod edge;
pub mod role;
pub mod session;
