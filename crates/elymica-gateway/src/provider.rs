//! Where an [`ApiClient`](crate::ApiClient) gets its credentials from, and whom
//! it tells when they change.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use elymica_models::{Session, SessionError, TokenPair};
use elymica_observability::track_session_error;
use parking_lot::RwLock;

pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
}

pub trait TenantSource: Send + Sync {
    fn tenant_id(&self) -> Option<String>;
}

/// Notifications raised by the reactive refresh path.
pub trait AuthEvents: Send + Sync {
    /// A `401` was recovered from by rotating tokens.
    fn on_token_rotated(&self, tokens: &TokenPair);

    /// A `401` could not be recovered from. The caller should send the user
    /// back to the login page.
    fn on_auth_failed(&self);
}

/// The providers a client is constructed with.
#[derive(Clone)]
pub struct ClientAuthConfig {
    pub tokens: Arc<dyn TokenSource>,
    pub tenant: Arc<dyn TenantSource>,
    pub events: Arc<dyn AuthEvents>,
}

impl ClientAuthConfig {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        tenant: Arc<dyn TenantSource>,
        events: Arc<dyn AuthEvents>,
    ) -> Self {
        Self {
            tokens,
            tenant,
            events,
        }
    }

    /// No tokens, no tenant, events ignored.
    pub fn anonymous() -> Self {
        let none = Arc::new(Anonymous);
        Self::new(none.clone(), none.clone(), none)
    }

    /// Providers backed by a shared [`SessionHandle`].
    pub fn from_session(handle: &SessionHandle) -> Self {
        let handle = Arc::new(handle.clone());
        Self::new(handle.clone(), handle.clone(), handle)
    }
}

impl std::fmt::Debug for ClientAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAuthConfig")
            .field("has_access_token", &self.tokens.access_token().is_some())
            .field("tenant_id", &self.tenant.tenant_id())
            .finish()
    }
}

struct Anonymous;

impl TokenSource for Anonymous {
    fn access_token(&self) -> Option<String> {
        None
    }

    fn refresh_token(&self) -> Option<String> {
        None
    }
}

impl TenantSource for Anonymous {
    fn tenant_id(&self) -> Option<String> {
        None
    }
}

impl AuthEvents for Anonymous {
    fn on_token_rotated(&self, _tokens: &TokenPair) {}

    fn on_auth_failed(&self) {}
}

/// A request-scoped, shared view of the current session.
///
/// Clones share state. Rotations and unrecoverable `401`s reported through
/// [`AuthEvents`] are written back into the session (last write wins) so that
/// the caller can persist the outcome after the request completes.
#[derive(Clone, Default)]
pub struct SessionHandle {
    session: Arc<RwLock<Option<Session>>>,
    auth_failed: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            auth_failed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn replace(&self, session: Option<Session>) {
        *self.session.write() = session;
    }

    /// `true` once a client reported an unrecoverable `401`.
    pub fn auth_failed(&self) -> bool {
        self.auth_failed.load(Ordering::SeqCst)
    }
}

impl TokenSource for SessionHandle {
    fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .as_ref()
            .map(|s| s.tokens.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .as_ref()
            .and_then(|s| s.tokens.refresh_token.clone())
    }
}

impl TenantSource for SessionHandle {
    fn tenant_id(&self) -> Option<String> {
        self.session
            .read()
            .as_ref()
            .map(|s| s.principal.tenant_id.to_string())
    }
}

impl AuthEvents for SessionHandle {
    fn on_token_rotated(&self, tokens: &TokenPair) {
        if let Some(session) = self.session.write().as_mut() {
            session.tokens = tokens.clone();
            session.error = None;
        }
    }

    /// Tags the session so that it is persisted in the error state and the
    /// user has to sign in again.
    fn on_auth_failed(&self) {
        self.auth_failed.store(true, Ordering::SeqCst);

        let mut slot = self.session.write();
        if let Some(session) = slot.as_mut().filter(|s| s.error.is_none()) {
            let error = if session.tokens.has_refresh_token() {
                SessionError::RefreshAccessTokenError
            } else {
                SessionError::RefreshTokenMissing
            };
            track_session_error(error.as_str());
            session.error = Some(error);
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("present", &self.session.read().is_some())
            .field("auth_failed", &self.auth_failed())
            .finish()
    }
}
