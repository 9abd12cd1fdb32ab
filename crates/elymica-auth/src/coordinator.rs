//! Single-flight token rotation.
//!
//! Refresh tokens rotate on every use, so two callers refreshing the same
//! token independently means the second one presents an already invalidated
//! token. [`RefreshCoordinator`] collapses concurrent refreshes of one token
//! into a single backend call and shares its result. A successful rotation is
//! kept for a short grace window so that a request which read the old token
//! just before the rotation landed still receives the new pair.
//!
//! Failed rotations are forgotten as soon as they complete; the next request
//! gets a fresh attempt.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use elymica_models::TokenPair;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::client::AuthClient;
use crate::error::AuthError;

/// Exchanges a refresh token for a new token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Like [`rotate`](Self::rotate), also telling whether the pair came from a
    /// rotation someone else started. Plain refreshers never share.
    async fn rotation(&self, refresh_token: &str) -> Result<Rotation, AuthError> {
        self.rotate(refresh_token).await.map(|tokens| Rotation {
            tokens,
            shared: false,
        })
    }
}

#[async_trait]
impl TokenRefresher for AuthClient {
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.refresh(refresh_token).await
    }
}

type Flight = Arc<OnceCell<Result<TokenPair, AuthError>>>;

struct Entry {
    flight: Flight,
    started: Instant,
}

/// A completed rotation as seen by one caller.
#[derive(Debug, Clone)]
pub struct Rotation {
    pub tokens: TokenPair,
    /// `true` when this caller joined a rotation started by someone else.
    pub shared: bool,
}

pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    flights: Mutex<HashMap<String, Entry>>,
    grace: Duration,
}

impl RefreshCoordinator {
    pub fn new(refresher: Arc<dyn TokenRefresher>, grace: Duration) -> Self {
        Self {
            refresher,
            flights: Mutex::new(HashMap::new()),
            grace,
        }
    }

    /// Rotates `refresh_token`, or joins the rotation already running (or
    /// recently completed) for it.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Rotation, AuthError> {
        let (flight, shared) = self.join(refresh_token);

        let result = flight
            .get_or_init(|| self.refresher.rotate(refresh_token))
            .await
            .clone();

        if result.is_err() {
            self.forget(refresh_token, &flight);
        }

        if shared {
            debug!("Joined an existing token rotation");
        }

        result.map(|tokens| Rotation { tokens, shared })
    }

    /// Number of rotations currently tracked (running or within grace).
    pub fn tracked(&self) -> usize {
        self.flights.lock().len()
    }

    fn join(&self, refresh_token: &str) -> (Flight, bool) {
        let mut flights = self.flights.lock();
        let grace = self.grace;
        flights.retain(|_, entry| !entry.flight.initialized() || entry.started.elapsed() <= grace);

        if let Some(entry) = flights.get(refresh_token) {
            return (entry.flight.clone(), true);
        }

        let flight: Flight = Arc::new(OnceCell::new());
        flights.insert(
            refresh_token.to_string(),
            Entry {
                flight: flight.clone(),
                started: Instant::now(),
            },
        );
        (flight, false)
    }

    fn forget(&self, refresh_token: &str, flight: &Flight) {
        let mut flights = self.flights.lock();
        if flights
            .get(refresh_token)
            .is_some_and(|entry| Arc::ptr_eq(&entry.flight, flight))
        {
            flights.remove(refresh_token);
        }
    }
}

#[async_trait]
impl TokenRefresher for RefreshCoordinator {
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.refresh(refresh_token).await.map(|rotation| rotation.tokens)
    }

    async fn rotation(&self, refresh_token: &str) -> Result<Rotation, AuthError> {
        self.refresh(refresh_token).await
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("grace", &self.grace)
            .field("tracked", &self.tracked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRefresher {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingRefresher {
        fn new(fail: bool, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
                delay,
            })
        }
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(AuthError::InvalidRefreshToken);
            }
            Ok(TokenPair {
                access_token: format!("access-{}", call),
                refresh_token: Some(format!("{}-rotated", refresh_token)),
                expires_at: 3_600_000,
                token_type: "Bearer".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_call() {
        let refresher = CountingRefresher::new(false, Duration::from_millis(50));
        let coordinator = RefreshCoordinator::new(refresher.clone(), Duration::from_secs(10));

        let (a, b, c) = tokio::join!(
            coordinator.refresh("refresh-1"),
            coordinator.refresh("refresh-1"),
            coordinator.refresh("refresh-1"),
        );

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        let a = a.unwrap();
        let b = b.unwrap();
        let c = c.unwrap();
        assert_eq!(a.tokens, b.tokens);
        assert_eq!(b.tokens, c.tokens);
        assert_eq!([a.shared, b.shared, c.shared].iter().filter(|s| !**s).count(), 1);
    }

    #[tokio::test]
    async fn test_late_caller_within_grace_gets_rotated_pair() {
        let refresher = CountingRefresher::new(false, Duration::ZERO);
        let coordinator = RefreshCoordinator::new(refresher.clone(), Duration::from_secs(10));

        let first = coordinator.refresh("refresh-1").await.unwrap();
        let late = coordinator.refresh("refresh-1").await.unwrap();

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert!(late.shared);
        assert_eq!(first.tokens, late.tokens);
    }

    #[tokio::test]
    async fn test_rotation_forgotten_after_grace() {
        let refresher = CountingRefresher::new(false, Duration::ZERO);
        let coordinator = RefreshCoordinator::new(refresher.clone(), Duration::ZERO);

        coordinator.refresh("refresh-1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let again = coordinator.refresh("refresh-1").await.unwrap();

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
        assert!(!again.shared);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let refresher = CountingRefresher::new(true, Duration::ZERO);
        let coordinator = RefreshCoordinator::new(refresher.clone(), Duration::from_secs(10));

        let first = coordinator.refresh("refresh-1").await;
        let second = coordinator.refresh("refresh-1").await;

        assert_eq!(first.unwrap_err(), AuthError::InvalidRefreshToken);
        assert_eq!(second.unwrap_err(), AuthError::InvalidRefreshToken);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.tracked(), 0);
    }

    #[tokio::test]
    async fn test_rotation_through_trait_reports_sharing() {
        let refresher = CountingRefresher::new(false, Duration::ZERO);
        let coordinator: Arc<dyn TokenRefresher> = Arc::new(RefreshCoordinator::new(
            refresher.clone(),
            Duration::from_secs(10),
        ));

        let first = coordinator.rotation("refresh-1").await.unwrap();
        let second = coordinator.rotation("refresh-1").await.unwrap();
        let plain = refresher.rotation("refresh-9").await.unwrap();

        assert!(!first.shared);
        assert!(second.shared);
        assert!(!plain.shared);
    }

    #[tokio::test]
    async fn test_distinct_tokens_refresh_independently() {
        let refresher = CountingRefresher::new(false, Duration::ZERO);
        let coordinator = RefreshCoordinator::new(refresher.clone(), Duration::from_secs(10));

        coordinator.refresh("refresh-a").await.unwrap();
        coordinator.refresh("refresh-b").await.unwrap();

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }
}
