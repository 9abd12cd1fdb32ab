mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeAuth, PARENT_EMAIL, PASSWORD, TENANT, test_session_config};
use elymica_auth::{AuthClient, RefreshCoordinator, SessionStore};
use elymica_core::now_millis;
use elymica_models::{Credential, SessionError, SessionState};

fn store(auth: &FakeAuth) -> SessionStore {
    let client = Arc::new(AuthClient::with_client(
        reqwest::Client::new(),
        auth.base_url.clone(),
    ));
    let coordinator = Arc::new(RefreshCoordinator::new(
        client.clone(),
        Duration::from_secs(10),
    ));
    SessionStore::new(client, coordinator, &test_session_config())
}

fn credential() -> Credential {
    Credential::new(PARENT_EMAIL, PASSWORD, TENANT)
}

#[tokio::test]
async fn test_sign_in_yields_authenticated_session() {
    let auth = FakeAuth::start().await;
    let before = now_millis();

    let session = store(&auth).sign_in(&credential()).await.unwrap();

    assert_eq!(session.state(), SessionState::Authenticated);
    assert!(session.error.is_none());
    assert!(session.tokens.expires_at >= before + 3_600_000);
    assert!(session.tokens.expires_at <= now_millis() + 3_600_000);
}

#[tokio::test]
async fn test_materialize_inside_buffer_refreshes_once() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();
    let now = session.tokens.expires_at - 30_000;

    let refreshed = store.materialize(session.clone(), now).await;

    assert_eq!(auth.state.refreshes(), 1);
    assert!(refreshed.error.is_none());
    assert_ne!(refreshed.tokens.access_token, session.tokens.access_token);
    assert_ne!(refreshed.tokens.refresh_token, session.tokens.refresh_token);
    assert_eq!(refreshed.principal, session.principal);
}

#[tokio::test]
async fn test_materialize_outside_buffer_does_nothing() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();

    let same = store
        .materialize(session.clone(), session.tokens.expires_at - 120_000)
        .await;

    assert_eq!(same, session);
    assert_eq!(auth.state.refreshes(), 0);
}

#[tokio::test]
async fn test_already_rotated_token_tags_session() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();

    // Someone else already spent this refresh token.
    let old = session.tokens.refresh_token.clone().unwrap();
    store.auth_client().refresh(&old).await.unwrap();

    let errored = store
        .materialize(session.clone(), session.tokens.expires_at)
        .await;

    assert_eq!(errored.error, Some(SessionError::RefreshAccessTokenError));
    assert_eq!(
        errored.state(),
        SessionState::Error(SessionError::RefreshAccessTokenError)
    );
    assert_eq!(errored.tokens, session.tokens);
}

#[tokio::test]
async fn test_error_session_recovers_only_through_sign_in() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let mut session = store.sign_in(&credential()).await.unwrap();
    session.error = Some(SessionError::RefreshAccessTokenError);

    let still_errored = store
        .materialize(session.clone(), session.tokens.expires_at)
        .await;
    assert_eq!(still_errored.error, Some(SessionError::RefreshAccessTokenError));
    assert_eq!(auth.state.refreshes(), 0);

    let fresh = store.sign_in(&credential()).await.unwrap();
    assert!(fresh.error.is_none());
}

#[tokio::test]
async fn test_concurrent_materializations_share_one_rotation() {
    let auth = FakeAuth::start().await;
    *auth.state.refresh_delay.lock() = Duration::from_millis(50);
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();
    let now = session.tokens.expires_at - 10_000;

    let (a, b) = tokio::join!(
        store.materialize(session.clone(), now),
        store.materialize(session.clone(), now),
    );

    assert_eq!(auth.state.refreshes(), 1);
    assert!(a.error.is_none());
    assert!(b.error.is_none());
    assert_eq!(a.tokens, b.tokens);
}

#[tokio::test]
async fn test_refresh_outage_tags_session() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();
    auth.state
        .refresh_unavailable
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let errored = store
        .materialize(session.clone(), session.tokens.expires_at)
        .await;

    assert_eq!(errored.error, Some(SessionError::RefreshAccessTokenError));
}

#[tokio::test]
async fn test_load_round_trips_through_codec() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();
    let now = now_millis();

    let encoded = store.codec().encode(&session, now).unwrap();
    let loaded = store.load(Some(encoded.as_str()), now).await.unwrap();

    assert_eq!(loaded, session);
}

#[tokio::test]
async fn test_sign_out_invalidates_refresh_token() {
    let auth = FakeAuth::start().await;
    let store = store(&auth);
    let session = store.sign_in(&credential()).await.unwrap();

    store.sign_out(&session).await.unwrap();

    let refresh = session.tokens.refresh_token.clone().unwrap();
    assert!(!auth.state.is_valid_refresh(&refresh));
}
