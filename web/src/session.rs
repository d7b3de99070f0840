//! Server-side sessions keyed by an opaque cookie.
//!
//! # Design
//! The browser only ever holds a random session id. The bearer token, the
//! user and the list's deletion markers stay in memory on the server and
//! expire together after the configured lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use todo_core::{DeletionTracker, Principal};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "todo_session";
pub const SIGNIN_PATH: &str = "/auth/signin";

#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub deletions: DeletionTracker,
    created_at: Instant,
    ttl: Duration,
}

impl Session {
    // Measured from creation so any `ttl` is representable.
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, principal: Principal) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            principal,
            deletions: DeletionTracker::new(),
            created_at: Instant::now(),
            ttl: self.ttl,
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| !session.is_expired());
        sessions.insert(id, session);
        id
    }

    pub async fn principal(&self, id: Uuid) -> Option<Principal> {
        self.update(id, |session| session.principal.clone()).await
    }

    /// Run `f` against a live session. Expired sessions are dropped and
    /// yield `None`.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(Session::is_expired) {
            sessions.remove(&id);
            return None;
        }
        sessions.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }

}

/// Session id carried by the request's `Cookie` headers, if any.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

pub fn session_cookie(id: Uuid, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Send the browser to sign-in and make it forget its session.
pub fn signed_out_redirect() -> Response {
    (
        [(header::SET_COOKIE, expired_cookie())],
        Redirect::to(SIGNIN_PATH),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use todo_core::{BearerToken, User};

    fn principal() -> Principal {
        Principal {
            user: User {
                id: 1,
                name: "Demo User".to_string(),
                email: "demo@example.com".to_string(),
            },
            credential: BearerToken::new("token"),
        }
    }

    #[test]
    fn finds_the_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=en")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn malformed_or_missing_cookie_is_no_session() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("todo_session=not-a-uuid"));
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn cookies_carry_lifetime() {
        let id = Uuid::nil();
        let cookie = session_cookie(id, Duration::from_secs(60));
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={id};")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=60"));
        assert!(expired_cookie().ends_with("Max-Age=0"));
    }

    #[tokio::test]
    async fn live_session_resolves_to_its_principal() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(principal()).await;
        let found = store.principal(id).await.unwrap();
        assert_eq!(found.user.email, "demo@example.com");

        store.remove(id).await;
        assert!(store.principal(id).await.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create(principal()).await;
        assert!(store.principal(id).await.is_none());
        assert!(store.update(id, |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn huge_lifetime_never_expires() {
        use clap::Parser;
        let config =
            crate::Config::try_parse_from(["todo-web", "--session-ttl-secs", "18446744073709551615"]).unwrap();
        let store = SessionStore::new(config.session_ttl());
        let id = store.create(principal()).await;
        assert!(store.principal(id).await.is_some());
        assert!(session_cookie(id, store.ttl()).ends_with(&format!("Max-Age={}", u64::MAX)));
    }

    #[tokio::test]
    async fn deletion_markers_live_in_the_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(principal()).await;
        store
            .update(id, |session| session.deletions.begin(7))
            .await
            .unwrap()
            .unwrap();
        let again = store.update(id, |session| session.deletions.begin(7)).await.unwrap();
        assert!(again.is_err());
    }
}
