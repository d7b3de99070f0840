//! Request extractors that resolve the session cookie to an `AuthState`.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use todo_core::{AuthState, Principal};
use uuid::Uuid;

use crate::session::{self, SIGNIN_PATH};
use crate::AppState;

/// The caller's authentication state, whether or not they are signed in.
#[derive(Debug, Clone)]
pub struct Gate {
    pub session_id: Option<Uuid>,
    pub state: AuthState,
}

impl FromRequestParts<AppState> for Gate {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, app: &AppState) -> Result<Self, Self::Rejection> {
        let Some(id) = session::session_id(&parts.headers) else {
            return Ok(Gate {
                session_id: None,
                state: AuthState::Unauthenticated,
            });
        };
        let state = match app.sessions.principal(id).await {
            Some(principal) => AuthState::Authenticated(principal),
            None => AuthState::Unauthenticated,
        };
        Ok(Gate {
            session_id: Some(id),
            state,
        })
    }
}

/// A signed-in caller. Anyone else is redirected to the sign-in page.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub session_id: Uuid,
    pub principal: Principal,
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, app: &AppState) -> Result<Self, Self::Rejection> {
        let gate = match Gate::from_request_parts(parts, app).await {
            Ok(gate) => gate,
            Err(never) => match never {},
        };
        match (gate.session_id, gate.state.into_principal()) {
            (Some(session_id), Some(principal)) => Ok(RequireAuth {
                session_id,
                principal,
            }),
            _ => {
                tracing::debug!(path = %parts.uri.path(), "no live session, redirecting to sign-in");
                Err(Redirect::to(SIGNIN_PATH))
            }
        }
    }
}
