//! Typed authentication state handed to every page.
//!
//! The session layer resolves a request to an `AuthState` once; handlers take
//! the `Principal` out of it instead of looking the session up themselves.

use secrecy::{ExposeSecret, SecretString};

use crate::types::User;

/// Opaque credential issued by the remote API at login.
#[derive(Debug, Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

/// A signed-in user and the credential to act on their behalf.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub credential: BearerToken,
}

#[derive(Debug, Clone)]
pub enum AuthState {
    Authenticated(Principal),
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthState::Authenticated(principal) => Some(principal),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self {
            AuthState::Authenticated(principal) => Some(principal),
            AuthState::Unauthenticated => None,
        }
    }
}
