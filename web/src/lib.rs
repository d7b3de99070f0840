//! Server-rendered web frontend for the remote todo API.
//!
//! # Overview
//! Visitors sign in against the API, then browse their todos page by page,
//! add, edit and delete them. All rendering happens on the server; the
//! browser only ever holds an opaque session cookie.
//!
//! # Design
//! - `actions` is the only place that talks to the API. It drives the pure
//!   `todo_core::TodoClient` and executes its requests with reqwest.
//! - `session` keeps the bearer token and the list's deletion markers in
//!   memory; `auth` turns the cookie into an `AuthState` per request.
//! - `views` renders pagination through `todo_core::Paginator`, so the page
//!   window shown in HTML is exactly the one the core computes.

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod transport;
pub mod views;

use axum::Router;
use todo_core::Paginator;

pub use actions::TodoActions;
pub use config::Config;
pub use error::WebError;
pub use session::SessionStore;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub actions: TodoActions,
    pub sessions: SessionStore,
    pub paginator: Paginator,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, WebError> {
        Ok(Self {
            actions: TodoActions::new(&config.api_base_url, config.per_page, config.api_timeout())?,
            sessions: SessionStore::new(config.session_ttl()),
            paginator: Paginator::new(config.page_delta),
        })
    }
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}
