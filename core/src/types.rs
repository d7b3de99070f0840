//! Domain DTOs for the remote todo API.
//!
//! # Design
//! These types mirror the remote API's JSON but are defined independently of
//! the mock server; integration tests catch schema drift between the two.
//! Every response body is wrapped in an `Envelope` whose `data` field holds
//! the payload.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::pagination::PaginationState;

pub type TodoId = u64;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

/// A navigation link as reported by the paginator on the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// One page of todos plus the pagination metadata computed by the backend.
///
/// `from` and `to` are `null` on the wire when the page is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginatedTodos {
    pub current_page: i64,
    pub data: Vec<Todo>,
    #[serde(default)]
    pub from: Option<u64>,
    pub last_page: i64,
    pub per_page: u64,
    #[serde(default)]
    pub to: Option<u64>,
    pub total: u64,
    #[serde(default)]
    pub first_page_url: Option<String>,
    #[serde(default)]
    pub last_page_url: Option<String>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub prev_page_url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub links: Vec<PageLink>,
}

impl PaginatedTodos {
    /// The page shown when the list could not be fetched.
    pub fn empty(per_page: u64) -> Self {
        Self {
            current_page: 1,
            data: Vec::new(),
            from: None,
            last_page: 1,
            per_page,
            to: None,
            total: 0,
            first_page_url: None,
            last_page_url: None,
            next_page_url: None,
            prev_page_url: None,
            path: None,
            links: Vec::new(),
        }
    }

    pub fn pagination(&self) -> PaginationState {
        PaginationState::new(
            self.current_page,
            self.last_page,
            self.total,
            self.per_page,
            self.from.unwrap_or(0),
            self.to.unwrap_or(0),
        )
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.data.iter().any(|todo| todo.id == id)
    }
}

/// Wrapper around every API response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// The account a bearer token belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
}

/// Email and password submitted to the login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A validated PDF upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Validated input for creating or updating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub attachment: Option<PdfAttachment>,
}
