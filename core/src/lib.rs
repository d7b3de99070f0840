//! Synchronous core of the todo web application.
//!
//! # Overview
//! Everything here is pure: the pagination control's page-range algorithm,
//! form validation, the optimistic deletion state of the list, the typed
//! authentication state, and a request builder / response parser for the
//! remote todo API that never touches the network (host-does-IO pattern).
//!
//! # Design
//! - `TodoClient` is stateless. It holds only `base_url`.
//! - Each API operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod deletion;
pub mod error;
pub mod form;
pub mod http;
pub mod pagination;
pub mod types;

pub use auth::{AuthState, BearerToken, Principal};
pub use client::TodoClient;
pub use deletion::{DeletionError, DeletionState, DeletionTracker, RowStatus, TodoListView, TodoRow};
pub use error::ApiError;
pub use form::{FormError, LoginForm, TodoForm, UploadedFile, MAX_ATTACHMENT_BYTES};
pub use http::{FormPart, HttpMethod, HttpRequest, HttpResponse, PartValue, RequestBody};
pub use pagination::{
    compute_markers, on_marker_activated, parse_page_param, PageControls, PageMarker, PaginationState,
    Paginator, DEFAULT_DELTA,
};
pub use types::{
    Credentials, Envelope, LoginData, PaginatedTodos, PdfAttachment, Todo, TodoDraft, TodoId, User,
};
