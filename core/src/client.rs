//! Stateless HTTP request builder and response parser for the remote todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.
//!
//! Every todo route is authenticated with the bearer credential issued at
//! login. Writes go out as multipart forms; updates use `POST` with
//! `?_method=PUT` because the backend only reads multipart bodies on `POST`.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, PartValue, RequestBody};
use crate::types::{
    Credentials, Envelope, LoginData, PaginatedTodos, Todo, TodoDraft, TodoId, PDF_CONTENT_TYPE,
};

/// Synchronous, stateless client for the remote todo API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&serde_json::json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        }))
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/login", self.base_url),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: Some(RequestBody::Json(body)),
        })
    }

    pub fn build_list_todos(&self, token: &BearerToken, page: u64, per_page: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/todos?per_page={per_page}&page={page}", self.base_url),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                authorization(token),
            ],
            body: None,
        }
    }

    pub fn build_get_todo(&self, token: &BearerToken, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/todos/{id}", self.base_url),
            headers: vec![authorization(token)],
            body: None,
        }
    }

    pub fn build_create_todo(&self, token: &BearerToken, draft: &TodoDraft) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/todos", self.base_url),
            headers: vec![authorization(token)],
            body: Some(RequestBody::Multipart(draft_parts(draft))),
        }
    }

    pub fn build_update_todo(&self, token: &BearerToken, id: TodoId, draft: &TodoDraft) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/todos/{id}?_method=PUT", self.base_url),
            headers: vec![authorization(token)],
            body: Some(RequestBody::Multipart(draft_parts(draft))),
        }
    }

    pub fn build_delete_todo(&self, token: &BearerToken, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/api/todos/{id}", self.base_url),
            headers: vec![authorization(token)],
            body: None,
        }
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginData, ApiError> {
        parse_data(response)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<PaginatedTodos, ApiError> {
        parse_data(response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_data(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn authorization(token: &BearerToken) -> (String, String) {
    ("authorization".to_string(), token.authorization_header())
}

fn draft_parts(draft: &TodoDraft) -> Vec<FormPart> {
    let mut parts = vec![
        FormPart::text("title", &draft.title),
        FormPart::text("description", &draft.description),
    ];
    if let Some(attachment) = &draft.attachment {
        parts.push(FormPart {
            name: "file".to_string(),
            value: PartValue::File {
                file_name: attachment.file_name.clone(),
                content_type: PDF_CONTENT_TYPE.to_string(),
                bytes: attachment.bytes.clone(),
            },
        });
    }
    parts
}

/// Check the status, then pull the payload out of the envelope's `data`.
fn parse_data<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    envelope
        .data
        .ok_or_else(|| ApiError::DeserializationError("response has no data field".to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        401 => Err(ApiError::Unauthorized(error_message(response))),
        404 => Err(ApiError::NotFound),
        422 => Err(ApiError::Validation(error_message(response))),
        status => Err(ApiError::HttpError {
            status,
            message: error_message(response),
        }),
    }
}

/// The envelope's `message` (or `error`) when the body is JSON, else the raw body.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<Envelope<serde_json::Value>>(&response.body)
        .ok()
        .and_then(|envelope| envelope.message.or(envelope.error))
        .unwrap_or_else(|| response.body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PdfAttachment;
    use secrecy::SecretString;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:8000")
    }

    fn token() -> BearerToken {
        BearerToken::new("tok")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn draft(attachment: Option<PdfAttachment>) -> TodoDraft {
        TodoDraft {
            title: "Buy milk".to_string(),
            description: "Two litres".to_string(),
            attachment,
        }
    }

    #[test]
    fn build_login_produces_json_request() {
        let credentials = Credentials {
            email: "demo@example.com".to_string(),
            password: SecretString::from("password".to_string()),
        };
        let req = client().build_login(&credentials).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/api/login");
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert!(req.header("authorization").is_none());
        let Some(RequestBody::Json(body)) = req.body else {
            panic!("expected a JSON body");
        };
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["email"], "demo@example.com");
        assert_eq!(body["password"], "password");
    }

    #[test]
    fn build_list_todos_carries_page_and_bearer() {
        let req = client().build_list_todos(&token(), 3, 10);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/todos?per_page=10&page=3");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_todo_produces_correct_request() {
        let req = client().build_get_todo(&token(), 42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/todos/42");
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn build_create_todo_without_file() {
        let req = client().build_create_todo(&token(), &draft(None));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/api/todos");
        let Some(RequestBody::Multipart(parts)) = req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(
            parts,
            vec![
                FormPart::text("title", "Buy milk"),
                FormPart::text("description", "Two litres"),
            ]
        );
    }

    #[test]
    fn build_create_todo_attaches_pdf() {
        let attachment = PdfAttachment {
            file_name: "receipt.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let req = client().build_create_todo(&token(), &draft(Some(attachment)));
        let Some(RequestBody::Multipart(parts)) = req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].name, "file");
        assert_eq!(
            parts[2].value,
            PartValue::File {
                file_name: "receipt.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"%PDF-1.4".to_vec(),
            }
        );
    }

    #[test]
    fn build_update_todo_spoofs_put() {
        let req = client().build_update_todo(&token(), 7, &draft(None));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/api/todos/7?_method=PUT");
        assert!(matches!(req.body, Some(RequestBody::Multipart(_))));
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(&token(), 7);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8000/api/todos/7");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_login_success() {
        let body = r#"{"data":{"user":{"id":1,"name":"Demo User","email":"demo@example.com"},"token":"abc"}}"#;
        let login = client().parse_login(response(200, body)).unwrap();
        assert_eq!(login.user.name, "Demo User");
        assert_eq!(login.token, "abc");
    }

    #[test]
    fn parse_login_rejected() {
        let err = client()
            .parse_login(response(401, r#"{"message":"Invalid credentials"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials"));
    }

    #[test]
    fn parse_list_todos_success() {
        let body = r#"{"data":{"current_page":2,"data":[{"id":11,"title":"Test"}],"from":11,"last_page":3,"per_page":10,"to":11,"total":21}}"#;
        let page = client().parse_list_todos(response(200, body)).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "Test");
        let state = page.pagination();
        assert_eq!((state.current_page, state.last_page, state.from, state.to), (2, 3, 11, 11));
    }

    #[test]
    fn parse_get_todo_not_found() {
        let err = client().parse_get_todo(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_todo_accepts_any_success_status() {
        let body = r#"{"data":{"id":1,"title":"New","description":"d"}}"#;
        assert_eq!(client().parse_create_todo(response(201, body)).unwrap().title, "New");
        assert_eq!(client().parse_create_todo(response(200, body)).unwrap().id, 1);
    }

    #[test]
    fn parse_create_todo_validation_message() {
        let err = client()
            .parse_create_todo(response(422, r#"{"message":"The title field is required."}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "The title field is required."));
    }

    #[test]
    fn parse_create_todo_wrong_status() {
        let err = client()
            .parse_create_todo(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref message } if message == "internal error"));
    }

    #[test]
    fn parse_update_todo_success() {
        let body = r#"{"data":{"id":1,"title":"Updated","file_path":"todos/a.pdf"}}"#;
        let todo = client().parse_update_todo(response(200, body)).unwrap();
        assert_eq!(todo.title, "Updated");
        assert_eq!(todo.file_path.as_deref(), Some("todos/a.pdf"));
    }

    #[test]
    fn parse_delete_todo_success() {
        assert!(client().parse_delete_todo(response(204, "")).is_ok());
        assert!(client().parse_delete_todo(response(200, r#"{"message":"ok"}"#)).is_ok());
    }

    #[test]
    fn parse_delete_todo_unauthorized() {
        let err = client()
            .parse_delete_todo(response(401, r#"{"message":"Unauthenticated."}"#))
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:8000/");
        let req = client.build_get_todo(&token(), 1);
        assert_eq!(req.path, "http://localhost:8000/api/todos/1");
    }

    #[test]
    fn missing_data_field_is_a_deserialization_error() {
        let err = client()
            .parse_get_todo(response(200, r#"{"message":"ok"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
