//! Server-side actions against the remote todo API.
//!
//! Each action builds a request with the core client, executes it with
//! reqwest and parses the response, so handlers only ever see typed results.

use std::time::Duration;

use todo_core::{
    ApiError, BearerToken, Credentials, HttpRequest, HttpResponse, LoginData, PaginatedTodos, Todo,
    TodoClient, TodoDraft, TodoId,
};
use tracing::instrument;

use crate::error::WebError;
use crate::transport;

#[derive(Debug, Clone)]
pub struct TodoActions {
    client: TodoClient,
    http: reqwest::Client,
    per_page: u64,
}

impl TodoActions {
    pub fn new(api_base_url: &str, per_page: u64, timeout: Duration) -> Result<Self, WebError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: TodoClient::new(api_base_url),
            http,
            per_page,
        })
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WebError> {
        Ok(transport::execute(&self.http, request).await?)
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginData, WebError> {
        let request = self.client.build_login(credentials)?;
        let login = self.client.parse_login(self.send(request).await?)?;
        tracing::info!(user_id = login.user.id, "signed in");
        Ok(login)
    }

    #[instrument(skip(self, token))]
    pub async fn list(&self, token: &BearerToken, page: u64) -> Result<PaginatedTodos, WebError> {
        let request = self.client.build_list_todos(token, page, self.per_page);
        Ok(self.client.parse_list_todos(self.send(request).await?)?)
    }

    /// Fetch one page, falling back to the last page when `page` is past it.
    pub async fn list_clamped(&self, token: &BearerToken, page: u64) -> Result<PaginatedTodos, WebError> {
        let todos = self.list(token, page).await?;
        let clamped = todos.pagination().current_page;
        if todos.data.is_empty() && todos.total > 0 && clamped != page {
            tracing::debug!(requested = page, clamped, "requested page is past the end");
            return self.list(token, clamped).await;
        }
        Ok(todos)
    }

    /// `None` when the todo does not exist or belongs to someone else.
    #[instrument(skip(self, token))]
    pub async fn get(&self, token: &BearerToken, id: TodoId) -> Result<Option<Todo>, WebError> {
        let request = self.client.build_get_todo(token, id);
        match self.client.parse_get_todo(self.send(request).await?) {
            Ok(todo) => Ok(Some(todo)),
            Err(ApiError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip_all, fields(title = %draft.title))]
    pub async fn create(&self, token: &BearerToken, draft: &TodoDraft) -> Result<Todo, WebError> {
        let request = self.client.build_create_todo(token, draft);
        let todo = self.client.parse_create_todo(self.send(request).await?)?;
        tracing::info!(id = todo.id, "todo created");
        Ok(todo)
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update(&self, token: &BearerToken, id: TodoId, draft: &TodoDraft) -> Result<Todo, WebError> {
        let request = self.client.build_update_todo(token, id, draft);
        let todo = self.client.parse_update_todo(self.send(request).await?)?;
        tracing::info!("todo updated");
        Ok(todo)
    }

    #[instrument(skip(self, token))]
    pub async fn delete(&self, token: &BearerToken, id: TodoId) -> Result<(), WebError> {
        let request = self.client.build_delete_todo(token, id);
        self.client.parse_delete_todo(self.send(request).await?)?;
        tracing::info!("todo deleted");
        Ok(())
    }
}
