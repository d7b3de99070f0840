//! Page handlers and the router that mounts them.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use todo_core::{
    parse_page_param, ApiError, BearerToken, LoginForm, PaginatedTodos, Principal, TodoForm, TodoId,
    TodoListView, UploadedFile, MAX_ATTACHMENT_BYTES,
};
use uuid::Uuid;

use crate::auth::{Gate, RequireAuth};
use crate::error::WebError;
use crate::session::{self, SessionStore};
use crate::views::{self, FormMode, FormValues};
use crate::AppState;

const DELETE_FAILED: &str = "Failed to delete todo";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn page(&self) -> u64 {
        parse_page_param(self.page.as_deref()).max(1) as u64
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SigninFields {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/add", get(add_form).post(create_todo))
        .route("/edit/{id}", get(edit_form).post(update_todo))
        .route("/todos/{id}/delete", post(delete_todo))
        .route("/auth/signin", get(signin_form).post(signin))
        .route("/auth/signout", post(signout))
        .fallback(not_found)
        // Leave room past the attachment cap so oversized files reach
        // validation and get a readable message.
        .layer(DefaultBodyLimit::max(MAX_ATTACHMENT_BYTES + 1024 * 1024))
        .with_state(state)
}

/// Drop the session once the API stops accepting its credential.
async fn check_auth<T>(app: &AppState, session_id: Uuid, result: Result<T, WebError>) -> Result<T, WebError> {
    if let Err(err) = &result {
        if err.is_unauthorized() {
            tracing::info!("API rejected the session credential, signing out");
            app.sessions.remove(session_id).await;
        }
    }
    result
}

async fn fetch_page(app: &AppState, auth: &RequireAuth, page: u64) -> Result<PaginatedTodos, WebError> {
    let result = app.actions.list_clamped(&auth.principal.credential, page).await;
    match check_auth(app, auth.session_id, result).await {
        Ok(todos) => Ok(todos),
        Err(err) if err.is_unauthorized() => Err(err),
        Err(err) => {
            tracing::warn!(error = %err, "failed to fetch todos, showing an empty list");
            Ok(PaginatedTodos::empty(app.actions.per_page()))
        }
    }
}

#[tracing::instrument(skip_all, fields(page = query.page()))]
async fn home(
    State(app): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<Response, WebError> {
    let todos = fetch_page(&app, &auth, query.page()).await?;
    let paginator = app.paginator;
    let user = &auth.principal.user;

    let html = app
        .sessions
        .update(auth.session_id, |session| {
            session.deletions.reconcile(&todos);
            let html = {
                let view = TodoListView::reduce(&todos, &session.deletions);
                let controls = paginator.controls(&view.pagination);
                views::home_page(user, &view, &controls)
            };
            // A failure is reported once.
            session.deletions.acknowledge_failures();
            html
        })
        .await;

    Ok(match html {
        Some(html) => Html(html).into_response(),
        None => session::signed_out_redirect(),
    })
}

async fn read_todo_form(mut multipart: Multipart) -> Result<TodoForm, WebError> {
    let mut form = TodoForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await?,
            "description" => form.description = field.text().await?,
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }
    Ok(form)
}

fn form_values(form: &TodoForm) -> FormValues {
    FormValues {
        title: form.title.clone(),
        description: form.description.clone(),
        attachment: None,
    }
}

fn invalid_form(principal: &Principal, mode: FormMode, values: &FormValues, message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::todo_form_page(&principal.user, mode, values, Some(message))),
    )
        .into_response()
}

async fn add_form(auth: RequireAuth) -> Html<String> {
    Html(views::todo_form_page(
        &auth.principal.user,
        FormMode::Create,
        &FormValues::default(),
        None,
    ))
}

/// Validate, then create or update. The API's own validation errors re-render
/// the form just like local ones.
async fn save_todo(
    app: &AppState,
    auth: &RequireAuth,
    mode: FormMode,
    form: TodoForm,
) -> Result<Response, WebError> {
    let values = form_values(&form);
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(err) => return Ok(invalid_form(&auth.principal, mode, &values, &err.to_string())),
    };
    let token: &BearerToken = &auth.principal.credential;
    let result = match mode {
        FormMode::Create => app.actions.create(token, &draft).await,
        FormMode::Edit(id) => app.actions.update(token, id, &draft).await,
    };
    match check_auth(app, auth.session_id, result).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(WebError::Api(ApiError::Validation(message))) => {
            Ok(invalid_form(&auth.principal, mode, &values, &message))
        }
        Err(err) => Err(err),
    }
}

async fn create_todo(
    State(app): State<AppState>,
    auth: RequireAuth,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let form = read_todo_form(multipart).await?;
    save_todo(&app, &auth, FormMode::Create, form).await
}

async fn edit_form(
    State(app): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<TodoId>,
) -> Result<Response, WebError> {
    let result = app.actions.get(&auth.principal.credential, id).await;
    match check_auth(&app, auth.session_id, result).await? {
        Some(todo) => Ok(Html(views::todo_form_page(
            &auth.principal.user,
            FormMode::Edit(id),
            &FormValues::from(&todo),
            None,
        ))
        .into_response()),
        None => Err(ApiError::NotFound.into()),
    }
}

async fn update_todo(
    State(app): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<TodoId>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let form = read_todo_form(multipart).await?;
    save_todo(&app, &auth, FormMode::Edit(id), form).await
}

/// A deletion between `begin` and `settle`.
///
/// Dropping it unsettled (the client went away, or the handler future was
/// cancelled) records a failure so the row never stays `Deleting`.
struct InFlightDeletion {
    sessions: SessionStore,
    session_id: Uuid,
    id: TodoId,
    armed: bool,
}

impl InFlightDeletion {
    async fn begin(sessions: &SessionStore, session_id: Uuid, id: TodoId) -> Result<Option<Self>, WebError> {
        match sessions.update(session_id, |session| session.deletions.begin(id)).await {
            Some(began) => began?,
            None => return Ok(None),
        }
        Ok(Some(Self {
            sessions: sessions.clone(),
            session_id,
            id,
            armed: true,
        }))
    }

    async fn settle(mut self, outcome: Result<(), String>) -> Result<(), WebError> {
        let id = self.id;
        let settled = self
            .sessions
            .update(self.session_id, |session| session.deletions.settle(id, outcome))
            .await;
        self.armed = false;
        settled.transpose()?;
        Ok(())
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightDeletion {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(todo_id = self.id, "delete abandoned before the API answered");
        let (sessions, session_id, id) = (self.sessions.clone(), self.session_id, self.id);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                sessions
                    .update(session_id, |session| {
                        session.deletions.settle(id, Err(DELETE_FAILED.to_string()))
                    })
                    .await;
            });
        }
    }
}

#[tracing::instrument(skip_all, fields(todo_id = id))]
async fn delete_todo(
    State(app): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<TodoId>,
    Query(query): Query<PageQuery>,
) -> Result<Response, WebError> {
    let Some(pending) = InFlightDeletion::begin(&app.sessions, auth.session_id, id).await? else {
        return Ok(session::signed_out_redirect());
    };

    let result = app.actions.delete(&auth.principal.credential, id).await;
    let outcome = match check_auth(&app, auth.session_id, result).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_unauthorized() => {
            // The session, and its markers, are already gone.
            pending.disarm();
            return Err(err);
        }
        Err(err) => {
            tracing::warn!(error = %err, "delete failed");
            Err(DELETE_FAILED.to_string())
        }
    };
    pending.settle(outcome).await?;

    Ok(Redirect::to(&format!("/?page={}", query.page())).into_response())
}

async fn signin_form(gate: Gate) -> Response {
    if gate.state.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    Html(views::signin_page(None, "")).into_response()
}

#[tracing::instrument(skip_all)]
async fn signin(State(app): State<AppState>, Form(fields): Form<SigninFields>) -> Result<Response, WebError> {
    let email = fields.email.trim().to_string();
    let form = LoginForm {
        email: fields.email,
        password: fields.password,
    };
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(err) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::signin_page(Some(&err.to_string()), &email)),
            )
                .into_response())
        }
    };

    match app.actions.login(&credentials).await {
        Ok(login) => {
            let principal = Principal {
                user: login.user,
                credential: BearerToken::new(login.token),
            };
            let id = app.sessions.create(principal).await;
            let cookie = session::session_cookie(id, app.sessions.ttl());
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
        }
        Err(WebError::Api(ApiError::Unauthorized(_) | ApiError::Validation(_))) => {
            tracing::info!("sign-in rejected");
            Ok((
                StatusCode::UNAUTHORIZED,
                Html(views::signin_page(Some(INVALID_CREDENTIALS), &email)),
            )
                .into_response())
        }
        Err(err) => Err(err),
    }
}

async fn signout(State(app): State<AppState>, gate: Gate) -> Response {
    if let Some(id) = gate.session_id {
        app.sessions.remove(id).await;
        tracing::info!("signed out");
    }
    session::signed_out_redirect()
}

async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(views::not_found_page()))
}
