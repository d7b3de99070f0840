//! In-memory stand-in for the remote todo API.
//!
//! Speaks the same JSON the real backend does: every body is wrapped in
//! `{"data": ..., "message": ...}`, lists are paginated with
//! `current_page` / `last_page` / `from` / `to` metadata, writes are
//! multipart with an optional PDF `file` part, and every todo route wants
//! `Authorization: Bearer <token>` from `POST /api/login`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Multipart, Path, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Account {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The account every fresh `app()` knows about.
pub fn demo_account() -> Account {
    Account {
        id: 1,
        name: "Demo User".to_string(),
        email: "demo@example.com".to_string(),
        password: "password".to_string(),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Link {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page {
    pub current_page: u64,
    pub data: Vec<Todo>,
    pub first_page_url: String,
    pub from: Option<u64>,
    pub last_page: u64,
    pub last_page_url: String,
    pub links: Vec<Link>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
    pub total: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn data(data: T, message: &str) -> Json<Self> {
        Json(Self {
            data: Some(data),
            message: Some(message.to_string()),
        })
    }
}

struct StoredTodo {
    owner: u64,
    todo: Todo,
}

pub struct Store {
    accounts: Vec<Account>,
    tokens: HashMap<String, u64>,
    todos: BTreeMap<u64, StoredTodo>,
    next_id: u64,
}

impl Store {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            tokens: HashMap::new(),
            todos: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn owned(&self, owner: u64, id: u64) -> Result<&Todo, Failure> {
        self.todos
            .get(&id)
            .filter(|stored| stored.owner == owner)
            .map(|stored| &stored.todo)
            .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Todo not found"))
    }

    fn owned_mut(&mut self, owner: u64, id: u64) -> Result<&mut Todo, Failure> {
        self.todos
            .get_mut(&id)
            .filter(|stored| stored.owner == owner)
            .map(|stored| &mut stored.todo)
            .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Todo not found"))
    }
}

pub type Db = Arc<RwLock<Store>>;

/// JSON error body `{"message": ...}` with a status.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthenticated.")
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            data: None,
            message: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Id of the account behind the request's bearer token.
pub struct Owner(pub u64);

impl FromRequestParts<Db> for Owner {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(Failure::unauthenticated)?;
        db.read()
            .await
            .tokens
            .get(token)
            .copied()
            .map(Owner)
            .ok_or_else(Failure::unauthenticated)
    }
}

pub fn app() -> Router {
    app_with_accounts(vec![demo_account()])
}

pub fn app_with_accounts(accounts: Vec<Account>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(accounts)));
    Router::new()
        .route("/api/login", post(login))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).post(update_todo).delete(delete_todo),
        )
        .layer(DefaultBodyLimit::max(MAX_FILE_BYTES + 1024 * 1024))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginData>>, Failure> {
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(Failure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The email and password fields are required.",
        ));
    };
    let mut store = db.write().await;
    let account = store
        .accounts
        .iter()
        .find(|account| account.email == email && account.password == password)
        .cloned()
        .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), account.id);
    tracing::info!(user_id = account.id, "issued token");
    let user = User {
        id: account.id,
        name: account.name,
        email: account.email,
    };
    Ok(Envelope::data(LoginData { user, token }, "Login successful"))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Slice `items` into one page the way the backend's paginator does.
///
/// A page past the end is empty but keeps the requested `current_page`.
pub fn paginate(items: Vec<Todo>, page: u64, per_page: u64) -> Page {
    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total = items.len() as u64;
    let last_page = total.div_ceil(per_page).max(1);
    let offset = (page - 1).saturating_mul(per_page);
    let data: Vec<Todo> = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(per_page as usize)
        .collect();
    let (from, to) = if data.is_empty() {
        (None, None)
    } else {
        (Some(offset + 1), Some(offset + data.len() as u64))
    };

    let path = "/api/todos".to_string();
    let url = |n: u64| format!("{path}?page={n}");
    let mut links = vec![Link {
        url: (page > 1).then(|| url(page - 1)),
        label: "&laquo; Previous".to_string(),
        active: false,
    }];
    links.extend((1..=last_page).map(|n| Link {
        url: Some(url(n)),
        label: n.to_string(),
        active: n == page,
    }));
    links.push(Link {
        url: (page < last_page).then(|| url(page + 1)),
        label: "Next &raquo;".to_string(),
        active: false,
    });

    Page {
        current_page: page,
        data,
        first_page_url: url(1),
        from,
        last_page,
        last_page_url: url(last_page),
        next_page_url: (page < last_page).then(|| url(page + 1)),
        prev_page_url: (page > 1).then(|| url(page - 1)),
        links,
        path,
        per_page,
        to,
        total,
    }
}

async fn list_todos(
    State(db): State<Db>,
    Owner(owner): Owner,
    Query(query): Query<ListQuery>,
) -> Json<Envelope<Page>> {
    let page = query
        .page
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(1);
    let per_page = query
        .per_page
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(DEFAULT_PER_PAGE);
    let store = db.read().await;
    let owned = store
        .todos
        .values()
        .filter(|stored| stored.owner == owner)
        .map(|stored| stored.todo.clone())
        .collect();
    Envelope::data(paginate(owned, page, per_page), "Todos retrieved successfully")
}

struct TodoFields {
    title: Option<String>,
    description: Option<String>,
    file_path: Option<String>,
}

/// Read the multipart form, storing (well, naming) a PDF upload if present.
async fn read_fields(mut multipart: Multipart) -> Result<TodoFields, Failure> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        Failure::new(StatusCode::BAD_REQUEST, e.body_text())
    };
    let mut fields = TodoFields {
        title: None,
        description: None,
        file_path: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => fields.title = Some(field.text().await.map_err(bad_form)?),
            "description" => fields.description = Some(field.text().await.map_err(bad_form)?),
            "file" => {
                let is_pdf = field.content_type() == Some("application/pdf");
                let bytes = field.bytes().await.map_err(bad_form)?;
                if bytes.is_empty() {
                    continue;
                }
                if !is_pdf {
                    return Err(Failure::new(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "The file field must be a file of type: pdf.",
                    ));
                }
                if bytes.len() > MAX_FILE_BYTES {
                    return Err(Failure::new(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "The file field must not be greater than 10240 kilobytes.",
                    ));
                }
                fields.file_path = Some(format!("todos/{}.pdf", Uuid::new_v4()));
            }
            _ => {}
        }
    }
    Ok(fields)
}

fn required_title(title: Option<String>) -> Result<String, Failure> {
    title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "The title field is required."))
}

async fn create_todo(
    State(db): State<Db>,
    Owner(owner): Owner,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<Todo>>), Failure> {
    let fields = read_fields(multipart).await?;
    let title = required_title(fields.title)?;
    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;
    let todo = Todo {
        id,
        title,
        description: fields.description,
        file_path: fields.file_path,
    };
    store.todos.insert(
        id,
        StoredTodo {
            owner,
            todo: todo.clone(),
        },
    );
    tracing::info!(id, owner, "created todo");
    Ok((StatusCode::CREATED, Envelope::data(todo, "Todo created successfully")))
}

async fn get_todo(
    State(db): State<Db>,
    Owner(owner): Owner,
    Path(id): Path<u64>,
) -> Result<Json<Envelope<Todo>>, Failure> {
    let store = db.read().await;
    let todo = store.owned(owner, id)?.clone();
    Ok(Envelope::data(todo, "Todo retrieved successfully"))
}

#[derive(Deserialize)]
pub struct MethodOverride {
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

async fn update_todo(
    State(db): State<Db>,
    Owner(owner): Owner,
    Path(id): Path<u64>,
    Query(query): Query<MethodOverride>,
    multipart: Multipart,
) -> Result<Json<Envelope<Todo>>, Failure> {
    if !query
        .method
        .is_some_and(|method| method.eq_ignore_ascii_case("PUT"))
    {
        return Err(Failure::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }
    let fields = read_fields(multipart).await?;
    let title = required_title(fields.title)?;
    let mut store = db.write().await;
    let todo = store.owned_mut(owner, id)?;
    todo.title = title;
    todo.description = fields.description;
    if let Some(file_path) = fields.file_path {
        todo.file_path = Some(file_path);
    }
    Ok(Envelope::data(todo.clone(), "Todo updated successfully"))
}

async fn delete_todo(
    State(db): State<Db>,
    Owner(owner): Owner,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store.owned_mut(owner, id)?;
    store.todos.remove(&id);
    tracing::info!(id, owner, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
