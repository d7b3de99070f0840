//! Server-rendered HTML for every page.
//!
//! Pages are plain strings assembled with `format!`; every piece of user or
//! API supplied text goes through [`escape`] first.

use std::fmt::Write as _;

use todo_core::{PageControls, PageMarker, PaginationState, RowStatus, Todo, TodoId, TodoListView, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Danger,
    Success,
}

impl ButtonVariant {
    pub fn classes(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "bg-blue-600 hover:bg-blue-700 text-white shadow-lg focus:ring-blue-500",
            ButtonVariant::Secondary => {
                "bg-gray-100 hover:bg-gray-200 text-gray-800 border border-gray-300 focus:ring-gray-500"
            }
            ButtonVariant::Danger => "bg-red-600 hover:bg-red-700 text-white shadow-lg focus:ring-red-500",
            ButtonVariant::Success => "bg-green-600 hover:bg-green-700 text-white shadow-lg focus:ring-green-500",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl ButtonSize {
    pub fn classes(self) -> &'static str {
        match self {
            ButtonSize::Sm => "px-3 py-1.5 text-sm",
            ButtonSize::Md => "px-6 py-2.5 text-base",
            ButtonSize::Lg => "px-8 py-3 text-lg",
        }
    }
}

const BUTTON_BASE: &str = "inline-flex items-center justify-center font-medium rounded-lg \
    focus:outline-none focus:ring-2 focus:ring-offset-2 disabled:cursor-not-allowed disabled:opacity-50";

pub fn button_classes(variant: ButtonVariant, size: ButtonSize) -> String {
    format!("{BUTTON_BASE} {} {}", variant.classes(), size.classes())
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<span class="user">{name}</span>
      <form method="post" action="/auth/signout"><button type="submit" class="{classes}">Sign out</button></form>"#,
            name = escape(&user.name),
            classes = button_classes(ButtonVariant::Secondary, ButtonSize::Sm),
        ),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | TodoApp</title>
</head>
<body class="min-h-screen bg-gray-50">
  <header class="flex items-center justify-between px-8 py-4">
    <a href="/" class="text-xl font-bold">TodoApp</a>
    <nav class="flex items-center gap-4">{nav}</nav>
  </header>
  <main class="container mx-auto px-4 py-8">
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn error_banner(message: Option<&str>) -> String {
    message
        .map(|message| format!(r#"<p class="error" role="alert">{}</p>"#, escape(message)))
        .unwrap_or_default()
}

pub fn signin_page(error: Option<&str>, email: &str) -> String {
    let body = format!(
        r#"<section class="signin">
  <h1>Welcome back</h1>
  <p>Sign in to your account</p>
  {error}
  <form method="post" action="/auth/signin">
    <label for="email">Email address</label>
    <input id="email" name="email" type="email" value="{email}" required>
    <label for="password">Password</label>
    <input id="password" name="password" type="password" required>
    <button type="submit" class="{classes}">Sign in</button>
  </form>
</section>"#,
        error = error_banner(error),
        email = escape(email),
        classes = button_classes(ButtonVariant::Primary, ButtonSize::Lg),
    );
    layout("Sign in", None, &body)
}

fn attachment_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Opens the attachment where the API stored it, in a new tab.
fn view_pdf_link(path: &str) -> String {
    format!(
        r#"<a href="{href}" target="_blank" rel="noopener noreferrer" class="{classes}">View PDF</a>"#,
        href = escape(path),
        classes = button_classes(ButtonVariant::Success, ButtonSize::Sm),
    )
}

fn todo_row(todo: &Todo, status: RowStatus<'_>, page: u64) -> String {
    let mut html = format!(
        r#"<li class="todo" id="todo-{id}">
  <div class="flex justify-between items-start">
    <h3>{title}</h3>
    <div class="actions">
      <a href="/edit/{id}" class="{edit}">Edit</a>
      <form method="post" action="/todos/{id}/delete?page={page}">"#,
        id = todo.id,
        title = escape(&todo.title),
        edit = button_classes(ButtonVariant::Primary, ButtonSize::Sm),
    );
    let delete = button_classes(ButtonVariant::Danger, ButtonSize::Sm);
    match status {
        RowStatus::Deleting => {
            let _ = write!(html, r#"<button type="submit" class="{delete}" disabled>Deleting...</button>"#);
        }
        RowStatus::Ready | RowStatus::Failed(_) => {
            let _ = write!(html, r#"<button type="submit" class="{delete}">Delete</button>"#);
        }
    }
    html.push_str("</form>\n    </div>\n  </div>\n");

    if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(html, r#"  <p class="description">{}</p>"#, escape(description));
    }
    if let Some(path) = todo.file_path.as_deref() {
        let _ = writeln!(
            html,
            r#"  <p class="attachment">PDF Attachment: {}</p>"#,
            view_pdf_link(path)
        );
    }
    if let RowStatus::Failed(reason) = status {
        let _ = writeln!(html, r#"  <p class="error" role="alert">{}</p>"#, escape(reason));
    }
    html.push_str("</li>");
    html
}

fn page_link(page: u64, label: &str) -> String {
    format!(r#"<a href="/?page={page}" class="page">{label}</a>"#)
}

/// The pagination control. Empty when everything fits on one page.
pub fn pagination(state: &PaginationState, controls: &PageControls) -> String {
    if controls.is_hidden() {
        return String::new();
    }
    let mut html = format!(
        r#"<nav class="pagination" aria-label="Pagination">
  <p class="summary">Showing <strong>{from}</strong> to <strong>{to}</strong> of <strong>{total}</strong> results</p>
  <div class="pages">"#,
        from = state.from,
        to = state.to,
        total = state.total,
    );

    html.push_str(&match controls.previous {
        Some(page) => page_link(page, "Previous"),
        None => r#"<span class="page disabled" aria-disabled="true">Previous</span>"#.to_string(),
    });
    for marker in &controls.markers {
        let item = match (*marker, controls.activate(*marker)) {
            (PageMarker::Ellipsis, _) => r#"<span class="ellipsis">...</span>"#.to_string(),
            (PageMarker::Page(_), Some(target)) => page_link(target, &target.to_string()),
            (PageMarker::Page(page), None) => {
                format!(r#"<span class="page current" aria-current="page">{page}</span>"#)
            }
        };
        html.push_str(&item);
    }
    html.push_str(&match controls.next {
        Some(page) => page_link(page, "Next"),
        None => r#"<span class="page disabled" aria-disabled="true">Next</span>"#.to_string(),
    });

    html.push_str("</div>\n</nav>");
    html
}

pub fn home_page(user: &User, view: &TodoListView<'_>, controls: &PageControls) -> String {
    let add = button_classes(ButtonVariant::Primary, ButtonSize::Lg);
    let mut body = format!(
        r#"<section class="welcome">
  <h2>Welcome back, {name}!</h2>
  <p>Ready to tackle your tasks? Let's make today productive!</p>
</section>
<section class="tasks">
  <h3>Your Tasks</h3>
  <a href="/add" class="{add}">Add Todo</a>
"#,
        name = escape(user.first_name()),
    );

    if view.is_empty() {
        let _ = write!(
            body,
            r#"  <div class="empty">
    <h3>No tasks yet</h3>
    <p>Start your productivity journey by creating your first task.</p>
    <a href="/add" class="{add}">Create Your First Task</a>
  </div>
"#
        );
    } else {
        let page = view.pagination.current_page;
        body.push_str("  <ul class=\"todos\">\n");
        for row in &view.rows {
            body.push_str(&todo_row(row.todo, row.status, page));
            body.push('\n');
        }
        body.push_str("  </ul>\n");
        body.push_str(&pagination(&view.pagination, controls));
    }
    body.push_str("</section>");
    layout("Your Tasks", Some(user), &body)
}

/// Whether the form creates a todo or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TodoId),
}

/// What the form fields show when the page is (re-)rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub attachment: Option<String>,
}

impl From<&Todo> for FormValues {
    fn from(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            attachment: todo.file_path.clone(),
        }
    }
}

pub fn todo_form_page(user: &User, mode: FormMode, values: &FormValues, error: Option<&str>) -> String {
    let (heading, action, submit) = match mode {
        FormMode::Create => ("Create New Todo", "/add".to_string(), "Create Todo"),
        FormMode::Edit(id) => ("Edit Todo", format!("/edit/{id}"), "Update Todo"),
    };
    let current = values
        .attachment
        .as_deref()
        .map(|path| {
            format!(
                r#"<p class="attachment">Current file: <span>{}</span> {}</p>"#,
                escape(attachment_name(path)),
                view_pdf_link(path)
            )
        })
        .unwrap_or_default();
    let body = format!(
        r#"<section class="todo-form">
  <h1>{heading}</h1>
  {error}
  <form method="post" action="{action}" enctype="multipart/form-data">
    <label for="title">Title</label>
    <input id="title" name="title" type="text" value="{title}" required>
    <label for="description">Description</label>
    <textarea id="description" name="description" rows="4" required>{description}</textarea>
    <label for="file">PDF Attachment</label>
    {current}
    <input id="file" name="file" type="file" accept="application/pdf">
    <div class="actions">
      <a href="/" class="{cancel}">Cancel</a>
      <button type="submit" class="{submit_classes}">{submit}</button>
    </div>
  </form>
</section>"#,
        error = error_banner(error),
        title = escape(&values.title),
        description = escape(&values.description),
        cancel = button_classes(ButtonVariant::Secondary, ButtonSize::Md),
        submit_classes = button_classes(ButtonVariant::Success, ButtonSize::Md),
    );
    layout(heading, Some(user), &body)
}

pub fn not_found_page() -> String {
    let body = r#"<section class="not-found">
  <h1>Not found</h1>
  <p>The page or todo you are looking for does not exist.</p>
  <a href="/">Back to your tasks</a>
</section>"#;
    layout("Not found", None, body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        r#"<section class="failure">
  <h1>Something went wrong</h1>
  {}
  <a href="/">Back to your tasks</a>
</section>"#,
        error_banner(Some(message))
    );
    layout("Error", None, &body)
}
