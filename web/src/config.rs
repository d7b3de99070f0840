//! Command-line and environment configuration for the web frontend.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use todo_core::DEFAULT_DELTA;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
/// One day, the lifetime of a sign-in.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-web")]
#[command(about = "Authenticated todo list frontend for a remote todo API", long_about = None)]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "TODO_WEB_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Base URL of the remote todo API (e.g., http://127.0.0.1:8000)
    #[arg(long, env = "TODO_API_BASE_URL", default_value = "http://127.0.0.1:8000")]
    pub api_base_url: String,

    /// Todos per page
    #[arg(long, env = "TODO_PER_PAGE", default_value_t = DEFAULT_PER_PAGE,
          value_parser = clap::value_parser!(u64).range(1..=100))]
    pub per_page: u64,

    /// Seconds a sign-in stays valid
    #[arg(long, env = "TODO_SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL_SECS)]
    pub session_ttl_secs: u64,

    /// Page numbers shown on each side of the current page
    #[arg(long, env = "TODO_PAGE_DELTA", default_value_t = DEFAULT_DELTA)]
    pub page_delta: u64,

    /// Seconds before a request to the todo API is abandoned
    #[arg(long, env = "TODO_API_TIMEOUT_SECS", default_value_t = DEFAULT_API_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub api_timeout_secs: u64,
}

impl Config {
    /// Defaults pointed at a given API, without reading argv or the environment.
    pub fn with_api_base_url(api_base_url: &str) -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_base_url: api_base_url.to_string(),
            per_page: DEFAULT_PER_PAGE,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            page_delta: DEFAULT_DELTA,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
