use clap::Parser;
use todo_web::{AppState, Config};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = Config::parse();
    let state = AppState::from_config(&config).map_err(std::io::Error::other)?;

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!(listen = %config.listen, api = %config.api_base_url, "todo web listening");
    axum::serve(listener, todo_web::app(state)).await
}
