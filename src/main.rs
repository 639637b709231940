//! Server: loads settings, ensures the database and `books` table exist, serves the books API.

use bookstore_api::{app, ensure_books_table, ensure_database_exists, AppState, PgBookStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookstore_api=info,bookstore_server=info")),
        )
        .init();

    let database_url = settings.database_url();
    ensure_database_exists(database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(database_url)
        .await?;
    ensure_books_table(&pool).await?;

    let store = PgBookStore::new(pool);
    let state = AppState::new(Arc::new(store.clone()));

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(mode = ?settings.mode, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
