//! Bookstore API: REST endpoints for book records backed by PostgreSQL.

pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError};
pub use models::{Book, BookFields, NewBook};
pub use routes::{book_routes, common_routes};
pub use settings::{Mode, Settings};
pub use state::AppState;
pub use store::{ensure_books_table, ensure_database_exists, BookStore, InMemoryBookStore, PgBookStore};

use axum::Router;

/// Full application router: common routes plus the books API.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(book_routes(state))
}
