//! Book handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::response::{book_created, book_ok, books_ok, message_ok};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let books = state.store.list_all().await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(books_ok(books))
}

pub async fn read(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book = state.store.get_by_isbn(&isbn).await?;
    Ok(book_ok(book))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let new_book = RequestValidator::validate_create(body)?;
    let book = state.store.create(new_book).await?;
    tracing::debug!(isbn = %book.isbn, "created book");
    Ok(book_created(book))
}

pub async fn update(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let fields = RequestValidator::validate_update(body)?;
    let book = state.store.update(&isbn, fields).await?;
    tracing::debug!(isbn = %isbn, "updated book");
    Ok(book_ok(book))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.store.remove(&isbn).await?;
    tracing::debug!(isbn = %isbn, "deleted book");
    Ok(message_ok("Book deleted"))
}
