//! Router tests against a live PostgreSQL test database.
//! Runs only when `TEST_DATABASE_URL` is set; the `books` table is emptied afterwards.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use bookstore_api::{app, ensure_books_table, ensure_database_exists, AppState, PgBookStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn postgres_book_lifecycle() {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return;
    };
    ensure_database_exists(&url).await.unwrap();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .unwrap();
    ensure_books_table(&pool).await.unwrap();
    sqlx::query("DELETE FROM books").execute(&pool).await.unwrap();
    sqlx::query(
        "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year) \
         VALUES ('123', 'https://amazon.com/book', 'testAuth', 'English', 1500, 'testPublisher', 'testTitle', 2020)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let store = PgBookStore::new(pool.clone());
    let app = app(AppState::new(Arc::new(store.clone())));

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"][0]["isbn"], "123");
    assert_eq!(body["books"][0]["author"], "testAuth");

    let (status, _) = send(&app, Method::GET, "/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let created = json!({
        "isbn": "32794782",
        "amazon_url": "https://taco.com",
        "author": "mctest",
        "language": "english",
        "pages": 1000,
        "publisher": "yeah right",
        "title": "amazing times",
        "year": 2000
    });
    let (status, body) = send(&app, Method::POST, "/books", Some(created.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"], created);

    let (status, _) = send(&app, Method::POST, "/books", Some(created)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, "/books", Some(json!({ "pages": 200 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let update = json!({
        "amazon_url": "https://taco.com",
        "author": "mctest",
        "language": "spanish",
        "pages": 1000,
        "publisher": "yeah right",
        "title": "UPDATED BOOK",
        "year": 1999
    });
    let (status, body) = send(&app, Method::PUT, "/books/123", Some(update.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["year"], 1999);
    assert_eq!(body["book"]["language"], "spanish");

    let (status, _) = send(&app, Method::PUT, "/books/999", Some(update)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, "/books/123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted");
    let (status, _) = send(&app, Method::GET, "/books/123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    sqlx::query("DELETE FROM books").execute(&pool).await.unwrap();
    store.close().await;
}
