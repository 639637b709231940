//! Book persistence: the `BookStore` seam, its PostgreSQL implementation, and an in-memory one.

use crate::error::{AppError, ConfigError};
use crate::models::{Book, BookFields, NewBook};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::str::FromStr;
use tokio::sync::RwLock;

/// Operations the router needs from storage. Implementations are injected via `AppState`.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every book; no filtering, order not part of the contract.
    async fn list_all(&self) -> Result<Vec<Book>, AppError>;

    /// `NotFound` when no row has this isbn.
    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, AppError>;

    /// `Conflict` when the isbn already exists.
    async fn create(&self, book: NewBook) -> Result<Book, AppError>;

    /// Overwrite all non-key columns. `NotFound` when the isbn is absent.
    async fn update(&self, isbn: &str, fields: BookFields) -> Result<Book, AppError>;

    /// `NotFound` when the isbn is absent.
    async fn remove(&self, isbn: &str) -> Result<(), AppError>;

    /// Used by the readiness route.
    async fn ping(&self) -> Result<(), AppError>;
}

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

/// Create the `books` table if it does not exist.
pub async fn ensure_books_table(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            isbn TEXT PRIMARY KEY,
            amazon_url TEXT NOT NULL,
            author TEXT NOT NULL,
            language TEXT NOT NULL,
            pages INTEGER NOT NULL,
            publisher TEXT NOT NULL,
            title TEXT NOT NULL,
            year INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Create the database named in `database_url` when it is missing.
/// The check runs over a connection to the server's `postgres` maintenance database.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, name) = maintenance_options(database_url)?;
    if name == "postgres" {
        return Ok(());
    }
    let mut conn = admin.connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %name, "creating database");
        let ident = name.replace('"', "\"\"");
        sqlx::query(&format!("CREATE DATABASE \"{}\"", ident))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options pointing at the `postgres` database on the same server, plus the target database name.
fn maintenance_options(database_url: &str) -> Result<(PgConnectOptions, String), ConfigError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::DatabaseUrl(e.to_string()))?;
    let name = opts
        .get_database()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::DatabaseUrl(format!("no database name in '{}'", database_url)))?;
    Ok((opts.database("postgres"), name))
}

/// Maps a unique-key violation on insert to `Conflict`; everything else stays a database error.
fn insert_error(isbn: &str, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("book with isbn '{}' already exists", isbn))
        }
        _ => AppError::Db(e),
    }
}

fn not_found(isbn: &str) -> AppError {
    AppError::NotFound(format!("no book with isbn '{}'", isbn))
}

/// `BookStore` over a PostgreSQL pool. Each call checks a connection out of the pool
/// for one statement and returns it when the statement completes.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        PgBookStore { pool }
    }

    /// Wait for checked-out connections to return, then close them.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list_all(&self) -> Result<Vec<Book>, AppError> {
        let sql = format!("SELECT {} FROM books ORDER BY isbn", BOOK_COLUMNS);
        let books = sqlx::query_as::<_, Book>(&sql).fetch_all(&self.pool).await?;
        Ok(books)
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, AppError> {
        let sql = format!("SELECT {} FROM books WHERE isbn = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(isbn))
    }

    async fn create(&self, book: NewBook) -> Result<Book, AppError> {
        let sql = format!(
            "INSERT INTO books ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            BOOK_COLUMNS, BOOK_COLUMNS
        );
        let f = &book.fields;
        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.isbn)
            .bind(&f.amazon_url)
            .bind(&f.author)
            .bind(&f.language)
            .bind(f.pages)
            .bind(&f.publisher)
            .bind(&f.title)
            .bind(f.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| insert_error(&book.isbn, e))
    }

    async fn update(&self, isbn: &str, fields: BookFields) -> Result<Book, AppError> {
        let sql = format!(
            "UPDATE books SET amazon_url = $1, author = $2, language = $3, pages = $4, \
             publisher = $5, title = $6, year = $7 WHERE isbn = $8 RETURNING {}",
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(&fields.amazon_url)
            .bind(&fields.author)
            .bind(&fields.language)
            .bind(fields.pages)
            .bind(&fields.publisher)
            .bind(&fields.title)
            .bind(fields.year)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(isbn))
    }

    async fn remove(&self, isbn: &str) -> Result<(), AppError> {
        let deleted: Option<(String,)> = sqlx::query_as("DELETE FROM books WHERE isbn = $1 RETURNING isbn")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        deleted.map(|_| ()).ok_or_else(|| not_found(isbn))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// `BookStore` kept in process memory, keyed by isbn. Same error semantics as `PgBookStore`.
#[derive(Default)]
pub struct InMemoryBookStore {
    books: RwLock<BTreeMap<String, Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list_all(&self) -> Result<Vec<Book>, AppError> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, AppError> {
        self.books
            .read()
            .await
            .get(isbn)
            .cloned()
            .ok_or_else(|| not_found(isbn))
    }

    async fn create(&self, book: NewBook) -> Result<Book, AppError> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(AppError::Conflict(format!(
                "book with isbn '{}' already exists",
                book.isbn
            )));
        }
        let book = Book::from(book);
        books.insert(book.isbn.clone(), book.clone());
        Ok(book)
    }

    async fn update(&self, isbn: &str, fields: BookFields) -> Result<Book, AppError> {
        let mut books = self.books.write().await;
        let slot = books.get_mut(isbn).ok_or_else(|| not_found(isbn))?;
        *slot = Book::from_parts(isbn, fields);
        Ok(slot.clone())
    }

    async fn remove(&self, isbn: &str) -> Result<(), AppError> {
        self.books
            .write()
            .await
            .remove(isbn)
            .map(|_| ())
            .ok_or_else(|| not_found(isbn))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
