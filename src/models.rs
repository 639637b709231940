//! Book entity and request payloads.

use serde::{Deserialize, Serialize};

/// One row of the `books` table. `isbn` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// Every column except the key; the whole set is overwritten on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// Create payload: key plus fields, flat on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    #[serde(flatten)]
    pub fields: BookFields,
}

impl Book {
    pub fn from_parts(isbn: impl Into<String>, fields: BookFields) -> Self {
        Book {
            isbn: isbn.into(),
            amazon_url: fields.amazon_url,
            author: fields.author,
            language: fields.language,
            pages: fields.pages,
            publisher: fields.publisher,
            title: fields.title,
            year: fields.year,
        }
    }
}

impl From<NewBook> for Book {
    fn from(new: NewBook) -> Self {
        Book::from_parts(new.isbn, new.fields)
    }
}
