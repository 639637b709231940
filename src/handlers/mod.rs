//! HTTP handlers for the books API.

pub mod books;
