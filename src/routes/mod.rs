//! Route tables.

mod books;
mod common;

pub use books::{book_routes, BODY_LIMIT_BYTES};
pub use common::common_routes;
