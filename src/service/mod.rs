//! Request validation for book payloads.

mod validation;
pub use validation::{create_schema, update_schema, FieldKind, FieldRule, Presence, RequestValidator, Schema, Violation};
