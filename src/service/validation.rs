//! Request validation from declarative field rules.
//!
//! A [`Schema`] is a list of [`FieldRule`]s evaluated against a JSON body.
//! Every rule is checked and all violations are returned together, so a
//! client sees the complete list of problems in one response.

use crate::error::AppError;
use crate::models::{BookFields, NewBook};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// String that may not be blank; used for the primary key.
    Key,
    /// Integer fitting in 32 bits.
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Field must be absent from the body.
    Forbidden,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldRule {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    const fn forbidden(name: &'static str) -> Self {
        FieldRule {
            name,
            kind: FieldKind::String,
            presence: Presence::Forbidden,
        }
    }
}

/// One failed rule. `field` is empty when the body itself is the problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

const TEXT: FieldKind = FieldKind::String;
const INT: FieldKind = FieldKind::Integer;

fn field_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("amazon_url", TEXT),
        FieldRule::required("author", TEXT),
        FieldRule::required("language", TEXT),
        FieldRule::required("pages", INT),
        FieldRule::required("publisher", TEXT),
        FieldRule::required("title", TEXT),
        FieldRule::required("year", INT),
    ]
}

/// Create payload: every column including `isbn`.
pub fn create_schema() -> Schema {
    let mut rules = vec![FieldRule::required("isbn", FieldKind::Key)];
    rules.extend(field_rules());
    Schema { rules }
}

/// Update payload: every non-key column; `isbn` must not appear.
pub fn update_schema() -> Schema {
    let mut rules = vec![FieldRule::forbidden("isbn")];
    rules.extend(field_rules());
    Schema { rules }
}

impl Schema {
    /// Evaluate all rules against `body`.
    pub fn check(&self, body: &Value) -> Vec<Violation> {
        let Some(obj) = body.as_object() else {
            return vec![Violation::new("", "body must be a JSON object")];
        };
        let mut violations = Vec::new();
        for rule in &self.rules {
            let val = obj.get(rule.name);
            match rule.presence {
                Presence::Forbidden => {
                    if val.is_some() {
                        violations.push(Violation::new(
                            rule.name,
                            format!("{} is not allowed", rule.name),
                        ));
                    }
                }
                Presence::Required => match val {
                    None | Some(Value::Null) => violations.push(Violation::new(
                        rule.name,
                        format!("{} is required", rule.name),
                    )),
                    Some(v) => {
                        if let Some(message) = check_kind(rule.name, v, rule.kind) {
                            violations.push(Violation::new(rule.name, message));
                        }
                    }
                },
            }
        }
        violations
    }
}

fn check_kind(name: &str, v: &Value, kind: FieldKind) -> Option<String> {
    match kind {
        FieldKind::String => match v {
            Value::String(_) => None,
            _ => Some(format!("{} must be a string", name)),
        },
        FieldKind::Key => match v.as_str() {
            Some(s) if !s.trim().is_empty() => None,
            Some(_) => Some(format!("{} must not be empty", name)),
            None => Some(format!("{} must be a string", name)),
        },
        FieldKind::Integer => match v.as_i64() {
            Some(n) if i32::try_from(n).is_err() => Some(format!("{} is out of range", name)),
            Some(_) => None,
            None => Some(format!("{} must be an integer", name)),
        },
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body and decode it.
    pub fn validate_create(body: Value) -> Result<NewBook, AppError> {
        Self::decode(&create_schema(), body)
    }

    /// Validate an update body and decode it. Rejects any body carrying `isbn`.
    pub fn validate_update(body: Value) -> Result<BookFields, AppError> {
        Self::decode(&update_schema(), body)
    }

    fn decode<T: serde::de::DeserializeOwned>(schema: &Schema, body: Value) -> Result<T, AppError> {
        let violations = schema.check(&body);
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }
        serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_body() -> Value {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Lane",
            "language": "english",
            "pages": 264,
            "publisher": "Princeton University Press",
            "title": "Power-Up: Unlocking the Hidden Mathematics in Video Games",
            "year": 2017
        })
    }

    #[test]
    fn create_accepts_complete_body() {
        let book = RequestValidator::validate_create(full_body()).unwrap();
        assert_eq!(book.isbn, "0691161518");
        assert_eq!(book.fields.pages, 264);
    }

    #[test]
    fn create_reports_every_missing_field() {
        let violations = create_schema().check(&json!({ "pages": 200 }));
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["isbn", "amazon_url", "author", "language", "publisher", "title", "year"]
        );
    }

    #[test]
    fn type_mismatches_are_reported() {
        let mut body = full_body();
        body["pages"] = json!("264");
        body["author"] = json!(42);
        let violations = create_schema().check(&body);
        assert_eq!(
            violations,
            vec![
                Violation::new("author", "author must be a string"),
                Violation::new("pages", "pages must be an integer"),
            ]
        );
    }

    #[test]
    fn correctly_typed_edge_values_are_accepted() {
        let mut body = full_body();
        body["pages"] = json!(0);
        body["amazon_url"] = json!("");
        assert!(create_schema().check(&body).is_empty());
        let book = RequestValidator::validate_create(body).unwrap();
        assert_eq!(book.fields.pages, 0);
        assert_eq!(book.fields.amazon_url, "");
    }

    #[test]
    fn blank_isbn_and_oversized_integers_are_rejected() {
        let mut body = full_body();
        body["isbn"] = json!("  ");
        body["pages"] = json!(5_000_000_000_i64);
        let violations = create_schema().check(&body);
        assert_eq!(
            violations,
            vec![
                Violation::new("isbn", "isbn must not be empty"),
                Violation::new("pages", "pages is out of range"),
            ]
        );
    }

    #[test]
    fn non_object_body_is_one_violation() {
        let violations = create_schema().check(&json!([1, 2]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "");
    }

    #[test]
    fn update_forbids_isbn_even_when_otherwise_valid() {
        let err = RequestValidator::validate_update(full_body()).unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(v, vec![Violation::new("isbn", "isbn is not allowed")]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_accepts_body_without_isbn() {
        let mut body = full_body();
        body.as_object_mut().unwrap().remove("isbn");
        let fields = RequestValidator::validate_update(body).unwrap();
        assert_eq!(fields.year, 2017);
    }
}
