//! Request body validation for book create/update.
//!
//! Field validation runs before any business rule and reports every failing
//! field at once.

use crate::response::FieldError;
use bookshelf_core::{BookDraft, BookId};
use serde::Deserialize;

/// Raw JSON body of `POST /books` and `PUT /books/{id}`.
///
/// Every field is optional at the serde level so that missing fields are
/// reported as validation errors instead of parse failures.
#[derive(Debug, Default, Deserialize)]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i64>,
}

/// Turns a payload into a draft, or lists every invalid field.
///
/// A zero year counts as missing.
pub fn validate_book_payload(payload: BookPayload) -> Result<BookDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = required_text("title", payload.title, &mut errors);
    let author = required_text("author", payload.author, &mut errors);
    let year = match payload.year {
        None | Some(0) => {
            errors.push(FieldError::required("year"));
            None
        }
        Some(value) => match i32::try_from(value) {
            Ok(year) if year > 0 => Some(year),
            _ => {
                errors.push(FieldError::new(
                    "year",
                    "This field must be a positive year",
                ));
                None
            }
        },
    };

    match (title, author, year) {
        (Some(title), Some(author), Some(year)) => Ok(BookDraft::new(title, author, year)),
        _ => Err(errors),
    }
}

/// Parses the `{id}` path segment.
pub fn parse_book_id(raw: &str) -> Option<BookId> {
    raw.parse::<BookId>().ok()
}

fn required_text(
    field: &str,
    value: Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            errors.push(FieldError::required(field));
            None
        }
    }
}
