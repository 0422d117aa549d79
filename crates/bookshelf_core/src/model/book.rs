//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical book record shared by storage, service and transport.
//! - Provide shape validation used before every persistence write.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another book.
//! - `title` and `author` are non-empty after trimming.
//! - `year` is strictly positive.
//! - `created_at` never changes after the first insert.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of a book row.
pub type BookId = i64;

/// Shape violations detected by `Book::validate` / `BookDraft::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    EmptyAuthor,
    NonPositiveYear(i32),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "book title cannot be empty"),
            Self::EmptyAuthor => write!(f, "book author cannot be empty"),
            Self::NonPositiveYear(year) => {
                write!(f, "publication year must be positive, got {year}")
            }
        }
    }
}

impl Error for BookValidationError {}

/// Caller-supplied book fields for create and update use-cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Checks field shape only; business rules live in the service layer.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        validate_fields(&self.title, &self.author, self.year)
    }
}

/// Canonical persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Zero until the record has been inserted.
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Publication year.
    pub year: i32,
    /// Serialized as RFC3339.
    pub created_at: DateTime<Utc>,
    /// Serialized as RFC3339.
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Builds a not-yet-persisted record with both timestamps set to `now`.
    ///
    /// Timestamps are truncated to milliseconds, the storage resolution.
    pub fn from_draft(draft: BookDraft, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(3);
        Self {
            id: 0,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the mutable fields and refreshes `updated_at`.
    ///
    /// `id` and `created_at` are preserved.
    pub fn apply_draft(&mut self, draft: BookDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.author = draft.author;
        self.year = draft.year;
        self.updated_at = now.trunc_subsecs(3);
    }

    pub fn validate(&self) -> Result<(), BookValidationError> {
        validate_fields(&self.title, &self.author, self.year)
    }
}

fn validate_fields(title: &str, author: &str, year: i32) -> Result<(), BookValidationError> {
    if title.trim().is_empty() {
        return Err(BookValidationError::EmptyTitle);
    }
    if author.trim().is_empty() {
        return Err(BookValidationError::EmptyAuthor);
    }
    if year <= 0 {
        return Err(BookValidationError::NonPositiveYear(year));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Book, BookDraft, BookValidationError};
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn draft_validation_rejects_blank_fields() {
        assert_eq!(
            BookDraft::new("  ", "A", 2000).validate(),
            Err(BookValidationError::EmptyTitle)
        );
        assert_eq!(
            BookDraft::new("T", "", 2000).validate(),
            Err(BookValidationError::EmptyAuthor)
        );
        assert_eq!(
            BookDraft::new("T", "A", 0).validate(),
            Err(BookValidationError::NonPositiveYear(0))
        );
        assert!(BookDraft::new("T", "A", 1).validate().is_ok());
    }

    #[test]
    fn from_draft_truncates_timestamps_to_millis() {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();

        let book = Book::from_draft(BookDraft::new("T", "A", 2024), now);

        assert_eq!(book.id, 0);
        assert_eq!(book.created_at.nanosecond(), 123_000_000);
        assert_eq!(book.created_at, book.updated_at);
    }

    #[test]
    fn apply_draft_preserves_identity_and_creation_time() {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let mut book = Book::from_draft(BookDraft::new("Old", "A", 2019), created);
        book.id = 7;

        book.apply_draft(BookDraft::new("New", "B", 2020), later);

        assert_eq!(book.id, 7);
        assert_eq!(book.title, "New");
        assert_eq!(book.created_at, created);
        assert_eq!(book.updated_at, later);
    }

    #[test]
    fn serializes_timestamps_as_rfc3339() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let book = Book::from_draft(BookDraft::new("T", "A", 2024), at);

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T12:30:00Z");
        assert_eq!(json["year"], 2024);
    }
}
