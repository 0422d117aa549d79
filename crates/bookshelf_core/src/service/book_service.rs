//! Book use-case service.
//!
//! # Responsibility
//! - Enforce catalog invariants before any mutation reaches storage.
//! - Translate absence and rule violations into named service errors.
//!
//! # Invariants
//! - Titles are unique across all books.
//! - A written publication year never exceeds the current calendar year.
//! - Books older than `MAX_DELETABLE_AGE_YEARS` are never deleted.
//! - `created_at` is preserved across updates.
//!
//! Each operation is a linear check-then-act sequence; callers that need
//! atomicity run it inside `DbHandle::with_transaction`.

use crate::clock::{Clock, SystemClock};
use crate::db::DbError;
use crate::model::book::{Book, BookDraft, BookId};
use crate::repo::book_repo::{BookRepository, RepoError};
use chrono::Datelike;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Books whose age in years exceeds this value cannot be deleted.
pub const MAX_DELETABLE_AGE_YEARS: i32 = 10;

pub type ServiceResult<T> = Result<T, BookServiceError>;

/// Service error for book use-cases.
#[derive(Debug)]
pub enum BookServiceError {
    /// Target book does not exist.
    NotFound(BookId),
    /// Another book already uses this title.
    AlreadyExists(String),
    /// Publication year is later than the current calendar year.
    FutureYear { year: i32, current_year: i32 },
    /// Book is too old to be deleted.
    TooOld { year: i32, age: i32 },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for BookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::AlreadyExists(title) => write!(f, "book with title `{title}` already exists"),
            Self::FutureYear { year, current_year } => write!(
                f,
                "publication year {year} is later than current year {current_year}"
            ),
            Self::TooOld { year, age } => write!(
                f,
                "book from {year} is {age} years old; older than {MAX_DELETABLE_AGE_YEARS} years cannot be deleted"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BookServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::DuplicateTitle(title) => Self::AlreadyExists(title),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for BookServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Book service facade over repository implementations.
pub struct BookService<R: BookRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using wall-clock time.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: BookRepository, C: Clock> BookService<R, C> {
    /// Creates a service with an explicit time source.
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Lists every book.
    pub fn list_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.repo.list_books()?)
    }

    /// Gets one book, failing with `NotFound` when absent.
    pub fn get_book(&self, id: BookId) -> ServiceResult<Book> {
        self.repo
            .get_book(id)?
            .ok_or(BookServiceError::NotFound(id))
    }

    /// Creates a book after the title-uniqueness and future-year checks.
    ///
    /// Both timestamps are stamped with the same instant.
    pub fn create_book(&self, draft: BookDraft) -> ServiceResult<Book> {
        if !self.repo.find_by_title(&draft.title)?.is_empty() {
            return Err(BookServiceError::AlreadyExists(draft.title));
        }

        let now = self.clock.now();
        ensure_not_future(draft.year, now.year())?;

        let mut book = Book::from_draft(draft, now);
        self.repo.insert_book(&mut book)?;
        Ok(book)
    }

    /// Replaces title, author and year of an existing book.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `FutureYear` when `draft.year` is after the current year.
    /// - `AlreadyExists` when the title belongs to a different book.
    pub fn update_book(&self, id: BookId, draft: BookDraft) -> ServiceResult<Book> {
        let mut book = self.get_book(id)?;

        let now = self.clock.now();
        ensure_not_future(draft.year, now.year())?;

        let title_taken = self
            .repo
            .find_by_title(&draft.title)?
            .iter()
            .any(|existing| existing.id != id);
        if title_taken {
            return Err(BookServiceError::AlreadyExists(draft.title));
        }

        book.apply_draft(draft, now);
        self.repo.update_book(&book)?;
        Ok(book)
    }

    /// Deletes a book unless it is older than `MAX_DELETABLE_AGE_YEARS`.
    pub fn delete_book(&self, id: BookId) -> ServiceResult<()> {
        let book = self.get_book(id)?;

        let age = self.clock.now().year() - book.year;
        if age > MAX_DELETABLE_AGE_YEARS {
            return Err(BookServiceError::TooOld {
                year: book.year,
                age,
            });
        }

        Ok(self.repo.delete_book(id)?)
    }
}

fn ensure_not_future(year: i32, current_year: i32) -> ServiceResult<()> {
    if year > current_year {
        return Err(BookServiceError::FutureYear { year, current_year });
    }
    Ok(())
}
