//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-statement CRUD APIs over the `books` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Book::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `get_book` reports absence as `Ok(None)`, never as an error.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::book::{Book, BookId, BookValidationError};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    year,
    created_at,
    updated_at
FROM books";

const REQUIRED_BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "year",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    NotFound(BookId),
    /// Storage-level unique index on `books.title` rejected the write.
    DuplicateTitle(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::DuplicateTitle(title) => write!(f, "book title already exists: `{title}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for book CRUD operations.
pub trait BookRepository {
    /// Lists every book ordered by id.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Gets one book by id; `None` when no row matches.
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Finds books with exactly this title.
    fn find_by_title(&self, title: &str) -> RepoResult<Vec<Book>>;
    /// Inserts a book and writes the generated id back into `book`.
    fn insert_book(&self, book: &mut Book) -> RepoResult<BookId>;
    /// Updates title, author, year and `updated_at` of the row with `book.id`.
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    /// Hard-deletes one book by id.
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one this binary expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_book_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let books = self
            .query_books(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"), [])
            .inspect_err(|err| {
                error!("event=book_list module=repo status=error error={err}");
            })?;

        info!(
            "event=book_list module=repo status=ok count={}",
            books.len()
        );
        Ok(books)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => {
                let book = parse_book_row(row)?;
                info!("event=book_get module=repo status=ok id={id}");
                Ok(Some(book))
            }
            None => {
                warn!("event=book_get module=repo status=absent id={id}");
                Ok(None)
            }
        }
    }

    fn find_by_title(&self, title: &str) -> RepoResult<Vec<Book>> {
        let books = self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE title = ?1 ORDER BY id ASC;"),
            [title],
        )?;

        info!(
            "event=book_find_by_title module=repo status=ok count={}",
            books.len()
        );
        Ok(books)
    }

    fn insert_book(&self, book: &mut Book) -> RepoResult<BookId> {
        book.validate()?;

        self.conn
            .execute(
                "INSERT INTO books (
                    title,
                    author,
                    year,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    book.title.as_str(),
                    book.author.as_str(),
                    book.year,
                    book.created_at.timestamp_millis(),
                    book.updated_at.timestamp_millis(),
                ],
            )
            .map_err(|err| map_write_error(err, &book.title))
            .inspect_err(|err| {
                error!("event=book_insert module=repo status=error error={err}");
            })?;

        book.id = self.conn.last_insert_rowid();
        info!("event=book_insert module=repo status=ok id={}", book.id);
        Ok(book.id)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        book.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE books
                 SET
                    title = ?1,
                    author = ?2,
                    year = ?3,
                    updated_at = ?4
                 WHERE id = ?5;",
                params![
                    book.title.as_str(),
                    book.author.as_str(),
                    book.year,
                    book.updated_at.timestamp_millis(),
                    book.id,
                ],
            )
            .map_err(|err| map_write_error(err, &book.title))
            .inspect_err(|err| {
                error!(
                    "event=book_update module=repo status=error id={} error={err}",
                    book.id
                );
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound(book.id));
        }

        info!("event=book_update module=repo status=ok id={}", book.id);
        Ok(())
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", [id])
            .inspect_err(|err| {
                error!("event=book_delete module=repo status=error id={id} error={err}");
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=book_delete module=repo status=ok id={id}");
        Ok(())
    }
}

impl SqliteBookRepository<'_> {
    fn query_books<P: rusqlite::Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let book = Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        year: row.get("year")?,
        created_at: parse_millis(row.get("created_at")?, "created_at")?,
        updated_at: parse_millis(row.get("updated_at")?, "updated_at")?,
    };
    book.validate()?;
    Ok(book)
}

fn parse_millis(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "timestamp `{value}` out of range in books.{column}"
        ))
    })
}

fn map_write_error(err: rusqlite::Error, title: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateTitle(title.to_string())
        }
        _ => err.into(),
    }
}

fn ensure_book_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'books'
        );",
        [],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable("books"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(books);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for required in REQUIRED_BOOK_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: "books",
                column: *required,
            });
        }
    }

    Ok(())
}
