use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    BookDraft, BookRepository, BookService, BookServiceError, FixedClock, SqliteBookRepository,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;

fn clock_at(year: i32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(year, 6, 15, 8, 0, 0).unwrap())
}

fn service_at(
    conn: &Connection,
    now: DateTime<Utc>,
) -> BookService<SqliteBookRepository<'_>, FixedClock> {
    BookService::with_clock(SqliteBookRepository::try_new(conn).unwrap(), FixedClock(now))
}

fn service_in(conn: &Connection, year: i32) -> BookService<SqliteBookRepository<'_>, FixedClock> {
    BookService::with_clock(SqliteBookRepository::try_new(conn).unwrap(), clock_at(year))
}

#[test]
fn create_stamps_timestamps_and_assigns_id() {
    let conn = open_db_in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();
    let service = service_at(&conn, now);

    let book = service
        .create_book(BookDraft::new("T", "A", 2024))
        .unwrap();

    assert!(book.id > 0);
    assert_eq!(book.created_at, now);
    assert_eq!(book.updated_at, now);
    assert_eq!(service.get_book(book.id).unwrap(), book);
}

#[test]
fn create_with_existing_title_is_already_exists_regardless_of_other_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    service
        .create_book(BookDraft::new("Same Title", "First Author", 2001))
        .unwrap();

    let err = service
        .create_book(BookDraft::new("Same Title", "Another Author", 1999))
        .unwrap_err();
    assert!(matches!(err, BookServiceError::AlreadyExists(ref title) if title == "Same Title"));
    assert_eq!(service.list_books().unwrap().len(), 1);
}

#[test]
fn create_with_future_year_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    let err = service
        .create_book(BookDraft::new("Tomorrow", "A", 2025))
        .unwrap_err();
    assert!(matches!(
        err,
        BookServiceError::FutureYear {
            year: 2025,
            current_year: 2024
        }
    ));
    assert!(service.list_books().unwrap().is_empty());
}

#[test]
fn get_missing_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    assert!(matches!(
        service.get_book(42).unwrap_err(),
        BookServiceError::NotFound(42)
    ));
}

#[test]
fn update_preserves_created_at_and_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let created_at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let updated_at = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();

    let created = service_at(&conn, created_at)
        .create_book(BookDraft::new("Old Title", "A", 2020))
        .unwrap();

    let updated = service_at(&conn, updated_at)
        .update_book(created.id, BookDraft::new("New Title", "B", 2021))
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created_at);
    assert_eq!(updated.updated_at, updated_at);

    let stored = service_at(&conn, updated_at).get_book(created.id).unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn update_with_future_year_leaves_record_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    let book = service
        .create_book(BookDraft::new("Stable", "A", 2010))
        .unwrap();

    let err = service
        .update_book(book.id, BookDraft::new("Changed", "B", 2045))
        .unwrap_err();
    assert!(matches!(err, BookServiceError::FutureYear { year: 2045, .. }));

    assert_eq!(service.get_book(book.id).unwrap(), book);
}

#[test]
fn update_missing_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    let err = service
        .update_book(7, BookDraft::new("T", "A", 2000))
        .unwrap_err();
    assert!(matches!(err, BookServiceError::NotFound(7)));
}

#[test]
fn update_may_keep_own_title_but_not_take_another() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    let first = service
        .create_book(BookDraft::new("First", "A", 2000))
        .unwrap();
    let second = service
        .create_book(BookDraft::new("Second", "A", 2001))
        .unwrap();

    service
        .update_book(first.id, BookDraft::new("First", "Renamed Author", 2002))
        .unwrap();

    let err = service
        .update_book(second.id, BookDraft::new("First", "A", 2001))
        .unwrap_err();
    assert!(matches!(err, BookServiceError::AlreadyExists(_)));
    assert_eq!(service.get_book(second.id).unwrap().title, "Second");
}

#[test]
fn delete_recent_book_removes_it() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    let book = service
        .create_book(BookDraft::new("Recent", "A", 2014))
        .unwrap();

    service.delete_book(book.id).unwrap();
    assert!(matches!(
        service.get_book(book.id).unwrap_err(),
        BookServiceError::NotFound(_)
    ));
}

#[test]
fn delete_book_older_than_ten_years_is_too_old_and_kept() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    let book = service
        .create_book(BookDraft::new("Ancient", "A", 2013))
        .unwrap();

    let err = service.delete_book(book.id).unwrap_err();
    assert!(matches!(
        err,
        BookServiceError::TooOld {
            year: 2013,
            age: 11
        }
    ));
    assert!(service.get_book(book.id).is_ok());
}

#[test]
fn delete_missing_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_in(&conn, 2024);

    assert!(matches!(
        service.delete_book(1).unwrap_err(),
        BookServiceError::NotFound(1)
    ));
}

#[test]
fn duplicate_title_from_storage_maps_to_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let mut existing = bookshelf_core::Book::from_draft(
        BookDraft::new("Raced", "A", 2000),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );
    repo.insert_book(&mut existing).unwrap();

    let mut racer = existing.clone();
    let err = BookServiceError::from(repo.insert_book(&mut racer).unwrap_err());
    assert!(matches!(err, BookServiceError::AlreadyExists(_)));
}
