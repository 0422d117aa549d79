//! Domain model for the book catalog.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every persisted book is identified by a storage-assigned `BookId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod book;
