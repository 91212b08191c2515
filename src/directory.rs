//! Lookup contracts the reservation registry requires from its
//! collaborators. The registry only ever asks two questions: does this
//! user exist, and does this book exist and is it on the shelf.

use std::fmt;

use crate::{BookId, UserId, error::LibraryError};

/// Lookup failure reported by a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// No user registered under the given identifier
    UserNotFound(UserId),
    /// No book catalogued under the given identifier
    BookNotFound(BookId),
}

impl std::error::Error for DirectoryError {}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "User {id} does not exist"),
            Self::BookNotFound(id) => write!(f, "Book {id} does not exist"),
        }
    }
}

impl From<DirectoryError> for LibraryError {
    /// Rewrap a collaborator lookup failure into the registry's own
    /// not-found kind at the boundary
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::UserNotFound(id) => Self::UserNotFound(id),
            DirectoryError::BookNotFound(id) => Self::BookNotFound(id),
        }
    }
}

/// Snapshot of a user record, as much as the registry needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
}

/// Snapshot of a book record, as much as the registry needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    /// Book identifier
    pub id: BookId,
    /// Whether the book is currently on the shelf
    pub available: bool,
}

/// Directory of registered users
pub trait UserDirectory {
    /// Resolve a user identifier
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::UserNotFound` if no user is registered
    /// under `id`.
    fn get_user(&self, id: UserId) -> Result<UserSummary, DirectoryError>;
}

/// Directory of catalogued books
pub trait BookDirectory {
    /// Resolve a book identifier
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::BookNotFound` if no book is catalogued
    /// under `id`.
    fn get_book(&self, id: BookId) -> Result<BookSummary, DirectoryError>;
}
