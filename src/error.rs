use std::fmt;

use crate::{BookId, LoanId, ReservationId, UserId, reservation::ReservationStatus};

/// Custom error type for library system operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// No user registered under the given identifier
    UserNotFound(UserId),
    /// No book catalogued under the given identifier
    BookNotFound(BookId),
    /// No loan recorded under the given identifier
    LoanNotFound(LoanId),
    /// No reservation registered under the given handle
    ReservationNotFound(ReservationId),
    /// The named category does not exist
    CategoryNotFound(String),
    /// The named category already exists
    CategoryExists(String),
    /// The book is currently available, so it can be borrowed instead of reserved
    BookAvailable(BookId),
    /// The book is currently on loan and cannot be borrowed
    BookUnavailable(BookId),
    /// The loan was already closed by an earlier return
    LoanAlreadyReturned(LoanId),
    /// The user already holds an active reservation for this book
    DuplicateReservation {
        /// User holding the conflicting reservation
        user_id: UserId,
        /// Book the conflicting reservation is for
        book_id: BookId,
    },
    /// The requested transition is not valid for the reservation's current status
    InvalidTransition {
        /// Reservation the operation was attempted on
        reservation: ReservationId,
        /// Status the reservation was in at the time
        status: ReservationStatus,
    },
    /// An input value failed validation
    Validation(String),
    /// Error occurred while saving state
    Persistence(String),
    /// Error occurred while loading state
    Load(String),
}

impl std::error::Error for LibraryError {}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "User {id} does not exist"),
            Self::BookNotFound(id) => write!(f, "Book {id} does not exist"),
            Self::LoanNotFound(id) => write!(f, "Loan {id} does not exist"),
            Self::ReservationNotFound(id) => write!(f, "Reservation {id} does not exist"),
            Self::CategoryNotFound(name) => write!(f, "Category {name:?} does not exist"),
            Self::CategoryExists(name) => write!(f, "Category {name:?} already exists"),
            Self::BookAvailable(id) => {
                write!(f, "Book {id} is available, it can be borrowed instead of reserved")
            }
            Self::BookUnavailable(id) => write!(f, "Book {id} is already on loan"),
            Self::LoanAlreadyReturned(id) => {
                write!(f, "The book from loan {id} was already returned")
            }
            Self::DuplicateReservation { user_id, book_id } => {
                write!(f, "User {user_id} already reserved book {book_id}")
            }
            Self::InvalidTransition { reservation, status } => {
                write!(f, "Reservation {reservation} cannot change from status {status:?}")
            }
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Persistence(msg) => write!(f, "Persistence error: {msg}"),
            Self::Load(msg) => write!(f, "Load error: {msg}"),
        }
    }
}
