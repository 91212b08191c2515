//! In-memory library management system built around a reservation queue.
//!
//! This crate provides a reservation registry implementing the hold
//! lifecycle for library books (waiting, ready, completed, cancelled,
//! expired) with a FIFO queue per book, alongside the book, user and
//! loan records it collaborates with.

pub mod book;
pub mod directory;
pub mod error;
pub mod loan;
pub mod observers;
pub mod persistence;
pub mod registry;
pub mod reservation;
pub mod user;
pub mod validate;

pub use book::{Book, BookShelf};
pub use error::LibraryError;
pub use loan::{Loan, LoanDesk};
pub use registry::ReservationRegistry;
pub use reservation::{Reservation, ReservationStatus};
pub use user::{User, UserRoster};

/// Identifier assigned to a registered user.
pub type UserId = u64;

/// Identifier assigned to a catalogued book.
pub type BookId = u64;

/// Identifier assigned to a loan record.
pub type LoanId = u64;

/// Opaque handle assigned to a reservation at creation, never reused.
pub type ReservationId = u64;
