use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    BookId, LoanId, UserId,
    book::BookShelf,
    directory::UserDirectory,
    error::LibraryError,
};

/// A loan record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Loan {
    /// Identifier assigned when the loan was opened
    pub id: LoanId,
    /// Borrowing user
    pub user_id: UserId,
    /// Borrowed book
    pub book_id: BookId,
    /// Whether the book has been returned
    pub returned: bool,
}

/// Container of loan records, keyed by identifier.
///
/// The desk is the component that flips book availability; the
/// reservation registry only reacts to the return signal the host
/// forwards to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoanDesk {
    /// Loan records by identifier
    loans: BTreeMap<LoanId, Loan>,
    /// Next identifier to assign, starting from 1
    next_id: LoanId,
}

impl Default for LoanDesk {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanDesk {
    /// Create an empty desk
    #[must_use]
    pub fn new() -> Self {
        Self { loans: BTreeMap::new(), next_id: 1 }
    }

    /// Lend a book to a user and return the loan identifier. Marks the
    /// book as unavailable on the shelf.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` if the user does not exist,
    /// `LibraryError::BookNotFound` if the book does not exist, or
    /// `LibraryError::BookUnavailable` if the book is already on loan.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn loan_book(
        &mut self,
        users: &dyn UserDirectory,
        books: &mut BookShelf,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<LoanId, LibraryError> {
        users.get_user(user_id).map_err(|_| LibraryError::UserNotFound(user_id))?;

        let book = books.get(book_id)?;
        if !book.available {
            return Err(LibraryError::BookUnavailable(book_id));
        }
        books.set_available(book_id, false)?;

        let id = self.next_id;
        self.next_id += 1;
        self.loans.insert(id, Loan { id, user_id, book_id, returned: false });

        Ok(id)
    }

    /// Close a loan, marking the book as available again. Returns the
    /// book identifier so the host can forward the return signal to the
    /// reservation registry.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::LoanNotFound` if the loan does not exist,
    /// or `LibraryError::LoanAlreadyReturned` if it was already closed.
    pub fn return_book(
        &mut self,
        books: &mut BookShelf,
        loan_id: LoanId,
    ) -> Result<BookId, LibraryError> {
        let loan = self.loans.get_mut(&loan_id).ok_or(LibraryError::LoanNotFound(loan_id))?;
        if loan.returned {
            return Err(LibraryError::LoanAlreadyReturned(loan_id));
        }
        loan.returned = true;

        let book_id = loan.book_id;
        books.set_available(book_id, true)?;

        Ok(book_id)
    }

    /// Look up a loan by identifier
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::LoanNotFound` if no loan is recorded under
    /// `id`.
    pub fn get(&self, id: LoanId) -> Result<&Loan, LibraryError> {
        self.loans.get(&id).ok_or(LibraryError::LoanNotFound(id))
    }

    /// All loan records, in identifier order
    #[must_use]
    pub fn loans(&self) -> Vec<&Loan> {
        self.loans.values().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::missing_docs_in_private_items)]
mod tests {
    use super::*;
    use crate::user::UserRoster;

    /// Helper building a roster with one user and a shelf with one book
    fn setup() -> (UserRoster, BookShelf, UserId, BookId) {
        let mut roster = UserRoster::new();
        let user_id = roster.add_user("Jan Kowalski", "jan@example.com").unwrap();
        let mut shelf = BookShelf::new();
        let book_id =
            shelf.add_book("Władca Pierścieni", "J.R.R. Tolkien", "9788328705141", 1954).unwrap();
        (roster, shelf, user_id, book_id)
    }

    #[test]
    fn test_loan_marks_book_unavailable() {
        let (roster, mut shelf, user_id, book_id) = setup();
        let mut desk = LoanDesk::new();

        let loan_id = desk.loan_book(&roster, &mut shelf, user_id, book_id).unwrap();
        assert!(!shelf.get(book_id).unwrap().available);

        let loan = desk.get(loan_id).unwrap();
        assert_eq!(loan.user_id, user_id);
        assert_eq!(loan.book_id, book_id);
        assert!(!loan.returned);
    }

    #[test]
    fn test_loan_requires_known_user_and_book() {
        let (roster, mut shelf, user_id, book_id) = setup();
        let mut desk = LoanDesk::new();

        assert!(matches!(
            desk.loan_book(&roster, &mut shelf, 99, book_id),
            Err(LibraryError::UserNotFound(99))
        ));
        assert!(matches!(
            desk.loan_book(&roster, &mut shelf, user_id, 99),
            Err(LibraryError::BookNotFound(99))
        ));
    }

    #[test]
    fn test_cannot_loan_book_twice() {
        let (mut roster, mut shelf, user_id, book_id) = setup();
        let mut desk = LoanDesk::new();
        let other = roster.add_user("Anna Nowak", "anna@example.com").unwrap();

        desk.loan_book(&roster, &mut shelf, user_id, book_id).unwrap();
        assert!(matches!(
            desk.loan_book(&roster, &mut shelf, other, book_id),
            Err(LibraryError::BookUnavailable(_))
        ));
    }

    #[test]
    fn test_return_reopens_availability() {
        let (roster, mut shelf, user_id, book_id) = setup();
        let mut desk = LoanDesk::new();

        let loan_id = desk.loan_book(&roster, &mut shelf, user_id, book_id).unwrap();
        let returned_book = desk.return_book(&mut shelf, loan_id).unwrap();

        assert_eq!(returned_book, book_id);
        assert!(shelf.get(book_id).unwrap().available);
        assert!(desk.get(loan_id).unwrap().returned);
    }

    #[test]
    fn test_double_return_is_rejected() {
        let (roster, mut shelf, user_id, book_id) = setup();
        let mut desk = LoanDesk::new();

        let loan_id = desk.loan_book(&roster, &mut shelf, user_id, book_id).unwrap();
        desk.return_book(&mut shelf, loan_id).unwrap();
        assert!(matches!(
            desk.return_book(&mut shelf, loan_id),
            Err(LibraryError::LoanAlreadyReturned(_))
        ));
        assert!(matches!(desk.return_book(&mut shelf, 99), Err(LibraryError::LoanNotFound(99))));
    }
}
