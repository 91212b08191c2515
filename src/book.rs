use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    BookId,
    directory::{BookDirectory, BookSummary, DirectoryError},
    error::LibraryError,
    validate,
};

/// A catalogued book
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    /// Identifier assigned when the book was catalogued
    pub id: BookId,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// ISBN, 10 or 13 digits
    pub isbn: String,
    /// Year of publication
    pub year: u16,
    /// Whether the book is currently on the shelf
    pub available: bool,
    /// Categories assigned to this book
    pub categories: Vec<String>,
}

/// Container of catalogued books and the category vocabulary, keyed by
/// book identifier.
///
/// Categories live here rather than in a separate component because
/// assigning or retiring a category mutates the book records directly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookShelf {
    /// Catalogued books by identifier
    books: BTreeMap<BookId, Book>,
    /// Next identifier to assign, starting from 1
    next_id: BookId,
    /// Known category names
    categories: BTreeSet<String>,
}

impl Default for BookShelf {
    fn default() -> Self {
        Self::new()
    }
}

impl BookShelf {
    /// Create an empty shelf
    #[must_use]
    pub fn new() -> Self {
        Self { books: BTreeMap::new(), next_id: 1, categories: BTreeSet::new() }
    }

    /// Catalogue a book and return the assigned identifier.
    /// New books start out available.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the ISBN is not 10 or 13
    /// digits.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn add_book(
        &mut self,
        title: &str,
        author: &str,
        isbn: &str,
        year: u16,
    ) -> Result<BookId, LibraryError> {
        if !validate::is_valid_isbn(isbn) {
            return Err(LibraryError::Validation(format!("invalid ISBN: {isbn}")));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.books.insert(
            id,
            Book {
                id,
                title: title.to_string(),
                author: author.to_string(),
                isbn: isbn.to_string(),
                year,
                available: true,
                categories: Vec::new(),
            },
        );

        Ok(id)
    }

    /// Remove a book from the catalogue
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if no book is catalogued
    /// under `id`.
    pub fn remove_book(&mut self, id: BookId) -> Result<(), LibraryError> {
        self.books.remove(&id).map(|_| ()).ok_or(LibraryError::BookNotFound(id))
    }

    /// Look up a book by identifier
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if no book is catalogued
    /// under `id`.
    pub fn get(&self, id: BookId) -> Result<&Book, LibraryError> {
        self.books.get(&id).ok_or(LibraryError::BookNotFound(id))
    }

    /// Update a book's title, author and/or year; `None` leaves a field
    /// unchanged
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if the book does not exist.
    pub fn update_book(
        &mut self,
        id: BookId,
        new_title: Option<&str>,
        new_author: Option<&str>,
        new_year: Option<u16>,
    ) -> Result<(), LibraryError> {
        let book = self.books.get_mut(&id).ok_or(LibraryError::BookNotFound(id))?;
        if let Some(title) = new_title {
            book.title = title.to_string();
        }
        if let Some(author) = new_author {
            book.author = author.to_string();
        }
        if let Some(year) = new_year {
            book.year = year;
        }
        Ok(())
    }

    /// Mark a book as on loan or back on the shelf
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if the book does not exist.
    pub fn set_available(&mut self, id: BookId, available: bool) -> Result<(), LibraryError> {
        let book = self.books.get_mut(&id).ok_or(LibraryError::BookNotFound(id))?;
        book.available = available;
        Ok(())
    }

    /// Find books whose title contains the given fragment, case-insensitively
    #[must_use]
    pub fn find_by_title(&self, fragment: &str) -> Vec<&Book> {
        let needle = fragment.to_lowercase();
        self.books.values().filter(|book| book.title.to_lowercase().contains(&needle)).collect()
    }

    /// Find books whose author contains the given fragment, case-insensitively
    #[must_use]
    pub fn find_by_author(&self, fragment: &str) -> Vec<&Book> {
        let needle = fragment.to_lowercase();
        self.books.values().filter(|book| book.author.to_lowercase().contains(&needle)).collect()
    }

    /// All catalogued books, in identifier order
    #[must_use]
    pub fn books(&self) -> Vec<&Book> {
        self.books.values().collect()
    }

    /// Add a category to the vocabulary
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::CategoryExists` if the category is already
    /// known.
    pub fn add_category(&mut self, category: &str) -> Result<(), LibraryError> {
        if !self.categories.insert(category.to_string()) {
            return Err(LibraryError::CategoryExists(category.to_string()));
        }
        Ok(())
    }

    /// Retire a category, stripping it from every book that carries it
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::CategoryNotFound` if the category is not
    /// known.
    pub fn remove_category(&mut self, category: &str) -> Result<(), LibraryError> {
        if !self.categories.remove(category) {
            return Err(LibraryError::CategoryNotFound(category.to_string()));
        }
        for book in self.books.values_mut() {
            book.categories.retain(|c| c != category);
        }
        Ok(())
    }

    /// All known category names, sorted
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(String::as_str).collect()
    }

    /// Assign a known category to a book; a no-op if already assigned
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::CategoryNotFound` if the category is not
    /// known, or `LibraryError::BookNotFound` if the book does not exist.
    pub fn assign_category(&mut self, id: BookId, category: &str) -> Result<(), LibraryError> {
        if !self.categories.contains(category) {
            return Err(LibraryError::CategoryNotFound(category.to_string()));
        }
        let book = self.books.get_mut(&id).ok_or(LibraryError::BookNotFound(id))?;
        if !book.categories.iter().any(|c| c == category) {
            book.categories.push(category.to_string());
        }
        Ok(())
    }

    /// Strip a category from a book; a no-op if not assigned
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if the book does not exist.
    pub fn remove_category_from_book(
        &mut self,
        id: BookId,
        category: &str,
    ) -> Result<(), LibraryError> {
        let book = self.books.get_mut(&id).ok_or(LibraryError::BookNotFound(id))?;
        book.categories.retain(|c| c != category);
        Ok(())
    }

    /// Identifiers of all books carrying the given category
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::CategoryNotFound` if the category is not
    /// known.
    pub fn books_in_category(&self, category: &str) -> Result<Vec<BookId>, LibraryError> {
        if !self.categories.contains(category) {
            return Err(LibraryError::CategoryNotFound(category.to_string()));
        }
        Ok(self
            .books
            .values()
            .filter(|book| book.categories.iter().any(|c| c == category))
            .map(|book| book.id)
            .collect())
    }
}

impl BookDirectory for BookShelf {
    fn get_book(&self, id: BookId) -> Result<BookSummary, DirectoryError> {
        self.books
            .get(&id)
            .map(|book| BookSummary { id: book.id, available: book.available })
            .ok_or(DirectoryError::BookNotFound(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::missing_docs_in_private_items)]
mod tests {
    use super::*;

    /// Helper to catalogue one well-formed book
    fn shelf_with_book() -> (BookShelf, BookId) {
        let mut shelf = BookShelf::new();
        let id = shelf.add_book("Władca Pierścieni", "J.R.R. Tolkien", "9788328705141", 1954).unwrap();
        (shelf, id)
    }

    #[test]
    fn test_add_and_get_book() {
        let (shelf, id) = shelf_with_book();
        let book = shelf.get(id).unwrap();
        assert_eq!(book.title, "Władca Pierścieni");
        assert!(book.available);
        assert!(book.categories.is_empty());
    }

    #[test]
    fn test_rejects_malformed_isbn() {
        let mut shelf = BookShelf::new();
        let result = shelf.add_book("Test Book", "Test Author", "12345", 2000);
        assert!(matches!(result, Err(LibraryError::Validation(_))));
    }

    #[test]
    fn test_remove_book() {
        let (mut shelf, id) = shelf_with_book();
        assert!(shelf.remove_book(id).is_ok());
        assert!(matches!(shelf.get(id), Err(LibraryError::BookNotFound(_))));
        assert!(matches!(shelf.remove_book(id), Err(LibraryError::BookNotFound(_))));
    }

    #[test]
    fn test_update_book() {
        let (mut shelf, id) = shelf_with_book();
        shelf.update_book(id, Some("Hobbit"), None, Some(1937)).unwrap();
        let book = shelf.get(id).unwrap();
        assert_eq!(book.title, "Hobbit");
        assert_eq!(book.author, "J.R.R. Tolkien");
        assert_eq!(book.year, 1937);
    }

    #[test]
    fn test_set_available() {
        let (mut shelf, id) = shelf_with_book();
        shelf.set_available(id, false).unwrap();
        assert!(!shelf.get(id).unwrap().available);
        assert!(matches!(shelf.set_available(99, true), Err(LibraryError::BookNotFound(99))));
    }

    #[test]
    fn test_find_by_title_and_author() {
        let (mut shelf, _) = shelf_with_book();
        shelf.add_book("Hobbit", "J.R.R. Tolkien", "9788328704442", 1937).unwrap();

        assert_eq!(shelf.find_by_title("hobbit").len(), 1);
        assert_eq!(shelf.find_by_author("tolkien").len(), 2);
        assert!(shelf.find_by_title("dune").is_empty());
    }

    #[test]
    fn test_category_lifecycle() {
        let (mut shelf, id) = shelf_with_book();
        shelf.add_category("Fantasy").unwrap();
        assert!(matches!(
            shelf.add_category("Fantasy"),
            Err(LibraryError::CategoryExists(_))
        ));

        shelf.assign_category(id, "Fantasy").unwrap();
        // Assigning twice must not duplicate the tag.
        shelf.assign_category(id, "Fantasy").unwrap();
        assert_eq!(shelf.get(id).unwrap().categories, vec!["Fantasy".to_string()]);
        assert_eq!(shelf.books_in_category("Fantasy").unwrap(), vec![id]);

        shelf.remove_category_from_book(id, "Fantasy").unwrap();
        assert!(shelf.get(id).unwrap().categories.is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let (mut shelf, id) = shelf_with_book();
        assert!(matches!(
            shelf.assign_category(id, "Fantasy"),
            Err(LibraryError::CategoryNotFound(_))
        ));
        assert!(matches!(
            shelf.books_in_category("Fantasy"),
            Err(LibraryError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_remove_category_strips_books() {
        let (mut shelf, id) = shelf_with_book();
        shelf.add_category("Fantasy").unwrap();
        shelf.assign_category(id, "Fantasy").unwrap();

        shelf.remove_category("Fantasy").unwrap();
        assert!(shelf.get(id).unwrap().categories.is_empty());
        assert!(shelf.categories().is_empty());
        assert!(matches!(shelf.remove_category("Fantasy"), Err(LibraryError::CategoryNotFound(_))));
    }

    #[test]
    fn test_directory_lookup() {
        let (mut shelf, id) = shelf_with_book();
        shelf.set_available(id, false).unwrap();

        let summary = shelf.get_book(id).unwrap();
        assert_eq!(summary.id, id);
        assert!(!summary.available);
        assert_eq!(shelf.get_book(99), Err(DirectoryError::BookNotFound(99)));
    }
}
