//! JSON save/load helpers shared by the record containers and the
//! reservation registry.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::LibraryError;

/// Save a serializable value to a pretty-printed JSON file
///
/// # Errors
///
/// Returns a `LibraryError::Persistence` if:
/// - The value cannot be serialized to JSON
/// - The file cannot be created
/// - The data cannot be written to the file
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), LibraryError> {
    let serialized =
        serde_json::to_string_pretty(value).map_err(|e| LibraryError::Persistence(e.to_string()))?;

    let mut file = File::create(path)
        .map_err(|e| LibraryError::Persistence(format!("Failed to create file: {e}")))?;

    file.write_all(serialized.as_bytes())
        .map_err(|e| LibraryError::Persistence(format!("Failed to write to file: {e}")))?;

    Ok(())
}

/// Load a value from a JSON file
///
/// # Errors
///
/// Returns a `LibraryError::Load` if:
/// - The file does not exist
/// - The file cannot be opened
/// - The file cannot be read
/// - The JSON parsing fails
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LibraryError> {
    if !path.exists() {
        return Err(LibraryError::Load(format!("File does not exist: {}", path.display())));
    }

    let mut file =
        File::open(path).map_err(|e| LibraryError::Load(format!("Failed to open file: {e}")))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| LibraryError::Load(format!("Failed to read file: {e}")))?;

    serde_json::from_str(&contents)
        .map_err(|e| LibraryError::Load(format!("Failed to parse JSON: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::missing_docs_in_private_items)]
mod tests {
    use super::*;
    use crate::book::BookShelf;

    /// Unique temp file path for one test
    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("library-system-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_shelf_round_trip() {
        let mut shelf = BookShelf::new();
        let id = shelf.add_book("Hobbit", "J.R.R. Tolkien", "9788328704442", 1937).unwrap();
        shelf.add_category("Fantasy").unwrap();
        shelf.assign_category(id, "Fantasy").unwrap();
        shelf.set_available(id, false).unwrap();

        let path = temp_path("shelf");
        save_json(&shelf, &path).unwrap();
        let loaded: BookShelf = load_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let book = loaded.get(id).unwrap();
        assert_eq!(book.title, "Hobbit");
        assert!(!book.available);
        assert_eq!(book.categories, vec!["Fantasy".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<BookShelf, _> = load_json(Path::new("/nonexistent/shelf.json"));
        assert!(matches!(result, Err(LibraryError::Load(_))));
    }
}
