//! Input validators shared by the record containers.

use std::sync::LazyLock;

use regex::Regex;

/// Matches addresses of the shape `local@domain.tld`
#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern is valid"));

/// Check whether an email address has a plausible shape
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Check whether an ISBN consists of exactly 10 or 13 digits
#[must_use]
pub fn is_valid_isbn(isbn: &str) -> bool {
    matches!(isbn.len(), 10 | 13) && isbn.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::missing_docs_in_private_items)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("jan@example.com"));
        assert!(is_valid_email("anna.nowak@biblioteka.edu.pl"));
        assert!(is_valid_email("reader-01@books.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_valid_isbns() {
        assert!(is_valid_isbn("1234567890"));
        assert!(is_valid_isbn("9788328705141"));
    }

    #[test]
    fn test_invalid_isbns() {
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("12345678901"));
        assert!(!is_valid_isbn("12345678X0"));
        assert!(!is_valid_isbn(""));
    }
}
