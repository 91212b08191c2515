use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    UserId,
    directory::{DirectoryError, UserDirectory, UserSummary},
    error::LibraryError,
    validate,
};

/// Longest accepted display name
const MAX_NAME_LENGTH: usize = 200;

/// A registered library user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    /// Identifier assigned at registration
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email address
    pub email: String,
}

/// Container of registered users, keyed by identifier
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRoster {
    /// Registered users by identifier
    users: BTreeMap<UserId, User>,
    /// Next identifier to assign, starting from 1
    next_id: UserId,
}

impl Default for UserRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRoster {
    /// Create an empty roster
    #[must_use]
    pub fn new() -> Self {
        Self { users: BTreeMap::new(), next_id: 1 }
    }

    /// Register a user and return the assigned identifier
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the name is empty or longer
    /// than 200 characters, or if the email does not look like an address.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn add_user(&mut self, name: &str, email: &str) -> Result<UserId, LibraryError> {
        if name.is_empty() {
            return Err(LibraryError::Validation("name must be a non-empty string".to_string()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(LibraryError::Validation("name is too long".to_string()));
        }
        if !validate::is_valid_email(email) {
            return Err(LibraryError::Validation(format!("invalid email address: {email}")));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.users.insert(id, User { id, name: name.to_string(), email: email.to_string() });

        Ok(id)
    }

    /// Remove a user from the roster
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` if no user is registered
    /// under `id`.
    pub fn remove_user(&mut self, id: UserId) -> Result<(), LibraryError> {
        self.users.remove(&id).map(|_| ()).ok_or(LibraryError::UserNotFound(id))
    }

    /// Look up a user by identifier
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` if no user is registered
    /// under `id`.
    pub fn get(&self, id: UserId) -> Result<&User, LibraryError> {
        self.users.get(&id).ok_or(LibraryError::UserNotFound(id))
    }

    /// Update a user's name and/or email; `None` leaves a field unchanged
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UserNotFound` if the user does not exist,
    /// or `LibraryError::Validation` if a replacement value is invalid.
    pub fn update_user(
        &mut self,
        id: UserId,
        new_name: Option<&str>,
        new_email: Option<&str>,
    ) -> Result<(), LibraryError> {
        if let Some(name) = new_name
            && (name.is_empty() || name.chars().count() > MAX_NAME_LENGTH)
        {
            return Err(LibraryError::Validation("name must be a non-empty string".to_string()));
        }
        if let Some(email) = new_email
            && !validate::is_valid_email(email)
        {
            return Err(LibraryError::Validation(format!("invalid email address: {email}")));
        }

        let user = self.users.get_mut(&id).ok_or(LibraryError::UserNotFound(id))?;
        if let Some(name) = new_name {
            user.name = name.to_string();
        }
        if let Some(email) = new_email {
            user.email = email.to_string();
        }

        Ok(())
    }

    /// Find users whose name contains the given fragment, case-insensitively
    #[must_use]
    pub fn find_by_name(&self, fragment: &str) -> Vec<&User> {
        let needle = fragment.to_lowercase();
        self.users.values().filter(|user| user.name.to_lowercase().contains(&needle)).collect()
    }

    /// All registered users, in identifier order
    #[must_use]
    pub fn users(&self) -> Vec<&User> {
        self.users.values().collect()
    }
}

impl UserDirectory for UserRoster {
    fn get_user(&self, id: UserId) -> Result<UserSummary, DirectoryError> {
        self.users
            .get(&id)
            .map(|user| UserSummary { id: user.id, name: user.name.clone() })
            .ok_or(DirectoryError::UserNotFound(id))
    }
}
