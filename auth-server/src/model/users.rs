//! Service credentials storage

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Username {0} is registered more than once")]
    DuplicateUsername(String),
}

/// Newtype for user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Registered user with its credentials
///
/// Passwords are kept and compared in plaintext. This is only acceptable for the demo
/// service, and a real deployment would need hashed credentials instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Display name
    pub name: String,
}

impl User {
    /// Helper to create an user
    pub fn new(
        id: i64,
        username: impl Into<String>,
        password: impl Into<String>,
        role: Role,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId(id),
            username: username.into(),
            password: password.into(),
            role,
            name: name.into(),
        }
    }

    /// Compares the password with the stored one
    pub fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }

    /// Data of the user which is safe to be exposed
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }

    /// Users available when the configuration doesn't define any
    pub fn demo_users() -> Vec<Self> {
        vec![
            Self::new(1, "admin", "admin123", Role::Admin, "Administrator"),
            Self::new(2, "user1", "pass123", Role::User, "John Doe"),
            Self::new(3, "user2", "pass123", Role::User, "Jane Smith"),
        ]
    }
}

/// User fields returned to the client after login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub role: Role,
}

/// Read-only registry of known users, indexed by username
#[derive(Debug, Clone)]
pub struct Credentials {
    users: HashMap<String, User>,
}

impl Credentials {
    /// Builds the registry, rejecting colliding usernames
    pub fn new(users: impl IntoIterator<Item = User>) -> Result<Self, Error> {
        let mut indexed = HashMap::new();
        for user in users {
            if indexed.contains_key(&user.username) {
                return Err(Error::DuplicateUsername(user.username));
            }
            indexed.insert(user.username.clone(), user);
        }

        Ok(Self { users: indexed })
    }

    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Registered usernames, sorted
    pub fn usernames(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.users.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            users: User::demo_users()
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }
}
