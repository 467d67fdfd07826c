//! User accounts and password hashing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Username of the built-in administrator, which cannot be deleted.
pub const ADMIN_USERNAME: &str = "admin";

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Access level of a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Manager,
    User,
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u32,
    pub username: String,
    /// `salt$sha256(salt || password)`, both hex-encoded
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
    pub last_login: NaiveDateTime,
    pub is_active: bool,
}

impl User {
    /// Create a new active user; `password` is hashed with a fresh salt.
    pub fn new(username: &str, password: &str, role: UserRole, now: NaiveDateTime) -> Self {
        Self {
            id: 0,
            username: username.trim().to_string(),
            password_hash: hash_password(password),
            full_name: String::new(),
            email: String::new(),
            role,
            created_at: now,
            last_login: now,
            is_active: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Case-insensitive, whitespace-insensitive username comparison.
    pub fn has_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.trim().to_lowercase()
    }

    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    pub fn set_password(&mut self, password: &str) {
        self.password_hash = hash_password(password);
    }
}

/// Password policy: at least six characters and not blank.
pub fn validate_password(password: &str) -> bool {
    !password.trim().is_empty() && password.chars().count() >= MIN_PASSWORD_LEN
}

/// Hash a password with a random salt.
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    hash_with_salt(password, &salt)
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{}${}", salt, hex::encode(hasher.finalize()))
}

/// Check a password against a stored `salt$hash` string.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => hash_with_salt(password, salt) == stored,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_hash_roundtrip() {
        let stored = hash_password("secret123");
        assert!(verify_password("secret123", &stored));
        assert!(!verify_password("secret124", &stored));
    }

    #[test]
    fn test_hash_is_salted() {
        assert_ne!(hash_password("secret123"), hash_password("secret123"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-salted-hash"));
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("abcdef"));
        assert!(!validate_password("abcde"));
        assert!(!validate_password("      "));
        assert!(!validate_password(""));
    }

    #[test]
    fn test_username_matching() {
        let user = User::new("  Alice ", "password", UserRole::User, now());
        assert_eq!(user.username, "Alice");
        assert!(user.has_username("alice"));
        assert!(user.has_username(" ALICE "));
        assert!(!user.has_username("bob"));
        assert!(user.verify_password("password"));
    }
}
