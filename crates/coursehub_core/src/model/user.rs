//! User accounts and roles.
//!
//! # Invariants
//! - `username` is unique and matches `[\w.@+-]+`, at most 150 chars.
//! - `password_hash` is a PHC-formatted Argon2 string and never serialized.

use super::{require_text, UserId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const USERNAME_MAX_CHARS: usize = 150;
/// Minimum accepted password length for new and reset passwords.
pub const PASSWORD_MIN_CHARS: usize = 8;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Access role carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Staff superuser; passes every policy.
    Admin,
    /// Owns and edits courses and their content.
    Professor,
    /// Enrolls in courses; mostly read-only.
    Student,
}

impl Role {
    /// Stable string id stored in `users.role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Professor => "professor",
            Self::Student => "student",
        }
    }

    /// Parses a stored role value. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "professor" => Some(Self::Professor),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    pub fn is_professor(&self) -> bool {
        self.role == Role::Professor
    }
}

/// Public projection of an account, safe to return over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub professor: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            professor: user.is_professor(),
        }
    }
}

/// Validates a username against the account naming rules.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    require_text("username", username, Some(USERNAME_MAX_CHARS))?;
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Validates an optional email address. Empty means "not provided".
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min_chars: PASSWORD_MIN_CHARS,
        });
    }
    Ok(())
}
