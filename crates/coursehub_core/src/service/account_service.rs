//! Account use-case service.
//!
//! # Responsibility
//! - Create accounts, verify credentials and reset passwords.
//! - Own password hashing (Argon2id, PHC string format).
//!
//! # Invariants
//! - Plain-text passwords are never persisted or logged.
//! - Credential failures do not reveal whether the username exists.

use crate::model::user::{validate_password, Role, User};
use crate::model::{UserId, ValidationError};
use crate::repo::user_repo::{NewUser, UserRepository};
use crate::repo::{RepoError, RepoResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AccountError {
    Validation(ValidationError),
    InvalidCredentials,
    Hashing(String),
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Hashing(message) => write!(f, "password hashing failed: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AccountError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Hash checked when the username is unknown, so a miss costs one full
/// verification like a wrong password does.
static UNKNOWN_USER_HASH: Lazy<String> =
    Lazy::new(|| hash_password("coursehub-unknown-user").unwrap_or_default());

/// Request model for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, hashes and stores a new account.
    pub fn create_account(&self, request: &CreateAccountRequest) -> Result<UserId, AccountError> {
        let user = prepare_account(request)?;
        self.store_account(&user)
    }

    /// Stores an account whose password was already hashed by `prepare_account`.
    pub fn store_account(&self, user: &NewUser) -> Result<UserId, AccountError> {
        let id = self.repo.create_user(user)?;

        info!(
            "event=account_create module=service status=ok user_id={} role={}",
            id,
            user.role.as_str()
        );
        Ok(id)
    }

    /// Resolves a username/password pair to its account.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let user = self.repo.find_by_username(username)?;
        check_credentials(user, password)
    }

    pub fn reset_password(&self, id: UserId, new_password: &str) -> Result<(), AccountError> {
        let password_hash = prepare_password(new_password)?;
        self.store_password_hash(id, &password_hash)
    }

    /// Replaces the stored hash with one produced by `prepare_password`.
    pub fn store_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AccountError> {
        self.repo.set_password_hash(id, password_hash)?;

        info!(
            "event=password_reset module=service status=ok user_id={}",
            id
        );
        Ok(())
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    pub fn list_users(&self, role: Option<Role>) -> RepoResult<Vec<User>> {
        self.repo.list_users(role)
    }

    pub fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.repo.find_by_username(username)
    }

    pub fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.repo.delete_user(id)?;
        info!("event=account_delete module=service status=ok user_id={}", id);
        Ok(())
    }
}

/// Validates and hashes a new account without touching storage.
///
/// CPU-bound; async callers run it off the executor.
pub fn prepare_account(request: &CreateAccountRequest) -> Result<NewUser, AccountError> {
    let password_hash = prepare_password(&request.password)?;
    Ok(NewUser {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_string(),
        password_hash,
        role: request.role,
    })
}

/// Validates and hashes a replacement password.
pub fn prepare_password(password: &str) -> Result<String, AccountError> {
    validate_password(password)?;
    hash_password(password)
}

/// Verifies `password` against a looked-up account.
///
/// An unknown user is checked against a fixed hash so both failure paths do
/// the same work and return the same error.
pub fn check_credentials(user: Option<User>, password: &str) -> Result<User, AccountError> {
    let Some(user) = user else {
        verify_password(password, &UNKNOWN_USER_HASH);
        return Err(AccountError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash) {
        warn!(
            "event=account_auth module=service status=denied user_id={}",
            user.id
        );
        return Err(AccountError::InvalidCredentials);
    }
    Ok(user)
}

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AccountError::Hashing(err.to_string()))
}

/// Returns whether `password` matches a stored PHC hash string.
///
/// Unparseable hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{check_credentials, hash_password, verify_password, UNKNOWN_USER_HASH};
    use super::AccountError;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn unknown_user_is_checked_against_a_real_hash() {
        assert!(UNKNOWN_USER_HASH.starts_with("$argon2"));
        assert!(matches!(
            check_credentials(None, "coursehub-unknown-user"),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
