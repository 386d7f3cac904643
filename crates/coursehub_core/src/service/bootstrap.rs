//! Idempotent catalog bootstrap run after migrations.
//!
//! # Responsibility
//! - Seed the default course categories.
//! - Create the configured superuser account when it does not exist yet.

use crate::model::category::DEFAULT_CATEGORIES;
use crate::model::user::Role;
use crate::model::UserId;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::account_service::{AccountError, AccountService, CreateAccountRequest};
use log::info;
use rusqlite::Connection;

/// Credentials for the bootstrap administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperuserSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Outcome of one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootstrapReport {
    pub categories: usize,
    /// Set only when the superuser was created by this run.
    pub created_superuser: Option<UserId>,
}

/// Seeds categories and the optional superuser inside one transaction.
pub fn bootstrap(
    conn: &Connection,
    superuser: Option<&SuperuserSeed>,
) -> Result<BootstrapReport, AccountError> {
    let tx = conn.unchecked_transaction().map_err(RepoError::from)?;
    let categories = seed_default_categories(&SqliteCategoryRepository::new(&tx))?;
    let created_superuser = match superuser {
        Some(seed) => {
            let accounts = AccountService::new(SqliteUserRepository::new(&tx));
            ensure_superuser(&accounts, seed)?
        }
        None => None,
    };
    tx.commit().map_err(RepoError::from)?;

    info!(
        "event=bootstrap module=service status=ok categories={} superuser_created={}",
        categories,
        created_superuser.is_some()
    );
    Ok(BootstrapReport {
        categories,
        created_superuser,
    })
}

/// Ensures every default category exists. Returns the number of defaults.
pub fn seed_default_categories<R: CategoryRepository>(repo: &R) -> RepoResult<usize> {
    for name in DEFAULT_CATEGORIES {
        repo.ensure_category(name)?;
    }
    Ok(DEFAULT_CATEGORIES.len())
}

/// Creates the superuser unless an account with that username exists.
pub fn ensure_superuser<R: UserRepository>(
    accounts: &AccountService<R>,
    seed: &SuperuserSeed,
) -> Result<Option<UserId>, AccountError> {
    if accounts.find_by_username(&seed.username)?.is_some() {
        return Ok(None);
    }

    let id = accounts.create_account(&CreateAccountRequest {
        username: seed.username.clone(),
        email: seed.email.clone(),
        password: seed.password.clone(),
        role: Role::Admin,
    })?;
    Ok(Some(id))
}
