//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity family.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate their input before any SQL mutation.
//! - Cross-table references are checked inside the same transaction as the
//!   write, and reported as `MissingReference` rather than raw FK failures.
//! - Uniqueness violations surface as `Conflict`.

use crate::db::DbError;
use crate::model::{CourseId, ValidationError};
use rusqlite::{ffi, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod activity_repo;
pub mod category_repo;
pub mod course_repo;
pub mod enrollment_repo;
pub mod feedback_repo;
pub mod forum_repo;
pub mod grade_repo;
pub mod material_repo;
pub mod suggestion_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every entity family.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: i64 },
    MissingReference { entity: &'static str, id: i64 },
    Conflict(String),
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn missing(entity: &'static str, id: i64) -> Self {
        Self::MissingReference { entity, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::MissingReference { entity, id } => {
                write!(f, "referenced {entity} does not exist: {id}")
            }
            Self::Conflict(message) => write!(f, "{message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            let unique = failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
            if unique {
                return Self::Conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "uniqueness constraint violated".to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns an error unless a row with `id` exists in `table`.
///
/// `table` is always a compile-time constant, never user input.
pub(crate) fn ensure_exists(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::missing(entity, id))
    }
}

/// Looks up the owning course of a course-scoped row.
pub(crate) fn owning_course(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> RepoResult<CourseId> {
    conn.query_row(
        &format!("SELECT course_id FROM {table} WHERE id = ?1;"),
        [id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| RepoError::missing(entity, id))
}

/// Maps a zero-row mutation to `NotFound`.
pub(crate) fn expect_changed(changed: usize, entity: &'static str, id: i64) -> RepoResult<()> {
    if changed == 0 {
        Err(RepoError::not_found(entity, id))
    } else {
        Ok(())
    }
}
