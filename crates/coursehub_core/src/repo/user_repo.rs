//! User account persistence.
//!
//! # Invariants
//! - Usernames are unique; duplicates surface as `RepoError::Conflict`.
//! - Password hashes are stored as-is; hashing belongs to the account service.

use super::{expect_changed, RepoError, RepoResult};
use crate::model::user::{validate_email, validate_username, Role, User};
use crate::model::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password_hash,
    role,
    created_at
FROM users";

/// Insert payload for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Repository interface for user accounts.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Lists users ordered by id, optionally restricted to one role.
    fn list_users(&self, role: Option<Role>) -> RepoResult<Vec<User>>;
    fn set_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
    /// Hard-deletes the user; courses, enrollments and posts cascade.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId> {
        validate_username(&user.username)?;
        validate_email(&user.email)?;

        if self.find_by_username(&user.username)?.is_some() {
            return Err(RepoError::Conflict(format!(
                "username `{}` is already taken",
                user.username
            )));
        }

        self.conn.execute(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.username.as_str(),
                user.email.as_str(),
                user.password_hash.as_str(),
                user.role.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(&format!("{USER_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
                Ok(parse_user_row(row))
            })
            .optional()?;
        user.transpose()
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?;
        user.transpose()
    }

    fn list_users(&self, role: Option<Role>) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE (?1 IS NULL OR role = ?1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([role.map(Role::as_str)])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn set_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET password_hash = ?2 WHERE id = ?1;",
            params![id, password_hash],
        )?;
        expect_changed(changed, "user", id)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        expect_changed(changed, "user", id)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role,
        created_at: row.get("created_at")?,
    })
}
