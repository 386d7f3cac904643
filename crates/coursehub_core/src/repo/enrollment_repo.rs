//! Enrollment persistence.
//!
//! # Invariants
//! - One enrollment per (user, course); duplicates are `Conflict`.

use super::{ensure_exists, expect_changed, RepoError, RepoResult};
use crate::model::enrollment::Enrollment;
use crate::model::{CourseId, EnrollmentId, UserId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ENROLLMENT_SELECT_SQL: &str = "SELECT id, user_id, course_id, created_at FROM enrollments";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentListQuery {
    pub user_id: Option<UserId>,
    pub course_id: Option<CourseId>,
}

pub trait EnrollmentRepository {
    fn enroll(&self, user_id: UserId, course_id: CourseId) -> RepoResult<EnrollmentId>;
    fn get_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>>;
    fn find_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> RepoResult<Option<Enrollment>>;
    /// Lists enrollments ordered by id.
    fn list_enrollments(&self, query: &EnrollmentListQuery) -> RepoResult<Vec<Enrollment>>;
    fn delete_enrollment(&self, id: EnrollmentId) -> RepoResult<()>;
}

pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn enroll(&self, user_id: UserId, course_id: CourseId) -> RepoResult<EnrollmentId> {
        let tx = self.conn.unchecked_transaction()?;
        ensure_exists(&tx, "users", "user", user_id)?;
        ensure_exists(&tx, "courses", "course", course_id)?;

        let already: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM enrollments WHERE user_id = ?1 AND course_id = ?2
            );",
            params![user_id, course_id],
            |row| row.get(0),
        )?;
        if already == 1 {
            return Err(RepoError::Conflict(format!(
                "user {user_id} is already enrolled in course {course_id}"
            )));
        }

        tx.execute(
            "INSERT INTO enrollments (user_id, course_id) VALUES (?1, ?2);",
            params![user_id, course_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn get_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
        let enrollment = self
            .conn
            .query_row(
                &format!("{ENROLLMENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_enrollment_row,
            )
            .optional()?;
        Ok(enrollment)
    }

    fn find_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> RepoResult<Option<Enrollment>> {
        let enrollment = self
            .conn
            .query_row(
                &format!("{ENROLLMENT_SELECT_SQL} WHERE user_id = ?1 AND course_id = ?2;"),
                params![user_id, course_id],
                parse_enrollment_row,
            )
            .optional()?;
        Ok(enrollment)
    }

    fn list_enrollments(&self, query: &EnrollmentListQuery) -> RepoResult<Vec<Enrollment>> {
        let mut sql = format!("{ENROLLMENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Integer(user_id));
        }
        if let Some(course_id) = query.course_id {
            sql.push_str(" AND course_id = ?");
            bind_values.push(Value::Integer(course_id));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let enrollments = stmt
            .query_map(params_from_iter(bind_values), parse_enrollment_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(enrollments)
    }

    fn delete_enrollment(&self, id: EnrollmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM enrollments WHERE id = ?1;", [id])?;
        expect_changed(changed, "enrollment", id)
    }
}

fn parse_enrollment_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        course_id: row.get("course_id")?,
        created_at: row.get("created_at")?,
    })
}
