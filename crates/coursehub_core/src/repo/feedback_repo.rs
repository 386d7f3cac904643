//! Course feedback persistence.
//!
//! # Invariants
//! - The enrollment referenced by a feedback row belongs to its course.
//! - One feedback per enrollment; duplicates are `Conflict`.

use super::{expect_changed, owning_course, RepoError, RepoResult};
use crate::model::feedback::{validate_rating, CourseFeedback};
use crate::model::{CourseId, EnrollmentId, FeedbackId, ValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FEEDBACK_SELECT_SQL: &str =
    "SELECT id, course_id, enrollment_id, rating, comment, created_at FROM course_feedback";

pub trait FeedbackRepository {
    fn create_feedback(
        &self,
        course_id: CourseId,
        enrollment_id: EnrollmentId,
        rating: i64,
        comment: &str,
    ) -> RepoResult<FeedbackId>;
    fn update_feedback(&self, id: FeedbackId, rating: i64, comment: &str) -> RepoResult<()>;
    fn get_feedback(&self, id: FeedbackId) -> RepoResult<Option<CourseFeedback>>;
    fn list_feedback(&self, course_id: Option<CourseId>) -> RepoResult<Vec<CourseFeedback>>;
    fn delete_feedback(&self, id: FeedbackId) -> RepoResult<()>;
}

pub struct SqliteFeedbackRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFeedbackRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FeedbackRepository for SqliteFeedbackRepository<'_> {
    fn create_feedback(
        &self,
        course_id: CourseId,
        enrollment_id: EnrollmentId,
        rating: i64,
        comment: &str,
    ) -> RepoResult<FeedbackId> {
        validate_rating(rating)?;
        let enrolled_in = owning_course(self.conn, "enrollments", "enrollment", enrollment_id)?;
        if enrolled_in != course_id {
            return Err(ValidationError::CourseMismatch {
                field: "enrollment",
                expected: course_id,
                found: enrolled_in,
            }
            .into());
        }

        let already: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM course_feedback WHERE enrollment_id = ?1);",
            [enrollment_id],
            |row| row.get(0),
        )?;
        if already == 1 {
            return Err(RepoError::Conflict(format!(
                "feedback already submitted for enrollment {enrollment_id}"
            )));
        }

        self.conn.execute(
            "INSERT INTO course_feedback (course_id, enrollment_id, rating, comment)
             VALUES (?1, ?2, ?3, ?4);",
            params![course_id, enrollment_id, rating, comment],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_feedback(&self, id: FeedbackId, rating: i64, comment: &str) -> RepoResult<()> {
        validate_rating(rating)?;
        let changed = self.conn.execute(
            "UPDATE course_feedback SET rating = ?2, comment = ?3 WHERE id = ?1;",
            params![id, rating, comment],
        )?;
        expect_changed(changed, "feedback", id)
    }

    fn get_feedback(&self, id: FeedbackId) -> RepoResult<Option<CourseFeedback>> {
        let feedback = self
            .conn
            .query_row(
                &format!("{FEEDBACK_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_feedback_row,
            )
            .optional()?;
        Ok(feedback)
    }

    fn list_feedback(&self, course_id: Option<CourseId>) -> RepoResult<Vec<CourseFeedback>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FEEDBACK_SELECT_SQL}
             WHERE (?1 IS NULL OR course_id = ?1)
             ORDER BY id ASC;"
        ))?;
        let feedback = stmt
            .query_map([course_id], parse_feedback_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(feedback)
    }

    fn delete_feedback(&self, id: FeedbackId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM course_feedback WHERE id = ?1;", [id])?;
        expect_changed(changed, "feedback", id)
    }
}

fn parse_feedback_row(row: &Row<'_>) -> rusqlite::Result<CourseFeedback> {
    Ok(CourseFeedback {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        enrollment_id: row.get("enrollment_id")?,
        rating: row.get("rating")?,
        comment: row.get("comment")?,
        created_at: row.get("created_at")?,
    })
}
