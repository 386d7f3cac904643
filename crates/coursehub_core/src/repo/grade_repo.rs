//! Grade persistence.
//!
//! # Invariants
//! - The graded activity and the enrollment belong to the same course.
//! - One grade per (enrollment, activity); duplicates are `Conflict`.

use super::{expect_changed, owning_course, RepoResult};
use crate::model::grade::{Grade, GradeInput};
use crate::model::{ActivityId, EnrollmentId, GradeId, ValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const GRADE_SELECT_SQL: &str =
    "SELECT id, enrollment_id, activity_id, score, comment, graded_at FROM grades";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeListQuery {
    pub enrollment_id: Option<EnrollmentId>,
    pub activity_id: Option<ActivityId>,
}

pub trait GradeRepository {
    fn create_grade(&self, input: &GradeInput) -> RepoResult<GradeId>;
    fn update_grade(&self, id: GradeId, input: &GradeInput) -> RepoResult<()>;
    fn get_grade(&self, id: GradeId) -> RepoResult<Option<Grade>>;
    fn list_grades(&self, query: &GradeListQuery) -> RepoResult<Vec<Grade>>;
    fn delete_grade(&self, id: GradeId) -> RepoResult<()>;
}

pub struct SqliteGradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGradeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GradeRepository for SqliteGradeRepository<'_> {
    fn create_grade(&self, input: &GradeInput) -> RepoResult<GradeId> {
        input.validate()?;
        ensure_same_course(self.conn, input)?;

        self.conn.execute(
            "INSERT INTO grades (enrollment_id, activity_id, score, comment)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                input.enrollment_id,
                input.activity_id,
                input.score,
                input.comment.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_grade(&self, id: GradeId, input: &GradeInput) -> RepoResult<()> {
        input.validate()?;
        ensure_same_course(self.conn, input)?;

        let changed = self.conn.execute(
            "UPDATE grades
             SET
                enrollment_id = ?2,
                activity_id = ?3,
                score = ?4,
                comment = ?5,
                graded_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                input.enrollment_id,
                input.activity_id,
                input.score,
                input.comment.as_str(),
            ],
        )?;
        expect_changed(changed, "grade", id)
    }

    fn get_grade(&self, id: GradeId) -> RepoResult<Option<Grade>> {
        let grade = self
            .conn
            .query_row(
                &format!("{GRADE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_grade_row,
            )
            .optional()?;
        Ok(grade)
    }

    fn list_grades(&self, query: &GradeListQuery) -> RepoResult<Vec<Grade>> {
        let mut sql = format!("{GRADE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(enrollment_id) = query.enrollment_id {
            sql.push_str(" AND enrollment_id = ?");
            bind_values.push(Value::Integer(enrollment_id));
        }
        if let Some(activity_id) = query.activity_id {
            sql.push_str(" AND activity_id = ?");
            bind_values.push(Value::Integer(activity_id));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let grades = stmt
            .query_map(params_from_iter(bind_values), parse_grade_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grades)
    }

    fn delete_grade(&self, id: GradeId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM grades WHERE id = ?1;", [id])?;
        expect_changed(changed, "grade", id)
    }
}

fn ensure_same_course(conn: &Connection, input: &GradeInput) -> RepoResult<()> {
    let enrollment_course = owning_course(conn, "enrollments", "enrollment", input.enrollment_id)?;
    let activity_course = owning_course(conn, "activities", "activity", input.activity_id)?;
    if enrollment_course != activity_course {
        return Err(ValidationError::CourseMismatch {
            field: "activity",
            expected: enrollment_course,
            found: activity_course,
        }
        .into());
    }
    Ok(())
}

fn parse_grade_row(row: &Row<'_>) -> rusqlite::Result<Grade> {
    Ok(Grade {
        id: row.get("id")?,
        enrollment_id: row.get("enrollment_id")?,
        activity_id: row.get("activity_id")?,
        score: row.get("score")?,
        comment: row.get("comment")?,
        graded_at: row.get("graded_at")?,
    })
}
