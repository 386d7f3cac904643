//! Course persistence, including the course/category link table.
//!
//! # Invariants
//! - Course rows and their `course_categories` links are written in one
//!   transaction; updates replace the whole category set.
//! - `professor_id` must reference a user with role `professor`.

use super::{expect_changed, ensure_exists, RepoError, RepoResult};
use crate::model::course::{Course, CourseInput};
use crate::model::user::Role;
use crate::model::{CategoryId, CourseId, UserId, ValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COURSE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    professor_id,
    start_date,
    end_date,
    created_at,
    updated_at
FROM courses";

/// Filter options for listing courses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseListQuery {
    pub professor_id: Option<UserId>,
    pub category_id: Option<CategoryId>,
}

pub trait CourseRepository {
    fn create_course(&self, input: &CourseInput) -> RepoResult<CourseId>;
    /// Replaces every field and the category set of an existing course.
    fn update_course(&self, id: CourseId, input: &CourseInput) -> RepoResult<()>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    /// Lists courses ordered by id.
    fn list_courses(&self, query: &CourseListQuery) -> RepoResult<Vec<Course>>;
    fn delete_course(&self, id: CourseId) -> RepoResult<()>;
}

pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, input: &CourseInput) -> RepoResult<CourseId> {
        input.validate()?;
        let categories = input.normalized_categories();

        let tx = self.conn.unchecked_transaction()?;
        ensure_professor(&tx, input.professor_id)?;
        ensure_categories(&tx, &categories)?;

        tx.execute(
            "INSERT INTO courses (name, description, professor_id, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                input.name.trim(),
                input.description.as_str(),
                input.professor_id,
                input.start_date,
                input.end_date,
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_categories(&tx, id, &categories)?;
        tx.commit()?;

        Ok(id)
    }

    fn update_course(&self, id: CourseId, input: &CourseInput) -> RepoResult<()> {
        input.validate()?;
        let categories = input.normalized_categories();

        let tx = self.conn.unchecked_transaction()?;
        ensure_professor(&tx, input.professor_id)?;
        ensure_categories(&tx, &categories)?;

        let changed = tx.execute(
            "UPDATE courses
             SET
                name = ?2,
                description = ?3,
                professor_id = ?4,
                start_date = ?5,
                end_date = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                input.name.trim(),
                input.description.as_str(),
                input.professor_id,
                input.start_date,
                input.end_date,
            ],
        )?;
        expect_changed(changed, "course", id)?;
        replace_categories(&tx, id, &categories)?;
        tx.commit()?;

        Ok(())
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let course = self
            .conn
            .query_row(
                &format!("{COURSE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_course_row(self.conn, row)),
            )
            .optional()?;
        course.transpose()
    }

    fn list_courses(&self, query: &CourseListQuery) -> RepoResult<Vec<Course>> {
        let mut sql = format!("{COURSE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(professor_id) = query.professor_id {
            sql.push_str(" AND professor_id = ?");
            bind_values.push(Value::Integer(professor_id));
        }

        if let Some(category_id) = query.category_id {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM course_categories cc
                    WHERE cc.course_id = courses.id
                      AND cc.category_id = ?
                )",
            );
            bind_values.push(Value::Integer(category_id));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(self.conn, row)?);
        }
        Ok(courses)
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1;", [id])?;
        expect_changed(changed, "course", id)
    }
}

/// Loads the sorted category ids linked to one course.
pub(crate) fn load_course_categories(
    conn: &Connection,
    course_id: CourseId,
) -> RepoResult<Vec<CategoryId>> {
    let mut stmt = conn.prepare(
        "SELECT category_id
         FROM course_categories
         WHERE course_id = ?1
         ORDER BY category_id ASC;",
    )?;
    let ids = stmt
        .query_map([course_id], |row| row.get(0))?
        .collect::<Result<Vec<CategoryId>, _>>()?;
    Ok(ids)
}

fn parse_course_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Course> {
    let id: CourseId = row.get("id")?;
    Ok(Course {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        professor_id: row.get("professor_id")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        categories: load_course_categories(conn, id)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_professor(conn: &Connection, user_id: UserId) -> RepoResult<()> {
    let role: Option<String> = conn
        .query_row("SELECT role FROM users WHERE id = ?1;", [user_id], |row| {
            row.get(0)
        })
        .optional()?;

    match role.as_deref().map(Role::parse) {
        None => Err(RepoError::missing("user", user_id)),
        Some(Some(Role::Professor)) => Ok(()),
        Some(_) => Err(ValidationError::NotAProfessor(user_id).into()),
    }
}

fn ensure_categories(conn: &Connection, categories: &[CategoryId]) -> RepoResult<()> {
    for &category_id in categories {
        ensure_exists(conn, "categories", "category", category_id)?;
    }
    Ok(())
}

fn replace_categories(
    conn: &Connection,
    course_id: CourseId,
    categories: &[CategoryId],
) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM course_categories WHERE course_id = ?1;",
        [course_id],
    )?;
    for &category_id in categories {
        conn.execute(
            "INSERT INTO course_categories (course_id, category_id) VALUES (?1, ?2);",
            params![course_id, category_id],
        )?;
    }
    Ok(())
}
