//! Read-only catalog queries backing the course-suggestion engine.
//!
//! # Responsibility
//! - Answer the three lookups the engine needs: enrollments, categories of
//!   a course set, and courses tagged with a category set.
//! - Leave exclusion, deduplication and ordering to the service layer.

use super::RepoResult;
use crate::model::category::Category;
use crate::model::{CategoryId, CourseId, UserId};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::BTreeSet;

/// Course row as seen by candidate search, with its full category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCourse {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    pub categories: Vec<Category>,
}

/// Data-access contract for the suggestion engine.
pub trait SuggestionSource {
    fn user_exists(&self, user_id: UserId) -> RepoResult<bool>;
    /// Ids of every course the user is enrolled in.
    fn enrolled_course_ids(&self, user_id: UserId) -> RepoResult<BTreeSet<CourseId>>;
    /// Union of the category ids attached to `course_ids`.
    fn categories_of(
        &self,
        course_ids: &BTreeSet<CourseId>,
    ) -> RepoResult<BTreeSet<CategoryId>>;
    /// Courses tagged with at least one of `category_ids`. May contain
    /// duplicates and enrolled courses; callers filter.
    fn courses_in_categories(
        &self,
        category_ids: &BTreeSet<CategoryId>,
    ) -> RepoResult<Vec<CandidateCourse>>;
}

pub struct SqliteSuggestionSource<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSuggestionSource<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SuggestionSource for SqliteSuggestionSource<'_> {
    fn user_exists(&self, user_id: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn enrolled_course_ids(&self, user_id: UserId) -> RepoResult<BTreeSet<CourseId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT course_id FROM enrollments WHERE user_id = ?1;")?;
        let ids = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<BTreeSet<CourseId>, _>>()?;
        Ok(ids)
    }

    fn categories_of(
        &self,
        course_ids: &BTreeSet<CourseId>,
    ) -> RepoResult<BTreeSet<CategoryId>> {
        if course_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let sql = format!(
            "SELECT DISTINCT category_id
             FROM course_categories
             WHERE course_id IN ({});",
            placeholders(course_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(integer_values(course_ids)), |row| row.get(0))?
            .collect::<Result<BTreeSet<CategoryId>, _>>()?;
        Ok(ids)
    }

    fn courses_in_categories(
        &self,
        category_ids: &BTreeSet<CategoryId>,
    ) -> RepoResult<Vec<CandidateCourse>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        // One row per (course, category), ordered so each course's rows are
        // adjacent and folded into a single candidate below.
        let sql = format!(
            "SELECT c.id, c.name, c.description, cat.id, cat.name
             FROM courses c
             INNER JOIN course_categories cc ON cc.course_id = c.id
             INNER JOIN categories cat ON cat.id = cc.category_id
             WHERE c.id IN (
                 SELECT course_id FROM course_categories WHERE category_id IN ({})
             )
             ORDER BY c.id ASC, cat.name COLLATE NOCASE ASC;",
            placeholders(category_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(integer_values(category_ids)))?;
        let mut courses: Vec<CandidateCourse> = Vec::new();
        while let Some(row) = rows.next()? {
            let id: CourseId = row.get(0)?;
            let category = Category {
                id: row.get(3)?,
                name: row.get(4)?,
            };
            if let Some(course) = courses.last_mut().filter(|course| course.id == id) {
                course.categories.push(category);
                continue;
            }
            courses.push(CandidateCourse {
                id,
                name: row.get(1)?,
                description: row.get(2)?,
                categories: vec![category],
            });
        }
        Ok(courses)
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn integer_values(ids: &BTreeSet<i64>) -> Vec<Value> {
    ids.iter().copied().map(Value::Integer).collect()
}
