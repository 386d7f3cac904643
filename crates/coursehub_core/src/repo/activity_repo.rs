//! Activity persistence and activity/material links.
//!
//! # Invariants
//! - Linked materials belong to the activity's course.
//! - An activity that already has grades cannot move to another course.

use super::{ensure_exists, expect_changed, owning_course, RepoError, RepoResult};
use crate::model::activity::{Activity, ActivityInput};
use crate::model::{ActivityId, CourseId, MaterialId, ValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACTIVITY_SELECT_SQL: &str =
    "SELECT id, course_id, title, description, due_date, created_at FROM activities";

pub trait ActivityRepository {
    fn create_activity(&self, input: &ActivityInput) -> RepoResult<ActivityId>;
    /// Replaces every field and the material links of an activity.
    fn update_activity(&self, id: ActivityId, input: &ActivityInput) -> RepoResult<()>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    fn list_activities(&self, course_id: Option<CourseId>) -> RepoResult<Vec<Activity>>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
}

pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, input: &ActivityInput) -> RepoResult<ActivityId> {
        input.validate()?;
        let materials = input.normalized_materials();

        let tx = self.conn.unchecked_transaction()?;
        ensure_exists(&tx, "courses", "course", input.course_id)?;
        ensure_materials_in_course(&tx, input.course_id, &materials)?;

        tx.execute(
            "INSERT INTO activities (course_id, title, description, due_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                input.course_id,
                input.title.trim(),
                input.description.as_str(),
                input.due_date,
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_materials(&tx, id, &materials)?;
        tx.commit()?;

        Ok(id)
    }

    fn update_activity(&self, id: ActivityId, input: &ActivityInput) -> RepoResult<()> {
        input.validate()?;
        let materials = input.normalized_materials();

        let tx = self.conn.unchecked_transaction()?;
        let current_course = match owning_course(&tx, "activities", "activity", id) {
            Err(RepoError::MissingReference { .. }) => {
                return Err(RepoError::not_found("activity", id))
            }
            other => other?,
        };
        ensure_exists(&tx, "courses", "course", input.course_id)?;
        if current_course != input.course_id && has_grades(&tx, id)? {
            return Err(RepoError::Conflict(format!(
                "activity {id} has grades and cannot move to course {}",
                input.course_id
            )));
        }
        ensure_materials_in_course(&tx, input.course_id, &materials)?;

        let changed = tx.execute(
            "UPDATE activities
             SET course_id = ?2, title = ?3, description = ?4, due_date = ?5
             WHERE id = ?1;",
            params![
                id,
                input.course_id,
                input.title.trim(),
                input.description.as_str(),
                input.due_date,
            ],
        )?;
        expect_changed(changed, "activity", id)?;
        replace_materials(&tx, id, &materials)?;
        tx.commit()?;

        Ok(())
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let activity = self
            .conn
            .query_row(
                &format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_activity_row(self.conn, row)),
            )
            .optional()?;
        activity.transpose()
    }

    fn list_activities(&self, course_id: Option<CourseId>) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             WHERE (?1 IS NULL OR course_id = ?1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([course_id])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(self.conn, row)?);
        }
        Ok(activities)
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id])?;
        expect_changed(changed, "activity", id)
    }
}

fn parse_activity_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Activity> {
    let id: ActivityId = row.get("id")?;
    Ok(Activity {
        id,
        course_id: row.get("course_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        materials: load_activity_materials(conn, id)?,
        created_at: row.get("created_at")?,
    })
}

fn load_activity_materials(
    conn: &Connection,
    activity_id: ActivityId,
) -> RepoResult<Vec<MaterialId>> {
    let mut stmt = conn.prepare(
        "SELECT material_id
         FROM activity_materials
         WHERE activity_id = ?1
         ORDER BY material_id ASC;",
    )?;
    let ids = stmt
        .query_map([activity_id], |row| row.get(0))?
        .collect::<Result<Vec<MaterialId>, _>>()?;
    Ok(ids)
}

fn ensure_materials_in_course(
    conn: &Connection,
    course_id: CourseId,
    materials: &[MaterialId],
) -> RepoResult<()> {
    for &material_id in materials {
        let found = owning_course(conn, "materials", "material", material_id)?;
        if found != course_id {
            return Err(ValidationError::CourseMismatch {
                field: "material",
                expected: course_id,
                found,
            }
            .into());
        }
    }
    Ok(())
}

fn has_grades(conn: &Connection, activity_id: ActivityId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM grades WHERE activity_id = ?1);",
        [activity_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn replace_materials(
    conn: &Connection,
    activity_id: ActivityId,
    materials: &[MaterialId],
) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM activity_materials WHERE activity_id = ?1;",
        [activity_id],
    )?;
    for &material_id in materials {
        conn.execute(
            "INSERT INTO activity_materials (activity_id, material_id) VALUES (?1, ?2);",
            params![activity_id, material_id],
        )?;
    }
    Ok(())
}
