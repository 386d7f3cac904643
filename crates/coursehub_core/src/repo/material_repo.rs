//! Course material persistence.

use super::{ensure_exists, expect_changed, RepoResult};
use crate::model::material::{Material, MaterialInput};
use crate::model::{CourseId, MaterialId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MATERIAL_SELECT_SQL: &str =
    "SELECT id, course_id, title, description, url, created_at FROM materials";

pub trait MaterialRepository {
    fn create_material(&self, input: &MaterialInput) -> RepoResult<MaterialId>;
    fn update_material(&self, id: MaterialId, input: &MaterialInput) -> RepoResult<()>;
    fn get_material(&self, id: MaterialId) -> RepoResult<Option<Material>>;
    fn list_materials(&self, course_id: Option<CourseId>) -> RepoResult<Vec<Material>>;
    fn delete_material(&self, id: MaterialId) -> RepoResult<()>;
}

pub struct SqliteMaterialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMaterialRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MaterialRepository for SqliteMaterialRepository<'_> {
    fn create_material(&self, input: &MaterialInput) -> RepoResult<MaterialId> {
        input.validate()?;
        ensure_exists(self.conn, "courses", "course", input.course_id)?;

        self.conn.execute(
            "INSERT INTO materials (course_id, title, description, url)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                input.course_id,
                input.title.trim(),
                input.description.as_str(),
                input.url.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_material(&self, id: MaterialId, input: &MaterialInput) -> RepoResult<()> {
        input.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        ensure_exists(&tx, "courses", "course", input.course_id)?;

        let changed = tx.execute(
            "UPDATE materials
             SET course_id = ?2, title = ?3, description = ?4, url = ?5
             WHERE id = ?1;",
            params![
                id,
                input.course_id,
                input.title.trim(),
                input.description.as_str(),
                input.url.as_deref(),
            ],
        )?;
        expect_changed(changed, "material", id)?;

        // Moving a material to another course drops links from the old course's activities.
        tx.execute(
            "DELETE FROM activity_materials
             WHERE material_id = ?1
               AND activity_id NOT IN (SELECT id FROM activities WHERE course_id = ?2);",
            params![id, input.course_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_material(&self, id: MaterialId) -> RepoResult<Option<Material>> {
        let material = self
            .conn
            .query_row(
                &format!("{MATERIAL_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_material_row,
            )
            .optional()?;
        Ok(material)
    }

    fn list_materials(&self, course_id: Option<CourseId>) -> RepoResult<Vec<Material>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MATERIAL_SELECT_SQL}
             WHERE (?1 IS NULL OR course_id = ?1)
             ORDER BY id ASC;"
        ))?;
        let materials = stmt
            .query_map([course_id], parse_material_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    fn delete_material(&self, id: MaterialId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM materials WHERE id = ?1;", [id])?;
        expect_changed(changed, "material", id)
    }
}

fn parse_material_row(row: &Row<'_>) -> rusqlite::Result<Material> {
    Ok(Material {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        url: row.get("url")?,
        created_at: row.get("created_at")?,
    })
}
