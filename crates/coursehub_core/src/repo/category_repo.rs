//! Category persistence.
//!
//! Categories are reference data: seeded at bootstrap and read by the API.

use super::RepoResult;
use crate::model::category::Category;
use crate::model::{require_text, CategoryId};
use rusqlite::{Connection, OptionalExtension};

pub trait CategoryRepository {
    /// Lists all categories ordered by name.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Inserts the category when missing and returns its id either way.
    fn ensure_category(&self, name: &str) -> RepoResult<CategoryId>;
}

pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name COLLATE NOCASE ASC;")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    fn ensure_category(&self, name: &str) -> RepoResult<CategoryId> {
        let name = name.trim();
        require_text("name", name, Some(100))?;
        self.conn
            .execute("INSERT OR IGNORE INTO categories (name) VALUES (?1);", [name])?;
        let id = self.conn.query_row(
            "SELECT id FROM categories WHERE name = ?1 COLLATE NOCASE;",
            [name],
            |row| row.get(0),
        )?;
        Ok(id)
    }
}
