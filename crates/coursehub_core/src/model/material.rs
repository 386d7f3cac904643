//! Course materials.

use super::{require_text, CourseId, MaterialId, ValidationError};
use serde::{Deserialize, Serialize};

const MATERIAL_TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Material {
    pub id: MaterialId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaterialInput {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl MaterialInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, Some(MATERIAL_TITLE_MAX_CHARS))
    }
}
