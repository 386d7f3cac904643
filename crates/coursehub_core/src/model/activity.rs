//! Course activities (assignments, quizzes, ...).
//!
//! # Invariants
//! - Linked materials belong to the activity's course; the repository
//!   enforces this against storage.

use super::{require_text, ActivityId, CourseId, MaterialId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const ACTIVITY_TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: ActivityId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// Linked material ids sorted ascending.
    pub materials: Vec<MaterialId>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivityInput {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub materials: Vec<MaterialId>,
}

impl ActivityInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, Some(ACTIVITY_TITLE_MAX_CHARS))
    }

    pub fn normalized_materials(&self) -> Vec<MaterialId> {
        let mut ids = self.materials.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
