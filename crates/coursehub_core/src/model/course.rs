//! Course records and their write payload.
//!
//! # Invariants
//! - `end_date >= start_date`.
//! - `professor_id` references a user whose role is `professor`; the role
//!   check needs storage and lives in the course repository.

use super::{require_text, CategoryId, CourseId, UserId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const COURSE_NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    pub professor_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Category ids sorted ascending.
    pub categories: Vec<CategoryId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Full-replacement payload for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub professor_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl CourseInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, Some(COURSE_NAME_MAX_CHARS))?;
        if self.end_date < self.start_date {
            return Err(ValidationError::DateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Category ids deduplicated and sorted, as persisted.
    pub fn normalized_categories(&self) -> Vec<CategoryId> {
        let mut ids = self.categories.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
