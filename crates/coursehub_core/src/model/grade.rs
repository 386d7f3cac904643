//! Grades awarded for activities.

use super::{ActivityId, EnrollmentId, GradeId, ValidationError};
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub id: GradeId,
    pub enrollment_id: EnrollmentId,
    pub activity_id: ActivityId,
    pub score: f64,
    pub comment: String,
    pub graded_at: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeInput {
    pub enrollment_id: EnrollmentId,
    pub activity_id: ActivityId,
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

impl GradeInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.score.is_finite() || !(0.0..=MAX_SCORE).contains(&self.score) {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }
}
