//! Student feedback on courses.
//!
//! # Invariants
//! - `rating` is within `1..=5`.
//! - At most one feedback row exists per enrollment.

use super::{CourseId, EnrollmentId, FeedbackId, ValidationError};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseFeedback {
    pub id: FeedbackId,
    pub course_id: CourseId,
    pub enrollment_id: EnrollmentId,
    pub rating: i64,
    pub comment: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackInput {
    pub course_id: CourseId,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

impl FeedbackInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)
    }
}

pub fn validate_rating(rating: i64) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}
