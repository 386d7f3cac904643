//! Enrollment of a user in a course.

use super::{CourseId, EnrollmentId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub created_at: i64,
}

/// Enrollment payload. `course` may be omitted when the course comes from
/// the request path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrollmentInput {
    pub user: UserId,
    #[serde(default)]
    pub course: Option<CourseId>,
}
