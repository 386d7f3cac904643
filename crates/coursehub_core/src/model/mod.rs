//! Domain model for the course catalog.
//!
//! # Responsibility
//! - Define the records persisted by the repository layer.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a SQLite rowid (`i64`).
//! - Input types validate themselves before any SQL runs.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod activity;
pub mod category;
pub mod course;
pub mod enrollment;
pub mod feedback;
pub mod forum;
pub mod grade;
pub mod material;
pub mod user;

pub type UserId = i64;
pub type CategoryId = i64;
pub type CourseId = i64;
pub type EnrollmentId = i64;
pub type MaterialId = i64;
pub type ActivityId = i64;
pub type GradeId = i64;
pub type ForumId = i64;
pub type PostId = i64;
pub type FeedbackId = i64;

/// Field-level validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(&'static str),
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
    },
    InvalidUsername(String),
    InvalidEmail(String),
    PasswordTooShort {
        min_chars: usize,
    },
    DateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    ScoreOutOfRange(f64),
    RatingOutOfRange(i64),
    NotAProfessor(UserId),
    CourseMismatch {
        field: &'static str,
        expected: CourseId,
        found: CourseId,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::InvalidUsername(value) => write!(
                f,
                "invalid username `{value}`; use letters, digits and @/./+/-/_ only"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "password must be at least {min_chars} characters")
            }
            Self::DateRange { start, end } => {
                write!(f, "end_date {end} is earlier than start_date {start}")
            }
            Self::ScoreOutOfRange(score) => {
                write!(f, "score {score} is outside the 0..=100 range")
            }
            Self::RatingOutOfRange(rating) => {
                write!(f, "rating {rating} is outside the 1..=5 range")
            }
            Self::NotAProfessor(user_id) => write!(f, "user {user_id} is not a professor"),
            Self::CourseMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "{field} belongs to course {found}, expected course {expected}"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if let Some(max_chars) = max_chars {
        if value.chars().count() > max_chars {
            return Err(ValidationError::FieldTooLong { field, max_chars });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_rejects_blank_values() {
        assert_eq!(
            require_text("name", "   ", None),
            Err(ValidationError::EmptyField("name"))
        );
    }

    #[test]
    fn require_text_counts_chars_not_bytes() {
        assert!(require_text("name", "ñññ", Some(3)).is_ok());
        assert_eq!(
            require_text("name", "ññññ", Some(3)),
            Err(ValidationError::FieldTooLong {
                field: "name",
                max_chars: 3
            })
        );
    }
}
