//! Course-suggestion engine.
//!
//! # Responsibility
//! - Recommend courses a user is not enrolled in that share at least one
//!   category with the user's current enrollments.
//!
//! # Invariants
//! - A suggestion is never a course the user is enrolled in.
//! - Each course appears at most once.
//! - Ordering is deterministic: most shared categories first, then course
//!   id ascending.

use crate::model::{CategoryId, CourseId, UserId};
use crate::repo::suggestion_repo::{CandidateCourse, SuggestionSource};
use crate::repo::RepoError;
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// One recommended course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSuggestion {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    /// Names of every category on the course, sorted by name.
    pub categories: Vec<String>,
    /// How many of the user's aggregated categories this course carries.
    #[serde(skip)]
    pub shared_categories: usize,
}

#[derive(Debug)]
pub enum SuggestionError {
    UserNotFound(UserId),
    NotEnrolled(UserId),
    NoSuggestions(UserId),
    Repo(RepoError),
}

impl Display for SuggestionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(_) => write!(f, "User not found."),
            Self::NotEnrolled(_) => write!(f, "User is not enrolled in any of the courses."),
            Self::NoSuggestions(_) => write!(f, "No course suggestions found."),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SuggestionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SuggestionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct SuggestionService<S: SuggestionSource> {
    source: S,
}

impl<S: SuggestionSource> SuggestionService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Suggests unseen courses related to the user's enrollments.
    ///
    /// # Errors
    /// - `UserNotFound` when the user does not exist.
    /// - `NotEnrolled` when the user has no enrollments.
    /// - `NoSuggestions` when no candidate survives exclusion.
    pub fn suggest_courses(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CourseSuggestion>, SuggestionError> {
        let started_at = Instant::now();

        if !self.source.user_exists(user_id)? {
            return Err(SuggestionError::UserNotFound(user_id));
        }

        let enrolled = self.source.enrolled_course_ids(user_id)?;
        if enrolled.is_empty() {
            return Err(SuggestionError::NotEnrolled(user_id));
        }

        let categories = self.source.categories_of(&enrolled)?;
        debug!(
            "event=suggest_courses module=service status=aggregate user_id={} enrolled={} categories={}",
            user_id,
            enrolled.len(),
            categories.len()
        );

        let candidates = self.source.courses_in_categories(&categories)?;
        let suggestions = rank_candidates(candidates, &enrolled, &categories);

        info!(
            "event=suggest_courses module=service status=ok user_id={} suggestions={} duration_ms={}",
            user_id,
            suggestions.len(),
            started_at.elapsed().as_millis()
        );

        if suggestions.is_empty() {
            return Err(SuggestionError::NoSuggestions(user_id));
        }
        Ok(suggestions)
    }
}

/// Drops enrolled courses and duplicates, then orders by overlap.
fn rank_candidates(
    candidates: Vec<CandidateCourse>,
    enrolled: &BTreeSet<CourseId>,
    categories: &BTreeSet<CategoryId>,
) -> Vec<CourseSuggestion> {
    let mut unique: BTreeMap<CourseId, CandidateCourse> = BTreeMap::new();
    for candidate in candidates {
        if enrolled.contains(&candidate.id) {
            continue;
        }
        unique.entry(candidate.id).or_insert(candidate);
    }

    let mut suggestions: Vec<CourseSuggestion> = unique
        .into_values()
        .filter_map(|course| {
            let shared = course
                .categories
                .iter()
                .filter(|category| categories.contains(&category.id))
                .count();
            if shared == 0 {
                return None;
            }
            let mut names: Vec<String> = course
                .categories
                .into_iter()
                .map(|category| category.name)
                .collect();
            names.sort();
            Some(CourseSuggestion {
                id: course.id,
                name: course.name,
                description: course.description,
                categories: names,
                shared_categories: shared,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.shared_categories
            .cmp(&a.shared_categories)
            .then(a.id.cmp(&b.id))
    });
    suggestions
}
