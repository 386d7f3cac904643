use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::feedback::{CourseFeedback, FeedbackInput};
use coursehub_core::model::FeedbackId;
use coursehub_core::repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
use coursehub_core::repo::feedback_repo::{FeedbackRepository, SqliteFeedbackRepository};
use coursehub_core::{AccessPolicy, Principal};
use rusqlite::Connection;
use serde::Deserialize;

use super::{found, CourseFilter};
use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub(super) struct FeedbackUpdate {
    rating: i64,
    #[serde(default)]
    comment: String,
}

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<CourseFilter>,
) -> Result<Json<Vec<CourseFeedback>>, ApiError> {
    caller.authorize(AccessPolicy::Authenticated)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let feedback = SqliteFeedbackRepository::new(&conn).list_feedback(filter.course)?;
    Ok(Json(feedback))
}

/// Students leave feedback through their own enrollment in the course.
pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<FeedbackInput>,
) -> Result<(StatusCode, Json<CourseFeedback>), ApiError> {
    let student = caller.require(AccessPolicy::StudentOnly)?;
    let ApiJson(input) = payload?;
    input
        .validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let conn = state.db.lock().await;
    let enrollment = SqliteEnrollmentRepository::new(&conn)
        .find_enrollment(student.user_id, input.course_id)?
        .ok_or_else(|| {
            ApiError::BadRequest("You are not enrolled in this course.".to_string())
        })?;

    let repo = SqliteFeedbackRepository::new(&conn);
    let id = repo.create_feedback(
        input.course_id,
        enrollment.id,
        input.rating,
        &input.comment,
    )?;
    let feedback = found(repo.get_feedback(id)?)?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<FeedbackId>,
) -> Result<Json<CourseFeedback>, ApiError> {
    caller.authorize(AccessPolicy::Authenticated)?;
    let conn = state.db.lock().await;
    let feedback = found(SqliteFeedbackRepository::new(&conn).get_feedback(id)?)?;
    Ok(Json(feedback))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<FeedbackId>,
    payload: JsonBody<FeedbackUpdate>,
) -> Result<Json<CourseFeedback>, ApiError> {
    let principal = caller.require(AccessPolicy::Authenticated)?;
    let conn = state.db.lock().await;
    ensure_author(&conn, principal, id)?;
    let ApiJson(body) = payload?;

    let repo = SqliteFeedbackRepository::new(&conn);
    repo.update_feedback(id, body.rating, &body.comment)?;
    let feedback = found(repo.get_feedback(id)?)?;
    Ok(Json(feedback))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<FeedbackId>,
) -> Result<StatusCode, ApiError> {
    let principal = caller.require(AccessPolicy::Authenticated)?;
    let conn = state.db.lock().await;
    ensure_author(&conn, principal, id)?;

    SqliteFeedbackRepository::new(&conn).delete_feedback(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Feedback may be changed by the enrolled student who wrote it, or an admin.
fn ensure_author(
    conn: &Connection,
    principal: &Principal,
    id: FeedbackId,
) -> Result<(), ApiError> {
    let feedback = found(SqliteFeedbackRepository::new(conn).get_feedback(id)?)?;
    let enrollment = found(
        SqliteEnrollmentRepository::new(conn).get_enrollment(feedback.enrollment_id)?,
    )?;
    if principal.owns_or_admin(enrollment.user_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the author may change this feedback.".to_string(),
        ))
    }
}
