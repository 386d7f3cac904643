use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::enrollment::{Enrollment, EnrollmentInput};
use coursehub_core::model::{CourseId, EnrollmentId, UserId};
use coursehub_core::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use coursehub_core::repo::enrollment_repo::{
    EnrollmentListQuery, EnrollmentRepository, SqliteEnrollmentRepository,
};
use coursehub_core::AccessPolicy;
use rusqlite::Connection;
use serde::Deserialize;

use super::found;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

const POLICY: AccessPolicy = AccessPolicy::Authenticated;

#[derive(Debug, Default, Deserialize)]
pub(super) struct EnrollmentFilter {
    user: Option<UserId>,
    course: Option<CourseId>,
}

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<EnrollmentFilter>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let enrollments = SqliteEnrollmentRepository::new(&conn).list_enrollments(
        &EnrollmentListQuery {
            user_id: filter.user,
            course_id: filter.course,
        },
    )?;
    Ok(Json(enrollments))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<EnrollmentInput>,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let course_id = input
        .course
        .ok_or_else(|| ApiError::BadRequest("course is required".to_string()))?;

    let conn = state.db.lock().await;
    enroll(&conn, input.user, course_id)
}

pub(super) async fn list_for_course(
    State(state): State<SharedState>,
    caller: Caller,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    ensure_course(&conn, course_id)?;
    let enrollments = SqliteEnrollmentRepository::new(&conn).list_enrollments(
        &EnrollmentListQuery {
            user_id: None,
            course_id: Some(course_id),
        },
    )?;
    Ok(Json(enrollments))
}

/// An unknown course in the path is a 404.
pub(super) async fn enroll_in_course(
    State(state): State<SharedState>,
    caller: Caller,
    Path(course_id): Path<CourseId>,
    payload: JsonBody<EnrollmentInput>,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    ensure_course(&conn, course_id)?;

    let ApiJson(input) = payload?;
    if input.course.is_some_and(|course| course != course_id) {
        return Err(ApiError::BadRequest(
            "course in body does not match the course in the path".to_string(),
        ));
    }
    enroll(&conn, input.user, course_id)
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<EnrollmentId>,
) -> Result<Json<Enrollment>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let enrollment = found(SqliteEnrollmentRepository::new(&conn).get_enrollment(id)?)?;
    Ok(Json(enrollment))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<EnrollmentId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    SqliteEnrollmentRepository::new(&conn).delete_enrollment(id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn ensure_course(conn: &Connection, course_id: CourseId) -> Result<(), ApiError> {
    found(SqliteCourseRepository::new(conn).get_course(course_id)?).map(|_| ())
}

fn enroll(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    let repo = SqliteEnrollmentRepository::new(conn);
    let id = repo.enroll(user_id, course_id)?;
    let enrollment = found(repo.get_enrollment(id)?)?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}
