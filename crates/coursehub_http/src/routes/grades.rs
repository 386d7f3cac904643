use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::grade::{Grade, GradeInput};
use coursehub_core::model::{ActivityId, EnrollmentId, GradeId};
use coursehub_core::repo::grade_repo::{GradeListQuery, GradeRepository, SqliteGradeRepository};
use coursehub_core::AccessPolicy;
use serde::Deserialize;

use super::found;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

const POLICY: AccessPolicy = AccessPolicy::ReadOnlyForStudents;

#[derive(Debug, Default, Deserialize)]
pub(super) struct GradeFilter {
    enrollment: Option<EnrollmentId>,
    activity: Option<ActivityId>,
}

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<GradeFilter>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let grades = SqliteGradeRepository::new(&conn).list_grades(&GradeListQuery {
        enrollment_id: filter.enrollment,
        activity_id: filter.activity,
    })?;
    Ok(Json(grades))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<GradeInput>,
) -> Result<(StatusCode, Json<Grade>), ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteGradeRepository::new(&conn);
    let id = repo.create_grade(&input)?;
    let grade = found(repo.get_grade(id)?)?;
    Ok((StatusCode::CREATED, Json(grade)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<GradeId>,
) -> Result<Json<Grade>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let grade = found(SqliteGradeRepository::new(&conn).get_grade(id)?)?;
    Ok(Json(grade))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<GradeId>,
    payload: JsonBody<GradeInput>,
) -> Result<Json<Grade>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteGradeRepository::new(&conn);
    repo.update_grade(id, &input)?;
    let grade = found(repo.get_grade(id)?)?;
    Ok(Json(grade))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<GradeId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    SqliteGradeRepository::new(&conn).delete_grade(id)?;
    Ok(StatusCode::NO_CONTENT)
}
