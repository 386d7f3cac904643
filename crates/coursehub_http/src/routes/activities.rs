use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::activity::{Activity, ActivityInput};
use coursehub_core::model::ActivityId;
use coursehub_core::repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
use coursehub_core::AccessPolicy;

use super::{found, CourseFilter};
use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

const POLICY: AccessPolicy = AccessPolicy::ProfessorOrReadOnly;

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<CourseFilter>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let activities = SqliteActivityRepository::new(&conn).list_activities(filter.course)?;
    Ok(Json(activities))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<ActivityInput>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteActivityRepository::new(&conn);
    let id = repo.create_activity(&input)?;
    let activity = found(repo.get_activity(id)?)?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<ActivityId>,
) -> Result<Json<Activity>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let activity = found(SqliteActivityRepository::new(&conn).get_activity(id)?)?;
    Ok(Json(activity))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<ActivityId>,
    payload: JsonBody<ActivityInput>,
) -> Result<Json<Activity>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteActivityRepository::new(&conn);
    repo.update_activity(id, &input)?;
    let activity = found(repo.get_activity(id)?)?;
    Ok(Json(activity))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<ActivityId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    SqliteActivityRepository::new(&conn).delete_activity(id)?;
    Ok(StatusCode::NO_CONTENT)
}
