use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::forum::{Forum, ForumInput};
use coursehub_core::model::ForumId;
use coursehub_core::repo::forum_repo::{ForumRepository, SqliteForumRepository};
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
) -> Result<Json<Vec<Forum>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let forums = SqliteForumRepository::new(&conn).list_forums(filter.course)?;
    Ok(Json(forums))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<ForumInput>,
) -> Result<(StatusCode, Json<Forum>), ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteForumRepository::new(&conn);
    let id = repo.create_forum(&input)?;
    let forum = found(repo.get_forum(id)?)?;
    Ok((StatusCode::CREATED, Json(forum)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<ForumId>,
) -> Result<Json<Forum>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let forum = found(SqliteForumRepository::new(&conn).get_forum(id)?)?;
    Ok(Json(forum))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<ForumId>,
    payload: JsonBody<ForumInput>,
) -> Result<Json<Forum>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteForumRepository::new(&conn);
    repo.update_forum(id, &input)?;
    let forum = found(repo.get_forum(id)?)?;
    Ok(Json(forum))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<ForumId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    SqliteForumRepository::new(&conn).delete_forum(id)?;
    Ok(StatusCode::NO_CONTENT)
}
