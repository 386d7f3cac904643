use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::forum::{Post, PostInput};
use coursehub_core::model::{ForumId, PostId};
use coursehub_core::repo::forum_repo::{ForumRepository, SqliteForumRepository};
use coursehub_core::AccessPolicy;
use serde::Deserialize;

use super::found;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

const POLICY: AccessPolicy = AccessPolicy::Authenticated;

#[derive(Debug, Default, Deserialize)]
pub(super) struct PostFilter {
    forum: Option<ForumId>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostUpdate {
    content: String,
}

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<PostFilter>,
) -> Result<Json<Vec<Post>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let posts = SqliteForumRepository::new(&conn).list_posts(filter.forum)?;
    Ok(Json(posts))
}

/// Posts are always authored by the caller.
pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let author = caller.require(POLICY)?.user_id;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteForumRepository::new(&conn);
    let id = repo.create_post(author, &input)?;
    let post = found(repo.get_post(id)?)?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<PostId>,
) -> Result<Json<Post>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let post = found(SqliteForumRepository::new(&conn).get_post(id)?)?;
    Ok(Json(post))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<PostId>,
    payload: JsonBody<PostUpdate>,
) -> Result<Json<Post>, ApiError> {
    let principal = caller.require(POLICY)?;
    let conn = state.db.lock().await;
    let repo = SqliteForumRepository::new(&conn);
    let post = found(repo.get_post(id)?)?;
    if !principal.owns_or_admin(post.user_id) {
        return Err(forbidden());
    }

    let ApiJson(body) = payload?;
    repo.update_post(id, &body.content)?;
    let post = found(repo.get_post(id)?)?;
    Ok(Json(post))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<PostId>,
) -> Result<StatusCode, ApiError> {
    let principal = caller.require(POLICY)?;
    let conn = state.db.lock().await;
    let repo = SqliteForumRepository::new(&conn);
    let post = found(repo.get_post(id)?)?;
    if !principal.owns_or_admin(post.user_id) {
        return Err(forbidden());
    }

    repo.delete_post(id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn forbidden() -> ApiError {
    ApiError::Forbidden("Only the author may change this post.".to_string())
}
