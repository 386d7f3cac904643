use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::course::{Course, CourseInput};
use coursehub_core::model::{CategoryId, CourseId, UserId};
use coursehub_core::repo::course_repo::{CourseListQuery, CourseRepository, SqliteCourseRepository};
use coursehub_core::AccessPolicy;
use serde::Deserialize;

use super::found;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

const POLICY: AccessPolicy = AccessPolicy::AdminOrProfessorOrReadOnly;

#[derive(Debug, Default, Deserialize)]
pub(super) struct CatalogFilter {
    professor: Option<UserId>,
    category: Option<CategoryId>,
}

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<CatalogFilter>,
) -> Result<Json<Vec<Course>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let courses = SqliteCourseRepository::new(&conn).list_courses(&CourseListQuery {
        professor_id: filter.professor,
        category_id: filter.category,
    })?;
    Ok(Json(courses))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<CourseInput>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteCourseRepository::new(&conn);
    let id = repo.create_course(&input)?;
    let course = found(repo.get_course(id)?)?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<CourseId>,
) -> Result<Json<Course>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let course = found(SqliteCourseRepository::new(&conn).get_course(id)?)?;
    Ok(Json(course))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<CourseId>,
    payload: JsonBody<CourseInput>,
) -> Result<Json<Course>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteCourseRepository::new(&conn);
    repo.update_course(id, &input)?;
    let course = found(repo.get_course(id)?)?;
    Ok(Json(course))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<CourseId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    SqliteCourseRepository::new(&conn).delete_course(id)?;
    Ok(StatusCode::NO_CONTENT)
}
