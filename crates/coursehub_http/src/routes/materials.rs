use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::material::{Material, MaterialInput};
use coursehub_core::model::MaterialId;
use coursehub_core::repo::material_repo::{MaterialRepository, SqliteMaterialRepository};
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
) -> Result<Json<Vec<Material>>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiQuery(filter) = query?;
    let conn = state.db.lock().await;
    let materials = SqliteMaterialRepository::new(&conn).list_materials(filter.course)?;
    Ok(Json(materials))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<MaterialInput>,
) -> Result<(StatusCode, Json<Material>), ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteMaterialRepository::new(&conn);
    let id = repo.create_material(&input)?;
    let material = found(repo.get_material(id)?)?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<MaterialId>,
) -> Result<Json<Material>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let material = found(SqliteMaterialRepository::new(&conn).get_material(id)?)?;
    Ok(Json(material))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<MaterialId>,
    payload: JsonBody<MaterialInput>,
) -> Result<Json<Material>, ApiError> {
    caller.authorize(POLICY)?;
    let ApiJson(input) = payload?;
    let conn = state.db.lock().await;
    let repo = SqliteMaterialRepository::new(&conn);
    repo.update_material(id, &input)?;
    let material = found(repo.get_material(id)?)?;
    Ok(Json(material))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<MaterialId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    SqliteMaterialRepository::new(&conn).delete_material(id)?;
    Ok(StatusCode::NO_CONTENT)
}
