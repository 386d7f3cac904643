use axum::{
    extract::{Path, State},
    Json,
};
use coursehub_core::model::category::Category;
use coursehub_core::model::CategoryId;
use coursehub_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use coursehub_core::AccessPolicy;

use super::found;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::SharedState;

const POLICY: AccessPolicy = AccessPolicy::AllowAny;

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
) -> Result<Json<Vec<Category>>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let categories = SqliteCategoryRepository::new(&conn).list_categories()?;
    Ok(Json(categories))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, ApiError> {
    caller.authorize(POLICY)?;
    let conn = state.db.lock().await;
    let category = found(SqliteCategoryRepository::new(&conn).get_category(id)?)?;
    Ok(Json(category))
}
