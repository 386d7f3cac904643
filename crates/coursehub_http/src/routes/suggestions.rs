use axum::{
    extract::{Path, State},
    Json,
};
use coursehub_core::model::UserId;
use coursehub_core::repo::suggestion_repo::SqliteSuggestionSource;
use coursehub_core::{AccessPolicy, CourseSuggestion, SuggestionService};
use serde::Serialize;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub(super) struct SuggestionsBody {
    suggested_courses: Vec<CourseSuggestion>,
}

pub(super) async fn suggest(
    State(state): State<SharedState>,
    caller: Caller,
    Path(user_id): Path<UserId>,
) -> Result<Json<SuggestionsBody>, ApiError> {
    caller.authorize(AccessPolicy::Authenticated)?;
    let conn = state.db.lock().await;
    let suggested_courses =
        SuggestionService::new(SqliteSuggestionSource::new(&conn)).suggest_courses(user_id)?;
    Ok(Json(SuggestionsBody { suggested_courses }))
}
