use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use coursehub_core::model::UserId;
use coursehub_core::repo::user_repo::SqliteUserRepository;
use coursehub_core::{
    prepare_account, prepare_password, AccessPolicy, AccountService, CreateAccountRequest, Role,
    UserSummary,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{run_password_task, Caller};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, JsonBody, QueryParams};
use crate::state::SharedState;

/// `?is_professor=` matches `true` case-insensitively; any other value
/// lists students.
#[derive(Debug, Default, Deserialize)]
pub(super) struct UserFilter {
    is_professor: Option<String>,
}

impl UserFilter {
    fn role(&self) -> Option<Role> {
        self.is_professor.as_deref().map(|value| {
            if value.trim().eq_ignore_ascii_case("true") {
                Role::Professor
            } else {
                Role::Student
            }
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateUserBody {
    username: String,
    #[serde(default)]
    email: String,
    password: String,
    #[serde(default = "default_is_professor")]
    is_professor: bool,
}

fn default_is_professor() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(super) struct PasswordResetBody {
    new_password: String,
}

pub(super) async fn list(
    State(state): State<SharedState>,
    caller: Caller,
    query: QueryParams<UserFilter>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    caller.authorize(AccessPolicy::AllowAny)?;
    let ApiQuery(filter) = query?;

    let conn = state.db.lock().await;
    let users =
        AccountService::new(SqliteUserRepository::new(&conn)).list_users(filter.role())?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    caller: Caller,
    payload: JsonBody<CreateUserBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    caller.authorize(AccessPolicy::AdminOnly)?;
    let ApiJson(body) = payload?;
    let request = CreateAccountRequest {
        username: body.username,
        email: body.email,
        password: body.password,
        role: if body.is_professor {
            Role::Professor
        } else {
            Role::Student
        },
    };
    let user = run_password_task(move || prepare_account(&request)).await?;

    let conn = state.db.lock().await;
    let id = AccountService::new(SqliteUserRepository::new(&conn)).store_account(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "id": id })),
    ))
}

pub(super) async fn detail(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<Json<UserSummary>, ApiError> {
    caller.authorize(AccessPolicy::AllowAny)?;
    let conn = state.db.lock().await;
    let user = AccountService::new(SqliteUserRepository::new(&conn))
        .get_user(id)?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;
    Ok(Json(UserSummary::from(&user)))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(AccessPolicy::AdminOnly)?;
    let conn = state.db.lock().await;
    AccountService::new(SqliteUserRepository::new(&conn)).delete_user(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn reset_password(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<UserId>,
    payload: JsonBody<PasswordResetBody>,
) -> Result<Json<Value>, ApiError> {
    caller.authorize(AccessPolicy::AdminOnly)?;
    let ApiJson(body) = payload?;
    let password_hash = run_password_task(move || prepare_password(&body.new_password)).await?;

    let conn = state.db.lock().await;
    AccountService::new(SqliteUserRepository::new(&conn))
        .store_password_hash(id, &password_hash)?;
    Ok(Json(json!({ "message": "Password updated successfully." })))
}
