//! Request caller resolution.
//!
//! Credentials arrive as HTTP Basic. A missing `Authorization` header yields
//! an anonymous caller; a malformed or wrong one is rejected with 401.
//! Argon2 work runs on the blocking pool with the database lock released.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use coursehub_core::repo::user_repo::SqliteUserRepository;
use coursehub_core::{
    check_credentials, AccessPolicy, AccountError, AccountService, Action, Principal,
};
use log::warn;

use crate::error::ApiError;
use crate::state::SharedState;

/// The resolved caller of one request, plus the action implied by its method.
#[derive(Debug, Clone)]
pub struct Caller {
    pub principal: Option<Principal>,
    pub action: Action,
}

impl Caller {
    /// Checks `policy` for this caller's action.
    pub fn authorize(&self, policy: AccessPolicy) -> Result<(), ApiError> {
        policy
            .check(self.principal.as_ref(), self.action)
            .map_err(|err| {
                warn!(
                    "event=access_denied module=http policy={} user_id={} action={:?}",
                    policy.as_str(),
                    self.principal
                        .as_ref()
                        .map_or_else(|| "anonymous".to_string(), |p| p.user_id.to_string()),
                    self.action
                );
                ApiError::from(err)
            })
    }

    /// Checks `policy` and returns the authenticated principal.
    pub fn require(&self, policy: AccessPolicy) -> Result<&Principal, ApiError> {
        self.authorize(policy)?;
        self.principal.as_ref().ok_or(ApiError::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let action = Action::from_method(parts.method.as_str());
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self {
                principal: None,
                action,
            });
        };

        let (username, password) = decode_basic(header)?;
        let user = {
            let conn = state.db.lock().await;
            AccountService::new(SqliteUserRepository::new(&conn)).find_by_username(&username)?
        };
        let user = run_password_task(move || check_credentials(user, &password)).await?;

        Ok(Self {
            principal: Some(Principal::from(&user)),
            action,
        })
    }
}

/// Runs password hashing or verification on the blocking pool.
pub(crate) async fn run_password_task<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ApiError::Internal(format!("password task failed: {err}")))?
        .map_err(ApiError::from)
}

/// Splits a `Basic base64(username:password)` header value.
fn decode_basic(header: &HeaderValue) -> Result<(String, String), ApiError> {
    let value = header.to_str().map_err(|_| ApiError::InvalidCredentials)?;
    let encoded = value
        .strip_prefix("Basic ")
        .ok_or(ApiError::InvalidCredentials)?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::InvalidCredentials)?;
    let text = String::from_utf8(decoded).map_err(|_| ApiError::InvalidCredentials)?;
    let (username, password) = text.split_once(':').ok_or(ApiError::InvalidCredentials)?;
    Ok((username.to_string(), password.to_string()))
}
