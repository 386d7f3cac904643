use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use coursehub_core::{AccessError, AccountError, RepoError, SuggestionError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Error type returned by every handler.
///
/// Renders as `{"detail": "<message>"}` with the matching status code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("Invalid username/password.")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("A server error occurred.")]
    Internal(String),
}

impl ApiError {
    pub fn not_found() -> Self {
        Self::NotFound("Not found.".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            error!("event=http_error module=http status=error error={cause}");
        }

        let status = self.status();
        let mut response = (status, Json(json!({ "detail": self.to_string() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"api\""),
            );
        }
        response
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::BadRequest(err.to_string()),
            RepoError::NotFound { .. } => Self::not_found(),
            RepoError::MissingReference { entity, id } => {
                Self::BadRequest(format!("Invalid pk \"{id}\" - {entity} does not exist."))
            }
            RepoError::Conflict(message) => Self::Conflict(message),
            err @ (RepoError::Db(_) | RepoError::InvalidData(_)) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::Unauthenticated => Self::Unauthenticated,
            AccessError::Forbidden(_) => Self::Forbidden(value.to_string()),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::Validation(err) => Self::BadRequest(err.to_string()),
            AccountError::InvalidCredentials => Self::InvalidCredentials,
            AccountError::Hashing(message) => Self::Internal(message),
            AccountError::Repo(err) => err.into(),
        }
    }
}

impl From<SuggestionError> for ApiError {
    fn from(value: SuggestionError) -> Self {
        match value {
            SuggestionError::Repo(err) => err.into(),
            other => Self::NotFound(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}
