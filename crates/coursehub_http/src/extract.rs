//! JSON and query extractors whose rejections render as `ApiError`.
//!
//! Handlers take `JsonBody<T>` / `QueryParams<T>` so that a malformed body or
//! query is only reported after the caller passed the route's access policy.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON body whose rejection is deferred to the handler.
pub type JsonBody<T> = Result<ApiJson<T>, ApiError>;

/// Query string whose rejection is deferred to the handler.
pub type QueryParams<T> = Result<ApiQuery<T>, ApiError>;
