//! Route table and shared handler helpers.

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Router,
};
use coursehub_core::model::CourseId;
use log::info;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::SharedState;

mod activities;
mod categories;
mod courses;
mod enrollments;
mod feedback;
mod forums;
mod grades;
mod health;
mod materials;
mod posts;
mod suggestions;
mod users;

/// Builds the full API router over `state`.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/categories", get(categories::list))
        .route("/api/categories/:id", get(categories::detail))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/:id", get(users::detail).delete(users::delete))
        .route("/api/users/:id/password", put(users::reset_password))
        .route("/api/users/:id/suggestions", get(suggestions::suggest))
        .route("/api/courses", get(courses::list).post(courses::create))
        .route(
            "/api/courses/:id",
            get(courses::detail)
                .put(courses::update)
                .delete(courses::delete),
        )
        .route("/api/courses/:id/update", put(courses::update))
        .route(
            "/api/courses/:id/students",
            get(enrollments::list_for_course).post(enrollments::enroll_in_course),
        )
        .route(
            "/api/students",
            get(enrollments::list).post(enrollments::create),
        )
        .route(
            "/api/students/:id",
            get(enrollments::detail).delete(enrollments::delete),
        )
        .route(
            "/api/materials",
            get(materials::list).post(materials::create),
        )
        .route(
            "/api/materials/:id",
            get(materials::detail)
                .put(materials::update)
                .delete(materials::delete),
        )
        .route(
            "/api/activities",
            get(activities::list).post(activities::create),
        )
        .route(
            "/api/activities/:id",
            get(activities::detail)
                .put(activities::update)
                .delete(activities::delete),
        )
        .route("/api/grades", get(grades::list).post(grades::create))
        .route(
            "/api/grades/:id",
            get(grades::detail).put(grades::update).delete(grades::delete),
        )
        .route("/api/forums", get(forums::list).post(forums::create))
        .route(
            "/api/forums/:id",
            get(forums::detail).put(forums::update).delete(forums::delete),
        )
        .route("/api/posts", get(posts::list).post(posts::create))
        .route(
            "/api/posts/:id",
            get(posts::detail).put(posts::update).delete(posts::delete),
        )
        .route("/api/feedback", get(feedback::list).post(feedback::create))
        .route(
            "/api/feedback/:id",
            get(feedback::detail)
                .put(feedback::update)
                .delete(feedback::delete),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=http method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

/// `?course=<id>` filter shared by course-scoped list endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CourseFilter {
    pub course: Option<CourseId>,
}

pub(crate) fn found<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(ApiError::not_found)
}
