//! In-process HTTP testing utilities.
//!
//! Drives the router with `tower::ServiceExt::oneshot`, no socket involved.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use coursehub_core::repo::user_repo::SqliteUserRepository;
use coursehub_core::{
    bootstrap, open_db_in_memory, AccountService, CreateAccountRequest, Role, SuperuserSeed,
};
use coursehub_http::{build_router, AppState, SharedState};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN: (&str, &str) = ("admin", "admin-password");
pub const PASSWORD: &str = "test-password";

/// A router over a fresh, bootstrapped in-memory database.
pub struct TestApp {
    pub state: SharedState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let conn = open_db_in_memory().unwrap();
        bootstrap(
            &conn,
            Some(&SuperuserSeed {
                username: ADMIN.0.to_string(),
                email: "admin@example.com".to_string(),
                password: ADMIN.1.to_string(),
            }),
        )
        .unwrap();
        let state = AppState::new(conn);
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// Creates an account with [`PASSWORD`] and returns its id.
    pub async fn user(&self, username: &str, role: Role) -> i64 {
        let conn = self.state.db.lock().await;
        AccountService::new(SqliteUserRepository::new(&conn))
            .create_account(&CreateAccountRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: PASSWORD.to_string(),
                role,
            })
            .unwrap()
    }

    pub async fn send(&self, request: TestRequest) -> TestResponse {
        request.send(self.router.clone()).await
    }
}

pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Adds HTTP Basic credentials.
    pub fn basic(mut self, username: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{username}:{password}"));
        self.headers.push((
            header::AUTHORIZATION.as_str().to_owned(),
            format!("Basic {token}"),
        ));
        self
    }

    /// Authenticates as `username` with the shared test password.
    pub fn as_user(self, username: &str) -> Self {
        self.basic(username, PASSWORD)
    }

    pub fn as_admin(self) -> Self {
        self.basic(ADMIN.0, ADMIN.1)
    }

    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).unwrap());
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/json".to_owned(),
        ));
        self
    }

    pub async fn send(self, app: Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }

        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        let status = response.status();
        let www_authenticate = response.headers().contains_key(header::WWW_AUTHENTICATE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            www_authenticate,
            body: bytes.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub www_authenticate: bool,
    body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn detail(&self) -> String {
        self.json()["detail"].as_str().unwrap_or_default().to_string()
    }

    pub fn id(&self) -> i64 {
        self.json()["id"].as_i64().unwrap()
    }
}
