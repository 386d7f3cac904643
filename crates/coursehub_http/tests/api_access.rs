mod helpers;

use axum::http::StatusCode;
use coursehub_core::Role;
use helpers::{TestApp, TestRequest};
use serde_json::json;

#[tokio::test]
async fn health_and_categories_are_public() {
    let app = TestApp::new();

    let health = app.send(TestRequest::get("/health")).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "pong");

    let categories = app.send(TestRequest::get("/api/categories")).await;
    assert_eq!(categories.status, StatusCode::OK);
    assert_eq!(categories.json().as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn wrong_password_is_rejected_with_challenge() {
    let app = TestApp::new();

    let response = app
        .send(TestRequest::get("/api/categories").basic("admin", "nope"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.www_authenticate);
    assert_eq!(response.detail(), "Invalid username/password.");
}

#[tokio::test]
async fn anonymous_writes_need_authentication() {
    let app = TestApp::new();

    let response = app
        .send(TestRequest::post("/api/courses").json(&json!({
            "name": "Anonymous",
            "professor_id": 1,
            "start_date": "2024-01-01",
            "end_date": "2024-02-01"
        })))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.www_authenticate);
    assert_eq!(
        response.detail(),
        "Authentication credentials were not provided."
    );
}

#[tokio::test]
async fn students_cannot_create_courses_or_grades() {
    let app = TestApp::new();
    let professor = app.user("ada", Role::Professor).await;
    app.user("sam", Role::Student).await;

    let course = app
        .send(TestRequest::post("/api/courses").as_user("sam").json(&json!({
            "name": "Student course",
            "professor_id": professor,
            "start_date": "2024-01-01",
            "end_date": "2024-02-01"
        })))
        .await;
    assert_eq!(course.status, StatusCode::FORBIDDEN);
    assert_eq!(
        course.detail(),
        "You do not have permission to perform this action."
    );

    let grade = app
        .send(TestRequest::post("/api/grades").as_user("sam").json(&json!({
            "enrollment_id": 1,
            "activity_id": 1,
            "score": 100.0
        })))
        .await;
    assert_eq!(grade.status, StatusCode::FORBIDDEN);

    let grades = app
        .send(TestRequest::get("/api/grades").as_user("sam"))
        .await;
    assert_eq!(grades.status, StatusCode::OK);
}

#[tokio::test]
async fn materials_require_login_to_read() {
    let app = TestApp::new();
    app.user("sam", Role::Student).await;

    let anonymous = app.send(TestRequest::get("/api/materials")).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let student = app
        .send(TestRequest::get("/api/materials").as_user("sam"))
        .await;
    assert_eq!(student.status, StatusCode::OK);
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = TestApp::new();
    app.user("ada", Role::Professor).await;

    let by_professor = app
        .send(TestRequest::post("/api/users").as_user("ada").json(&json!({
            "username": "mallory",
            "password": "long-enough"
        })))
        .await;
    assert_eq!(by_professor.status, StatusCode::FORBIDDEN);

    let by_admin = app
        .send(TestRequest::post("/api/users").as_admin().json(&json!({
            "username": "grace",
            "email": "grace@example.com",
            "password": "long-enough"
        })))
        .await;
    assert_eq!(by_admin.status, StatusCode::CREATED);
    assert_eq!(by_admin.json()["message"], "User created successfully");
    let id = by_admin.id();

    let detail = app
        .send(TestRequest::get(&format!("/api/users/{id}")))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json()["professor"], true);
    assert!(detail.json().get("password_hash").is_none());
}

#[tokio::test]
async fn password_reset_changes_login() {
    let app = TestApp::new();
    let id = app.user("sam", Role::Student).await;

    let short = app
        .send(
            TestRequest::put(&format!("/api/users/{id}/password"))
                .as_admin()
                .json(&json!({ "new_password": "short" })),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let reset = app
        .send(
            TestRequest::put(&format!("/api/users/{id}/password"))
                .as_admin()
                .json(&json!({ "new_password": "brand-new-password" })),
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK);
    assert_eq!(reset.json()["message"], "Password updated successfully.");

    let old = app
        .send(TestRequest::get("/api/students").as_user("sam"))
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = app
        .send(TestRequest::get("/api/students").basic("sam", "brand-new-password"))
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn user_list_filters_professors() {
    let app = TestApp::new();
    app.user("ada", Role::Professor).await;
    app.user("sam", Role::Student).await;

    let professors = app
        .send(TestRequest::get("/api/users?is_professor=true"))
        .await;
    let names = professors
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["username"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["ada".to_string()]);

    let students = app
        .send(TestRequest::get("/api/users?is_professor=false"))
        .await;
    assert_eq!(students.json().as_array().unwrap().len(), 1);
    assert_eq!(students.json()[0]["professor"], false);
}

#[tokio::test]
async fn policy_is_checked_before_the_body_is_parsed() {
    let app = TestApp::new();
    app.user("ada", Role::Professor).await;
    app.user("sam", Role::Student).await;

    let anonymous = app
        .send(TestRequest::post("/api/courses").json(&json!({ "name": "x" })))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert!(anonymous.www_authenticate);
    assert!(!anonymous.detail().contains("professor_id"));

    let student = app
        .send(
            TestRequest::post("/api/grades")
                .as_user("sam")
                .json(&json!({ "score": 5 })),
        )
        .await;
    assert_eq!(student.status, StatusCode::FORBIDDEN);
    assert!(!student.detail().contains("enrollment_id"));

    let professor = app
        .send(TestRequest::post("/api/users").as_user("ada").json(&json!({})))
        .await;
    assert_eq!(professor.status, StatusCode::FORBIDDEN);

    let anonymous_query = app
        .send(TestRequest::get("/api/students?user=abc"))
        .await;
    assert_eq!(anonymous_query.status, StatusCode::UNAUTHORIZED);

    let allowed = app
        .send(TestRequest::post("/api/courses").as_user("ada").json(&json!({ "name": "x" })))
        .await;
    assert_eq!(allowed.status, StatusCode::BAD_REQUEST);
    assert!(allowed.detail().contains("professor_id"));
}

#[tokio::test]
async fn unknown_username_looks_like_a_wrong_password() {
    let app = TestApp::new();

    let response = app
        .send(TestRequest::get("/api/students").basic("nobody", "whatever-password"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Invalid username/password.");
}

#[tokio::test]
async fn user_list_filter_ignores_case() {
    let app = TestApp::new();
    app.user("ada", Role::Professor).await;
    app.user("sam", Role::Student).await;

    let professors = app
        .send(TestRequest::get("/api/users?is_professor=True"))
        .await;
    assert_eq!(professors.status, StatusCode::OK);
    assert_eq!(professors.json().as_array().unwrap().len(), 1);
    assert_eq!(professors.json()[0]["username"], "ada");

    let students = app
        .send(TestRequest::get("/api/users?is_professor=FALSE"))
        .await;
    assert_eq!(students.status, StatusCode::OK);
    assert_eq!(students.json().as_array().unwrap().len(), 1);
    assert_eq!(students.json()[0]["username"], "sam");
}
