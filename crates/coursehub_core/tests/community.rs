use chrono::NaiveDate;
use coursehub_core::db::open_db_in_memory;
use coursehub_core::model::course::CourseInput;
use coursehub_core::model::forum::{ForumInput, PostInput};
use coursehub_core::model::{CourseId, UserId};
use coursehub_core::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use coursehub_core::repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
use coursehub_core::repo::feedback_repo::{FeedbackRepository, SqliteFeedbackRepository};
use coursehub_core::repo::forum_repo::{ForumRepository, SqliteForumRepository};
use coursehub_core::repo::user_repo::{NewUser, SqliteUserRepository, UserRepository};
use coursehub_core::{RepoError, Role, ValidationError};
use rusqlite::Connection;

#[test]
fn posts_carry_author_and_follow_forum_filter() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let student = add_user(&conn, "sam", Role::Student);
    let course = add_course(&conn, professor, "Rust");
    let repo = SqliteForumRepository::new(&conn);

    let general = repo.create_forum(&forum_input(course, "General")).unwrap();
    let offtopic = repo.create_forum(&forum_input(course, "Off-topic")).unwrap();
    let question = repo
        .create_post(
            student,
            &PostInput {
                forum_id: general,
                content: "When is the first lab due?".to_string(),
            },
        )
        .unwrap();
    repo.create_post(
        professor,
        &PostInput {
            forum_id: offtopic,
            content: "Welcome!".to_string(),
        },
    )
    .unwrap();

    let loaded = repo.get_post(question).unwrap().unwrap();
    assert_eq!(loaded.user_id, student);
    assert_eq!(loaded.author, "sam");

    let in_general = repo.list_posts(Some(general)).unwrap();
    assert_eq!(in_general.len(), 1);
    assert_eq!(in_general[0].id, question);
    assert_eq!(repo.list_posts(None).unwrap().len(), 2);

    repo.update_post(question, "When is lab 1 due?").unwrap();
    assert_eq!(
        repo.get_post(question).unwrap().unwrap().content,
        "When is lab 1 due?"
    );
}

#[test]
fn deleting_forum_removes_its_posts() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let course = add_course(&conn, professor, "Rust");
    let repo = SqliteForumRepository::new(&conn);
    let forum = repo.create_forum(&forum_input(course, "General")).unwrap();
    let post = repo
        .create_post(
            professor,
            &PostInput {
                forum_id: forum,
                content: "hello".to_string(),
            },
        )
        .unwrap();

    repo.delete_forum(forum).unwrap();

    assert!(repo.get_post(post).unwrap().is_none());
    assert!(matches!(
        repo.delete_forum(forum).unwrap_err(),
        RepoError::NotFound { entity: "forum", .. }
    ));
}

#[test]
fn post_into_missing_forum_reports_reference() {
    let conn = open_db_in_memory().unwrap();
    let student = add_user(&conn, "sam", Role::Student);

    let err = SqliteForumRepository::new(&conn)
        .create_post(
            student,
            &PostInput {
                forum_id: 12,
                content: "anyone?".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingReference { entity: "forum", id: 12 }
    ));
}

#[test]
fn feedback_is_one_per_enrollment_and_rating_is_bounded() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let student = add_user(&conn, "sam", Role::Student);
    let course = add_course(&conn, professor, "Rust");
    let enrollment = SqliteEnrollmentRepository::new(&conn)
        .enroll(student, course)
        .unwrap();
    let repo = SqliteFeedbackRepository::new(&conn);

    let err = repo
        .create_feedback(course, enrollment, 6, "too good")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::RatingOutOfRange(6))
    ));

    let id = repo
        .create_feedback(course, enrollment, 4, "solid labs")
        .unwrap();
    let err = repo
        .create_feedback(course, enrollment, 5, "again")
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    repo.update_feedback(id, 5, "great labs").unwrap();
    let loaded = repo.get_feedback(id).unwrap().unwrap();
    assert_eq!(loaded.rating, 5);
    assert_eq!(loaded.comment, "great labs");
    assert_eq!(repo.list_feedback(Some(course)).unwrap().len(), 1);
}

#[test]
fn feedback_enrollment_must_match_course() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let student = add_user(&conn, "sam", Role::Student);
    let rust = add_course(&conn, professor, "Rust");
    let go = add_course(&conn, professor, "Go");
    let enrollment = SqliteEnrollmentRepository::new(&conn)
        .enroll(student, rust)
        .unwrap();

    let err = SqliteFeedbackRepository::new(&conn)
        .create_feedback(go, enrollment, 3, "")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::CourseMismatch {
            field: "enrollment",
            ..
        })
    ));
}

fn forum_input(course_id: CourseId, title: &str) -> ForumInput {
    ForumInput {
        course_id,
        title: title.to_string(),
        description: String::new(),
    }
}

fn add_course(conn: &Connection, professor_id: UserId, name: &str) -> CourseId {
    SqliteCourseRepository::new(conn)
        .create_course(&CourseInput {
            name: name.to_string(),
            description: String::new(),
            professor_id,
            start_date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
            categories: Vec::new(),
        })
        .unwrap()
}

fn add_user(conn: &Connection, username: &str, role: Role) -> UserId {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            username: username.to_string(),
            email: String::new(),
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .unwrap()
}
