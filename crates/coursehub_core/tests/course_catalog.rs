use chrono::NaiveDate;
use coursehub_core::db::open_db_in_memory;
use coursehub_core::model::course::CourseInput;
use coursehub_core::model::{CategoryId, UserId};
use coursehub_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use coursehub_core::repo::course_repo::{CourseListQuery, CourseRepository, SqliteCourseRepository};
use coursehub_core::repo::enrollment_repo::{
    EnrollmentListQuery, EnrollmentRepository, SqliteEnrollmentRepository,
};
use coursehub_core::repo::user_repo::{NewUser, SqliteUserRepository, UserRepository};
use coursehub_core::{RepoError, Role, ValidationError};
use rusqlite::Connection;

#[test]
fn create_and_get_course_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let web = add_category(&conn, "web_development");
    let design = add_category(&conn, "design");
    let repo = SqliteCourseRepository::new(&conn);

    let id = repo
        .create_course(&course_input("Rust for the Web", professor, &[web, design, web]))
        .unwrap();

    let loaded = repo.get_course(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Rust for the Web");
    assert_eq!(loaded.professor_id, professor);
    assert_eq!(loaded.start_date, date(2024, 1, 8));
    assert_eq!(loaded.end_date, date(2024, 3, 29));
    let mut expected = vec![web, design];
    expected.sort_unstable();
    assert_eq!(loaded.categories, expected);
}

#[test]
fn update_replaces_fields_and_category_set() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let web = add_category(&conn, "web_development");
    let devops = add_category(&conn, "devops");
    let repo = SqliteCourseRepository::new(&conn);
    let id = repo
        .create_course(&course_input("Draft", professor, &[web]))
        .unwrap();

    let mut input = course_input("Shipping Services", professor, &[devops]);
    input.description = "containers and pipelines".to_string();
    repo.update_course(id, &input).unwrap();

    let loaded = repo.get_course(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Shipping Services");
    assert_eq!(loaded.description, "containers and pipelines");
    assert_eq!(loaded.categories, vec![devops]);
}

#[test]
fn course_owner_must_be_an_existing_professor() {
    let conn = open_db_in_memory().unwrap();
    let student = add_user(&conn, "sam", Role::Student);
    let repo = SqliteCourseRepository::new(&conn);

    let err = repo
        .create_course(&course_input("Nope", student, &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NotAProfessor(id)) if id == student
    ));

    let err = repo
        .create_course(&course_input("Nope", 9_999, &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingReference { entity: "user", id: 9_999 }
    ));
}

#[test]
fn invalid_course_input_is_rejected_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let repo = SqliteCourseRepository::new(&conn);

    let mut backwards = course_input("Backwards", professor, &[]);
    backwards.end_date = date(2023, 12, 1);
    assert!(matches!(
        repo.create_course(&backwards).unwrap_err(),
        RepoError::Validation(ValidationError::DateRange { .. })
    ));

    let err = repo
        .create_course(&course_input("Tagged", professor, &[404]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingReference { entity: "category", id: 404 }
    ));

    assert!(repo
        .list_courses(&CourseListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn list_courses_filters_by_professor_and_category() {
    let conn = open_db_in_memory().unwrap();
    let ada = add_user(&conn, "ada", Role::Professor);
    let alan = add_user(&conn, "alan", Role::Professor);
    let web = add_category(&conn, "web_development");
    let ai = add_category(&conn, "artificial_intelligence");
    let repo = SqliteCourseRepository::new(&conn);

    let first = repo.create_course(&course_input("A", ada, &[web])).unwrap();
    let second = repo.create_course(&course_input("B", alan, &[ai])).unwrap();
    let third = repo
        .create_course(&course_input("C", ada, &[web, ai]))
        .unwrap();

    let ids = |query: CourseListQuery| {
        repo.list_courses(&query)
            .unwrap()
            .into_iter()
            .map(|course| course.id)
            .collect::<Vec<_>>()
    };

    assert_eq!(ids(CourseListQuery::default()), vec![first, second, third]);
    assert_eq!(
        ids(CourseListQuery {
            professor_id: Some(ada),
            category_id: None,
        }),
        vec![first, third]
    );
    assert_eq!(
        ids(CourseListQuery {
            professor_id: None,
            category_id: Some(ai),
        }),
        vec![second, third]
    );
}

#[test]
fn delete_missing_course_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    let err = repo.delete_course(77).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "course", id: 77 }));
}

#[test]
fn duplicate_enrollment_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let student = add_user(&conn, "sam", Role::Student);
    let course = SqliteCourseRepository::new(&conn)
        .create_course(&course_input("Intro", professor, &[]))
        .unwrap();
    let repo = SqliteEnrollmentRepository::new(&conn);

    let id = repo.enroll(student, course).unwrap();
    let err = repo.enroll(student, course).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let found = repo.find_enrollment(student, course).unwrap().unwrap();
    assert_eq!(found.id, id);
    assert_eq!(
        repo.list_enrollments(&EnrollmentListQuery {
            user_id: Some(student),
            course_id: None,
        })
        .unwrap()
        .len(),
        1
    );
}

#[test]
fn enrolling_into_missing_course_reports_reference() {
    let conn = open_db_in_memory().unwrap();
    let student = add_user(&conn, "sam", Role::Student);
    let repo = SqliteEnrollmentRepository::new(&conn);

    let err = repo.enroll(student, 31).unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingReference { entity: "course", id: 31 }
    ));
}

#[test]
fn deleting_course_cascades_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let student = add_user(&conn, "sam", Role::Student);
    let courses = SqliteCourseRepository::new(&conn);
    let course = courses
        .create_course(&course_input("Intro", professor, &[]))
        .unwrap();
    let enrollments = SqliteEnrollmentRepository::new(&conn);
    let enrollment = enrollments.enroll(student, course).unwrap();

    courses.delete_course(course).unwrap();

    assert!(enrollments.get_enrollment(enrollment).unwrap().is_none());
}

#[test]
fn deleting_professor_cascades_owned_courses() {
    let conn = open_db_in_memory().unwrap();
    let professor = add_user(&conn, "ada", Role::Professor);
    let courses = SqliteCourseRepository::new(&conn);
    let course = courses
        .create_course(&course_input("Intro", professor, &[]))
        .unwrap();

    SqliteUserRepository::new(&conn)
        .delete_user(professor)
        .unwrap();

    assert!(courses.get_course(course).unwrap().is_none());
}

#[test]
fn category_names_are_unique_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::new(&conn);

    let first = repo.ensure_category("devops").unwrap();
    let again = repo.ensure_category("DevOps").unwrap();

    assert_eq!(first, again);
    assert_eq!(repo.list_categories().unwrap().len(), 1);
}

fn add_user(conn: &Connection, username: &str, role: Role) -> UserId {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .unwrap()
}

fn add_category(conn: &Connection, name: &str) -> CategoryId {
    SqliteCategoryRepository::new(conn)
        .ensure_category(name)
        .unwrap()
}

fn course_input(name: &str, professor_id: UserId, categories: &[CategoryId]) -> CourseInput {
    CourseInput {
        name: name.to_string(),
        description: String::new(),
        professor_id,
        start_date: date(2024, 1, 8),
        end_date: date(2024, 3, 29),
        categories: categories.to_vec(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
