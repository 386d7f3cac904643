use chrono::NaiveDate;
use coursehub_core::db::open_db_in_memory;
use coursehub_core::model::activity::ActivityInput;
use coursehub_core::model::course::CourseInput;
use coursehub_core::model::grade::GradeInput;
use coursehub_core::model::material::MaterialInput;
use coursehub_core::model::{CourseId, EnrollmentId, MaterialId, UserId};
use coursehub_core::repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
use coursehub_core::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use coursehub_core::repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
use coursehub_core::repo::grade_repo::{GradeListQuery, GradeRepository, SqliteGradeRepository};
use coursehub_core::repo::material_repo::{MaterialRepository, SqliteMaterialRepository};
use coursehub_core::repo::user_repo::{NewUser, SqliteUserRepository, UserRepository};
use coursehub_core::{RepoError, Role, ValidationError};
use rusqlite::Connection;

struct Fixture {
    conn: Connection,
    professor: UserId,
    student: UserId,
}

impl Fixture {
    fn new() -> Self {
        let conn = open_db_in_memory().unwrap();
        let professor = add_user(&conn, "ada", Role::Professor);
        let student = add_user(&conn, "sam", Role::Student);
        Self {
            conn,
            professor,
            student,
        }
    }

    fn course(&self, name: &str) -> CourseId {
        SqliteCourseRepository::new(&self.conn)
            .create_course(&CourseInput {
                name: name.to_string(),
                description: String::new(),
                professor_id: self.professor,
                start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                categories: Vec::new(),
            })
            .unwrap()
    }

    fn material(&self, course_id: CourseId, title: &str) -> MaterialId {
        SqliteMaterialRepository::new(&self.conn)
            .create_material(&MaterialInput {
                course_id,
                title: title.to_string(),
                description: String::new(),
                url: Some(format!("https://files.example.com/{title}.pdf")),
            })
            .unwrap()
    }

    fn enroll(&self, course_id: CourseId) -> EnrollmentId {
        SqliteEnrollmentRepository::new(&self.conn)
            .enroll(self.student, course_id)
            .unwrap()
    }
}

#[test]
fn material_roundtrip_and_course_filter() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");
    let go = fx.course("Go");
    let slides = fx.material(rust, "slides");
    fx.material(go, "handout");
    let repo = SqliteMaterialRepository::new(&fx.conn);

    let loaded = repo.get_material(slides).unwrap().unwrap();
    assert_eq!(loaded.course_id, rust);
    assert_eq!(loaded.title, "slides");
    assert_eq!(
        loaded.url.as_deref(),
        Some("https://files.example.com/slides.pdf")
    );

    let listed = repo.list_materials(Some(rust)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, slides);
    assert_eq!(repo.list_materials(None).unwrap().len(), 2);
}

#[test]
fn material_requires_title() {
    let fx = Fixture::new();
    let course = fx.course("Rust");

    let err = SqliteMaterialRepository::new(&fx.conn)
        .create_material(&MaterialInput {
            course_id: course,
            title: "   ".to_string(),
            description: String::new(),
            url: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyField("title"))
    ));
}

#[test]
fn activity_links_only_materials_of_its_course() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");
    let go = fx.course("Go");
    let own = fx.material(rust, "ownership");
    let foreign = fx.material(go, "goroutines");
    let repo = SqliteActivityRepository::new(&fx.conn);

    let id = repo
        .create_activity(&activity_input(rust, "Borrowing quiz", &[own, own]))
        .unwrap();
    let loaded = repo.get_activity(id).unwrap().unwrap();
    assert_eq!(loaded.materials, vec![own]);
    assert_eq!(
        loaded.due_date,
        Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    );

    let err = repo
        .create_activity(&activity_input(rust, "Mixed", &[own, foreign]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::CourseMismatch {
            field: "material",
            ..
        })
    ));
}

#[test]
fn moving_material_drops_links_from_old_course_activities() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");
    let go = fx.course("Go");
    let notes = fx.material(rust, "notes");
    let activities = SqliteActivityRepository::new(&fx.conn);
    let activity = activities
        .create_activity(&activity_input(rust, "Lab", &[notes]))
        .unwrap();

    SqliteMaterialRepository::new(&fx.conn)
        .update_material(
            notes,
            &MaterialInput {
                course_id: go,
                title: "notes".to_string(),
                description: String::new(),
                url: None,
            },
        )
        .unwrap();

    let loaded = activities.get_activity(activity).unwrap().unwrap();
    assert!(loaded.materials.is_empty());
}

#[test]
fn update_missing_activity_returns_not_found() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");

    let err = SqliteActivityRepository::new(&fx.conn)
        .update_activity(55, &activity_input(rust, "Ghost", &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "activity",
            id: 55
        }
    ));
}

#[test]
fn graded_activity_cannot_move_course() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");
    let go = fx.course("Go");
    let enrollment = fx.enroll(rust);
    let activities = SqliteActivityRepository::new(&fx.conn);
    let activity = activities
        .create_activity(&activity_input(rust, "Exam", &[]))
        .unwrap();
    SqliteGradeRepository::new(&fx.conn)
        .create_grade(&grade_input(enrollment, activity, 88.5))
        .unwrap();

    let err = activities
        .update_activity(activity, &activity_input(go, "Exam", &[]))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    activities
        .update_activity(activity, &activity_input(rust, "Final exam", &[]))
        .unwrap();
    let loaded = activities.get_activity(activity).unwrap().unwrap();
    assert_eq!(loaded.title, "Final exam");
}

#[test]
fn grade_crud_and_uniqueness() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");
    let enrollment = fx.enroll(rust);
    let activity = SqliteActivityRepository::new(&fx.conn)
        .create_activity(&activity_input(rust, "Exam", &[]))
        .unwrap();
    let repo = SqliteGradeRepository::new(&fx.conn);

    let id = repo
        .create_grade(&grade_input(enrollment, activity, 72.0))
        .unwrap();
    let err = repo
        .create_grade(&grade_input(enrollment, activity, 90.0))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    repo.update_grade(id, &grade_input(enrollment, activity, 95.0))
        .unwrap();
    let loaded = repo.get_grade(id).unwrap().unwrap();
    assert_eq!(loaded.score, 95.0);

    let listed = repo
        .list_grades(&GradeListQuery {
            enrollment_id: Some(enrollment),
            activity_id: None,
        })
        .unwrap();
    assert_eq!(listed.len(), 1);

    repo.delete_grade(id).unwrap();
    assert!(repo.get_grade(id).unwrap().is_none());
}

#[test]
fn grade_score_and_course_are_checked() {
    let fx = Fixture::new();
    let rust = fx.course("Rust");
    let go = fx.course("Go");
    let enrollment = fx.enroll(rust);
    let go_activity = SqliteActivityRepository::new(&fx.conn)
        .create_activity(&activity_input(go, "Go exam", &[]))
        .unwrap();
    let repo = SqliteGradeRepository::new(&fx.conn);

    let err = repo
        .create_grade(&grade_input(enrollment, go_activity, 101.0))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::ScoreOutOfRange(_))
    ));

    let err = repo
        .create_grade(&grade_input(enrollment, go_activity, 50.0))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::CourseMismatch {
            field: "activity",
            ..
        })
    ));
}

fn activity_input(course_id: CourseId, title: &str, materials: &[MaterialId]) -> ActivityInput {
    ActivityInput {
        course_id,
        title: title.to_string(),
        description: String::new(),
        due_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        materials: materials.to_vec(),
    }
}

fn grade_input(enrollment_id: EnrollmentId, activity_id: i64, score: f64) -> GradeInput {
    GradeInput {
        enrollment_id,
        activity_id,
        score,
        comment: String::new(),
    }
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
