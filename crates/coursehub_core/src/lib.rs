//! Core domain logic for CourseHub.
//! This crate is the single source of truth for catalog invariants,
//! access policies and the course-suggestion engine.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{AccessError, AccessPolicy, Action, Principal};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::user::{Role, User, UserSummary};
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{
    check_credentials, prepare_account, prepare_password, AccountError, AccountService,
    CreateAccountRequest,
};
pub use service::bootstrap::{bootstrap, BootstrapReport, SuperuserSeed};
pub use service::suggestion_service::{CourseSuggestion, SuggestionError, SuggestionService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
