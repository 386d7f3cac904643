//! Access policy declarations and evaluation.

use crate::model::user::{Role, User};
use crate::model::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller owns `user_id` or is an admin.
    pub fn owns_or_admin(&self, user_id: UserId) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Kind of operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    /// `GET`, `HEAD` and `OPTIONS` read; every other method writes.
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" | "HEAD" | "OPTIONS" => Self::Read,
            _ => Self::Write,
        }
    }
}

/// Named access rule attached to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessPolicy {
    AllowAny,
    Authenticated,
    AdminOnly,
    AdminOrProfessorOrReadOnly,
    ProfessorOrReadOnly,
    ReadOnlyForStudents,
    StudentOnly,
}

impl AccessPolicy {
    /// Stable id used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowAny => "allow_any",
            Self::Authenticated => "authenticated",
            Self::AdminOnly => "admin_only",
            Self::AdminOrProfessorOrReadOnly => "admin_or_professor_or_read_only",
            Self::ProfessorOrReadOnly => "professor_or_read_only",
            Self::ReadOnlyForStudents => "read_only_for_students",
            Self::StudentOnly => "student_only",
        }
    }

    /// Evaluates the policy for one caller and action.
    pub fn check(self, principal: Option<&Principal>, action: Action) -> Result<(), AccessError> {
        let role = principal.map(|p| p.role);
        let allowed = match (self, action) {
            (Self::AllowAny, _) => true,
            (Self::AdminOrProfessorOrReadOnly | Self::ReadOnlyForStudents, Action::Read) => true,
            (Self::Authenticated, _) | (Self::ProfessorOrReadOnly, Action::Read) => {
                role.is_some()
            }
            (Self::AdminOnly, _) => role == Some(Role::Admin),
            (
                Self::AdminOrProfessorOrReadOnly
                | Self::ProfessorOrReadOnly
                | Self::ReadOnlyForStudents,
                Action::Write,
            ) => matches!(role, Some(Role::Admin | Role::Professor)),
            (Self::StudentOnly, _) => role == Some(Role::Student),
        };

        if allowed {
            Ok(())
        } else if principal.is_none() {
            Err(AccessError::Unauthenticated)
        } else {
            Err(AccessError::Forbidden(self))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    Unauthenticated,
    Forbidden(AccessPolicy),
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Authentication credentials were not provided."),
            Self::Forbidden(_) => write!(f, "You do not have permission to perform this action."),
        }
    }
}

impl Error for AccessError {}
