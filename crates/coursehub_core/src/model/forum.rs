//! Course forums and their posts.

use super::{require_text, CourseId, ForumId, PostId, UserId, ValidationError};
use serde::{Deserialize, Serialize};

const FORUM_TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Forum {
    pub id: ForumId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForumInput {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl ForumInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, Some(FORUM_TITLE_MAX_CHARS))
    }
}

/// Forum post. `author` is the username, resolved on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub forum_id: ForumId,
    pub user_id: UserId,
    pub author: String,
    pub content: String,
    pub created_at: i64,
}

/// Post payload; the author is always the calling user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostInput {
    pub forum_id: ForumId,
    pub content: String,
}

impl PostInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("content", &self.content, None)
    }
}
