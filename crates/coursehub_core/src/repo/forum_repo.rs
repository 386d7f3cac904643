//! Forum and post persistence.

use super::{ensure_exists, expect_changed, RepoResult};
use crate::model::forum::{Forum, ForumInput, Post, PostInput};
use crate::model::{require_text, CourseId, ForumId, PostId, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FORUM_SELECT_SQL: &str =
    "SELECT id, course_id, title, description, created_at FROM forums";

const POST_SELECT_SQL: &str = "SELECT
    p.id,
    p.forum_id,
    p.user_id,
    u.username AS author,
    p.content,
    p.created_at
FROM posts p
INNER JOIN users u ON u.id = p.user_id";

pub trait ForumRepository {
    fn create_forum(&self, input: &ForumInput) -> RepoResult<ForumId>;
    fn update_forum(&self, id: ForumId, input: &ForumInput) -> RepoResult<()>;
    fn get_forum(&self, id: ForumId) -> RepoResult<Option<Forum>>;
    fn list_forums(&self, course_id: Option<CourseId>) -> RepoResult<Vec<Forum>>;
    /// Deletes the forum together with its posts.
    fn delete_forum(&self, id: ForumId) -> RepoResult<()>;

    fn create_post(&self, author: UserId, input: &PostInput) -> RepoResult<PostId>;
    /// Replaces post content. The author and forum never change.
    fn update_post(&self, id: PostId, content: &str) -> RepoResult<()>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Lists posts oldest first.
    fn list_posts(&self, forum_id: Option<ForumId>) -> RepoResult<Vec<Post>>;
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
}

pub struct SqliteForumRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteForumRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ForumRepository for SqliteForumRepository<'_> {
    fn create_forum(&self, input: &ForumInput) -> RepoResult<ForumId> {
        input.validate()?;
        ensure_exists(self.conn, "courses", "course", input.course_id)?;

        self.conn.execute(
            "INSERT INTO forums (course_id, title, description) VALUES (?1, ?2, ?3);",
            params![
                input.course_id,
                input.title.trim(),
                input.description.as_str()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_forum(&self, id: ForumId, input: &ForumInput) -> RepoResult<()> {
        input.validate()?;
        ensure_exists(self.conn, "courses", "course", input.course_id)?;

        let changed = self.conn.execute(
            "UPDATE forums SET course_id = ?2, title = ?3, description = ?4 WHERE id = ?1;",
            params![
                id,
                input.course_id,
                input.title.trim(),
                input.description.as_str()
            ],
        )?;
        expect_changed(changed, "forum", id)
    }

    fn get_forum(&self, id: ForumId) -> RepoResult<Option<Forum>> {
        let forum = self
            .conn
            .query_row(
                &format!("{FORUM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_forum_row,
            )
            .optional()?;
        Ok(forum)
    }

    fn list_forums(&self, course_id: Option<CourseId>) -> RepoResult<Vec<Forum>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FORUM_SELECT_SQL}
             WHERE (?1 IS NULL OR course_id = ?1)
             ORDER BY id ASC;"
        ))?;
        let forums = stmt
            .query_map([course_id], parse_forum_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(forums)
    }

    fn delete_forum(&self, id: ForumId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM forums WHERE id = ?1;", [id])?;
        expect_changed(changed, "forum", id)
    }

    fn create_post(&self, author: UserId, input: &PostInput) -> RepoResult<PostId> {
        input.validate()?;
        ensure_exists(self.conn, "forums", "forum", input.forum_id)?;
        ensure_exists(self.conn, "users", "user", author)?;

        self.conn.execute(
            "INSERT INTO posts (forum_id, user_id, content) VALUES (?1, ?2, ?3);",
            params![input.forum_id, author, input.content.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_post(&self, id: PostId, content: &str) -> RepoResult<()> {
        require_text("content", content, None)?;
        let changed = self.conn.execute(
            "UPDATE posts SET content = ?2 WHERE id = ?1;",
            params![id, content],
        )?;
        expect_changed(changed, "post", id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let post = self
            .conn
            .query_row(
                &format!("{POST_SELECT_SQL} WHERE p.id = ?1;"),
                [id],
                parse_post_row,
            )
            .optional()?;
        Ok(post)
    }

    fn list_posts(&self, forum_id: Option<ForumId>) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE (?1 IS NULL OR p.forum_id = ?1)
             ORDER BY p.created_at ASC, p.id ASC;"
        ))?;
        let posts = stmt
            .query_map([forum_id], parse_post_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        expect_changed(changed, "post", id)
    }
}

fn parse_forum_row(row: &Row<'_>) -> rusqlite::Result<Forum> {
    Ok(Forum {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_post_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get("id")?,
        forum_id: row.get("forum_id")?,
        user_id: row.get("user_id")?,
        author: row.get("author")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
