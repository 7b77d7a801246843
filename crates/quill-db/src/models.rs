//! Database row types: these map directly to SQLite rows.
//! Distinct from quill-types models so the password hash never leaves this crate
//! by accident.

use quill_types::models::{Post, User};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
        }
    }
}

/// A post joined with `user.username`.
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created: chrono::NaiveDateTime,
    pub author_id: i64,
    pub username: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            body: row.body,
            created: row.created,
            author_id: row.author_id,
            username: row.username,
        }
    }
}
