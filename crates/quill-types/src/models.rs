use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;

/// A registered account as seen outside the store.
/// Carries no credential material: the password hash stays in `quill-db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A post joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub created: NaiveDateTime,
    pub author_id: UserId,
    pub username: String,
}

impl Post {
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}
