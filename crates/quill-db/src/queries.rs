use crate::models::{PostRow, UserRow};
use crate::Database;
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::{Connection, ErrorCode, Row};

const POST_COLUMNS: &str = "SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
     FROM post p
     JOIN user u ON p.author_id = u.id";

impl Database {
    // -- Users --

    /// Insert a new account. A taken username surfaces as a UNIQUE constraint
    /// error; check it with [`is_unique_violation`].
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO user (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    // -- Posts --

    /// All posts, newest first. Posts created within the same second keep
    /// insertion order, latest first.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{POST_COLUMNS} ORDER BY p.created DESC, p.id DESC"
            ))?;

            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{POST_COLUMNS} WHERE p.id = ?1"), [id], post_from_row)
                .optional()
        })
    }

    pub fn create_post(&self, author_id: i64, title: &str, body: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO post (title, body, author_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![title, body, author_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Overwrite title and body. Returns false when no row has this id.
    pub fn update_post(&self, id: i64, title: &str, body: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE post SET title = ?1, body = ?2 WHERE id = ?3",
                rusqlite::params![title, body, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false when no row has this id.
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

/// True when `err` came from a UNIQUE constraint rejecting an insert.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn query_user<P: rusqlite::ToSql>(
    conn: &Connection,
    predicate: &str,
    value: P,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, password FROM user WHERE {predicate}"
    ))?;

    stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
        })
    })
    .optional()
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    let created: String = row.get(3)?;
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created: parse_timestamp(&created).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        author_id: row.get(4)?,
        username: row.get(5)?,
    })
}

/// SQLite's CURRENT_TIMESTAMP is "YYYY-MM-DD HH:MM:SS" without timezone.
/// Accept the ISO `T` separator and fractional seconds too.
fn parse_timestamp(value: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
