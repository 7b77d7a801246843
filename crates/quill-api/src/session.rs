//! Signed cookie sessions.
//!
//! The session lives entirely on the client in one cookie whose value is
//! signed with the application key. A cookie with a bad signature is
//! dropped by the jar and reads as an empty session.

use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use quill_types::models::UserId;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<UserId>,
}

impl Session {
    pub fn from_jar(jar: &SignedCookieJar) -> Self {
        let user_id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse().ok());
        Self { user_id }
    }
}

/// Drop whatever the session held, then bind it to `user_id`.
pub fn start(jar: SignedCookieJar, user_id: UserId) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    end(jar).add(cookie)
}

pub fn end(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
