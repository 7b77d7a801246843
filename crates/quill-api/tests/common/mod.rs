#![allow(dead_code)]

use std::sync::LazyLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use quill_api::password::hash_password;
use quill_api::router::router;
use quill_api::session::SESSION_COOKIE;
use quill_api::state::AppState;
use quill_db::Database;

pub const SECRET: &str = "test-secret";

// Argon2 is slow in debug builds; hash the fixture passwords once per binary.
static TEST_HASH: LazyLock<String> = LazyLock::new(|| hash_password("test").unwrap());
static OTHER_HASH: LazyLock<String> = LazyLock::new(|| hash_password("other").unwrap());

/// Fresh in-memory database with two users (`test`/`test` id 1,
/// `other`/`other` id 2) and one post by `test`.
pub fn seeded_state() -> AppState {
    let db = Database::open_in_memory().unwrap();
    db.with_conn_mut(|conn| {
        conn.execute(
            "INSERT INTO user (username, password) VALUES ('test', ?1), ('other', ?2)",
            [TEST_HASH.as_str(), OTHER_HASH.as_str()],
        )?;
        conn.execute(
            "INSERT INTO post (title, body, author_id, created)
             VALUES ('test title', 'test' || char(10) || 'body', 1, '2018-01-01 00:00:00')",
            [],
        )?;
        Ok(())
    })
    .unwrap();
    AppState::new(db, SECRET).unwrap()
}

/// No users, no posts.
pub fn empty_state() -> AppState {
    AppState::new(Database::open_in_memory().unwrap(), SECRET).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

/// Minimal browser: remembers the session cookie between requests.
pub struct TestClient {
    app: Router,
    pub state: AppState,
    pub cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_state(seeded_state())
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            app: router(state.clone()),
            state,
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let req = self.request(Method::GET, path).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = self
            .request(Method::POST, path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// POST without any body or content type.
    pub async fn post_empty(&mut self, path: &str) -> TestResponse {
        let req = self.request(Method::POST, path).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/auth/register", &[("username", username), ("password", password)])
            .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/auth/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn logout(&mut self) -> TestResponse {
        self.get("/auth/logout").await
    }

    fn request(&self, method: Method, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(req).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        let prefix = format!("{}=", SESSION_COOKIE);
        for value in &set_cookies {
            let pair = value.split(';').next().unwrap().trim();
            if let Some(rest) = pair.strip_prefix(&prefix) {
                self.cookie = if rest.is_empty() {
                    None
                } else {
                    Some(pair.to_string())
                };
            }
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            location,
            content_type,
            set_cookies,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
