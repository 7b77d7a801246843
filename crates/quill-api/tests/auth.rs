mod common;

use axum::http::StatusCode;
use common::TestClient;

#[tokio::test]
async fn register_redirects_to_login() {
    let mut client = TestClient::new();
    assert_eq!(client.get("/auth/register").await.status, StatusCode::OK);

    let response = client.register("a", "a").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/auth/login"));
    // No auto-login.
    assert!(client.cookie.is_none());

    let row = client.state.db.get_user_by_username("a").unwrap();
    assert!(row.is_some());
}

#[tokio::test]
async fn register_validates_input() {
    let cases = [
        ("", "", "Username is required."),
        ("a", "", "Password is required."),
        ("test", "test", "already registered"),
    ];

    for (username, password, message) in cases {
        let mut client = TestClient::new();
        let response = client.register(username, password).await;
        assert_eq!(response.status, StatusCode::OK, "{username}/{password}");
        assert!(response.body.contains(message), "{message}");
    }
}

#[tokio::test]
async fn undecodable_credentials_are_a_bad_request() {
    let mut client = TestClient::new();
    for path in ["/auth/register", "/auth/login"] {
        let response = client.post_empty(path).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert!(response.body.contains("400 Bad Request"), "{path}");
    }
    assert!(client.cookie.is_none());
}

#[tokio::test]
async fn login_sets_the_session() {
    let mut client = TestClient::new();
    assert_eq!(client.get("/auth/login").await.status, StatusCode::OK);

    let response = client.login("test", "test").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(client.cookie.is_some());

    // The next request is made as `test`.
    let index = client.get("/").await;
    assert!(index.body.contains("Log Out"));
    assert!(index.body.contains("<span>test</span>"));
}

#[tokio::test]
async fn login_reports_which_credential_was_wrong() {
    let cases = [("a", "test", "Incorrect username."), ("test", "a", "Incorrect password.")];

    for (username, password, message) in cases {
        let mut client = TestClient::new();
        let response = client.login(username, password).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains(message), "{message}");
        assert!(client.cookie.is_none());
    }
}

#[tokio::test]
async fn logout_clears_the_session() {
    let mut client = TestClient::new();
    client.login("test", "test").await;

    let response = client.logout().await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(client.cookie.is_none());

    let index = client.get("/").await;
    assert!(index.body.contains("Log In"));
    assert!(index.body.contains("Register"));
}

#[tokio::test]
async fn forged_cookie_is_anonymous() {
    let mut client = TestClient::new();
    client.cookie = Some("session=1".to_string());

    let response = client.post_empty("/create").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn session_for_deleted_user_is_dropped() {
    let mut client = TestClient::new();
    client.login("other", "other").await;
    assert!(client.cookie.is_some());

    client
        .state
        .db
        .with_conn_mut(|conn| {
            conn.execute("DELETE FROM user WHERE username = 'other'", [])?;
            Ok(())
        })
        .unwrap();

    let index = client.get("/").await;
    assert_eq!(index.status, StatusCode::OK);
    assert!(index.body.contains("Log In"));
    assert!(index.set_cookies.iter().any(|c| c.starts_with("session=;")));
    assert!(client.cookie.is_none());
}

#[tokio::test]
async fn relogin_over_a_stale_session_keeps_the_new_one() {
    let mut client = TestClient::new();
    client.login("other", "other").await;
    client
        .state
        .db
        .with_conn_mut(|conn| {
            conn.execute("DELETE FROM user WHERE username = 'other'", [])?;
            Ok(())
        })
        .unwrap();

    let response = client.login("test", "test").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(client.cookie.is_some());
    assert!(client.get("/").await.body.contains("<span>test</span>"));
}

#[tokio::test]
async fn hello() {
    let mut client = TestClient::new();
    let response = client.get("/hello").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "Hello, World!");
}
