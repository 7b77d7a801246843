use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use minijinja::context;
use tracing::{debug, error, warn};

use quill_types::models::User;

use crate::error::{AppError, ErrorPage};
use crate::session::{self, SESSION_COOKIE, Session};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/auth/login";

/// Who is making this request, if anyone. Resolved once per request by
/// [`load_current_user`] and read from the request extensions afterwards.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Present only on requests that passed [`require_login`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Resolve the session's user before any handler runs.
///
/// A session pointing at a user that no longer exists is treated as anonymous
/// and the stale cookie is cleared on the way out.
pub async fn load_current_user(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = Session::from_jar(&jar);

    let (user, stale) = match session.user_id {
        None => (None, false),
        Some(user_id) => match state.db.get_user_by_id(user_id)? {
            Some(row) => (Some(User::from(row)), false),
            None => {
                warn!(user_id, "Session refers to a missing user, clearing it");
                (None, true)
            }
        },
    };

    req.extensions_mut().insert(CurrentUser(user));
    let response = next.run(req).await;

    // A handler that set a fresh session (login) wins over the cleanup.
    if stale && !sets_session_cookie(&response) {
        return Ok((session::end(jar), response).into_response());
    }
    Ok(response)
}

/// Gate for protected routes: anonymous callers are redirected to the login
/// page and the handler never runs.
pub async fn require_login(mut req: Request, next: Next) -> Response {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone());

    match user {
        Some(user) => {
            req.extensions_mut().insert(AuthUser(user));
            next.run(req).await
        }
        None => {
            debug!(path = %req.uri().path(), "Login required, redirecting");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// Turn an [`ErrorPage`] left by a failed handler into the HTML error page,
/// keeping its status and headers. If rendering fails the plain-text body
/// stays.
pub async fn render_error_page(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone());

    let response = next.run(req).await;
    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let rendered = state.templates.render(
        "error.html",
        context! {
            user => user,
            status => page.status.as_u16(),
            reason => page.reason(),
            message => page.message,
        },
    );
    let html = match rendered {
        Ok(html) => html,
        Err(e) => {
            error!(status = page.status.as_u16(), "Error page rendering failed: {:#}", e);
            return response;
        }
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|value| value.as_bytes().starts_with(prefix.as_bytes()))
}
