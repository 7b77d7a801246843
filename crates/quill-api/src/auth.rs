use std::fmt;

use axum::{
    Extension, Form,
    extract::{State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use minijinja::context;
use thiserror::Error;
use tracing::{info, warn};

use quill_db::{Database, is_unique_violation};
use quill_types::forms::CredentialsForm;
use quill_types::models::{User, UserId};

use crate::error::AppError;
use crate::middleware::{CurrentUser, LOGIN_PATH};
use crate::password::{hash_password, verify_password};
use crate::session;
use crate::state::{AppState, blocking};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Username => "Username",
            Self::Password => "Password",
        })
    }
}

/// Why registration or login was refused. Everything except `Store` is shown
/// to the user inline on the form.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required.")]
    MissingField(Field),

    #[error("User {0} is already registered.")]
    UsernameTaken(String),

    #[error("Incorrect username.")]
    UnknownUser,

    #[error("Incorrect password.")]
    BadPassword,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

// -- Credential store --

/// Create an account. Does not log the new user in.
pub fn register(db: &Database, username: &str, password: &str) -> Result<UserId, AuthError> {
    if username.is_empty() {
        return Err(AuthError::MissingField(Field::Username));
    }
    if password.is_empty() {
        return Err(AuthError::MissingField(Field::Password));
    }

    let password_hash = hash_password(password)?;

    db.create_user(username, &password_hash).map_err(|e| {
        if is_unique_violation(&e) {
            AuthError::UsernameTaken(username.to_string())
        } else {
            AuthError::Store(e)
        }
    })
}

/// Check a username/password pair. The returned record carries no hash.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<User, AuthError> {
    let row = db
        .get_user_by_username(username)?
        .ok_or(AuthError::UnknownUser)?;

    if !verify_password(password, &row.password)? {
        return Err(AuthError::BadPassword);
    }

    Ok(User::from(row))
}

// -- Handlers --

pub async fn register_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    render_form(&state, "auth/register.html", &current, "", None)
}

pub async fn register_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let db = state.db.clone();
    let username = form.username.clone();
    let outcome = blocking(move || register(&db, &form.username, &form.password)).await?;

    match outcome {
        Ok(user_id) => {
            info!(user_id, username = %username, "User registered");
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(AuthError::Store(e)) => Err(e.into()),
        Err(err) => {
            let page = render_form(&state, "auth/register.html", &current, &username, Some(&err))?;
            Ok(page.into_response())
        }
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    render_form(&state, "auth/login.html", &current, "", None)
}

pub async fn login_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: SignedCookieJar,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let db = state.db.clone();
    let username = form.username.clone();
    let outcome = blocking(move || authenticate(&db, &form.username, &form.password)).await?;

    match outcome {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "User logged in");
            Ok((session::start(jar, user.id), Redirect::to("/")).into_response())
        }
        Err(AuthError::Store(e)) => Err(e.into()),
        Err(err) => {
            warn!(username = %username, reason = %err, "Login rejected");
            let page = render_form(&state, "auth/login.html", &current, &username, Some(&err))?;
            Ok(page.into_response())
        }
    }
}

pub async fn logout(
    Extension(current): Extension<CurrentUser>,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    if let Some(user) = current.0 {
        info!(user_id = user.id, "User logged out");
    }
    (session::end(jar), Redirect::to("/"))
}

fn render_form(
    state: &AppState,
    template: &str,
    current: &CurrentUser,
    username: &str,
    error: Option<&AuthError>,
) -> Result<Html<String>, AppError> {
    let html = state.templates.render(
        template,
        context! {
            user => current.0,
            username => username,
            error => error.map(ToString::to_string),
        },
    )?;
    Ok(Html(html))
}
