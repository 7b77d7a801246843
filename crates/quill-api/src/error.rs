use axum::extract::rejection::{FormRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use quill_types::models::PostId;

/// Errors that end a request with an error page. Inline problems (bad form
/// input, wrong credentials) never get here; handlers re-render for those.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Post id {0} does not exist.")]
    NotFound(PostId),

    #[error("The requested page does not exist.")]
    PageNotFound,

    #[error("You do not have permission to change this post.")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// What the user is told about a failed request. Attached to the response so
/// [`crate::middleware::render_error_page`] can render it as HTML.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorPage {
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Error")
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::PageNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

// A post id that is not a number can never name a post.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!(reason = %rejection.body_text(), "Unroutable path parameter");
        Self::PageNotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Template(e) => {
                error!("Template rendering failed: {:#}", e);
                "The page could not be rendered.".to_string()
            }
            Self::Internal(e) => {
                error!("Request failed: {:#}", e);
                "Something went wrong on our side.".to_string()
            }
            other => other.to_string(),
        };
        let page = ErrorPage {
            status: self.status(),
            message,
        };

        // Plain text until the error page layer replaces it.
        let fallback = format!("{} {}\n\n{}\n", page.status.as_u16(), page.reason(), page.message);
        let mut response = (page.status, fallback).into_response();
        response.extensions_mut().insert(page);
        response
    }
}
