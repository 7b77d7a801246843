use axum::{
    Extension, Form,
    extract::{
        Path, State,
        rejection::{FormRejection, PathRejection},
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;
use thiserror::Error;
use tracing::{info, warn};

use quill_db::Database;
use quill_types::forms::PostForm;
use quill_types::models::{Post, PostId, User};

use crate::error::AppError;
use crate::middleware::{AuthUser, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("Post id {0} does not exist.")]
    NotFound(PostId),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(id) => AppError::NotFound(id),
            PostError::Store(e) => AppError::Internal(e),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

// -- Repository --

/// Every post with its author's name, newest first.
pub fn list_posts(db: &Database) -> anyhow::Result<Vec<Post>> {
    Ok(db.list_posts()?.into_iter().map(Post::from).collect())
}

/// Fetch a post for display or modification.
///
/// With `check_author` set, the post must belong to `user`; an anonymous
/// caller never passes that check.
pub fn get_post(
    db: &Database,
    id: PostId,
    user: Option<&User>,
    check_author: bool,
) -> Result<Post, AppError> {
    let post = db.get_post(id)?.map(Post::from).ok_or(AppError::NotFound(id))?;

    if check_author && !user.is_some_and(|user| post.is_authored_by(user)) {
        warn!(
            post_id = id,
            author_id = post.author_id,
            user_id = user.map(|u| u.id),
            "Rejected change to someone else's post"
        );
        return Err(AppError::Forbidden);
    }

    Ok(post)
}

pub fn create_post(db: &Database, author: &User, form: &PostForm) -> Result<PostId, PostError> {
    validate(form)?;
    Ok(db.create_post(author.id, &form.title, &form.body)?)
}

/// `post` must come from [`get_post`] with the author check enabled.
pub fn update_post(db: &Database, post: &Post, form: &PostForm) -> Result<(), PostError> {
    validate(form)?;
    if !db.update_post(post.id, &form.title, &form.body)? {
        return Err(PostError::NotFound(post.id));
    }
    Ok(())
}

/// `post` must come from [`get_post`] with the author check enabled.
pub fn delete_post(db: &Database, post: &Post) -> Result<(), PostError> {
    if !db.delete_post(post.id)? {
        return Err(PostError::NotFound(post.id));
    }
    Ok(())
}

fn validate(form: &PostForm) -> Result<(), PostError> {
    if form.title.is_empty() {
        return Err(PostError::MissingTitle);
    }
    Ok(())
}

// -- Handlers --

pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let posts = list_posts(&state.db)?;
    let html = state.templates.render(
        "blog/index.html",
        context! { user => current.0, posts => posts },
    )?;
    Ok(Html(html))
}

pub async fn create_page(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Html<String>, AppError> {
    render_editor(&state, "blog/create.html", &user, None, &PostForm::default(), None)
}

pub async fn create_submit(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;

    match create_post(&state.db, &user, &form) {
        Ok(post_id) => {
            info!(post_id, author_id = user.id, "Post created");
            Ok(Redirect::to("/").into_response())
        }
        Err(err @ PostError::MissingTitle) => {
            render_editor(&state, "blog/create.html", &user, None, &form, Some(&err))
                .map(IntoResponse::into_response)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn update_page(
    State(state): State<AppState>,
    path: Result<Path<PostId>, PathRejection>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Html<String>, AppError> {
    let Path(id) = path?;
    let post = get_post(&state.db, id, Some(&user), true)?;
    let form = PostForm {
        title: post.title.clone(),
        body: post.body.clone(),
    };
    render_editor(&state, "blog/update.html", &user, Some(&post), &form, None)
}

pub async fn update_submit(
    State(state): State<AppState>,
    path: Result<Path<PostId>, PathRejection>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    // Existence and ownership come before anything in the body.
    let post = get_post(&state.db, id, Some(&user), true)?;
    let Form(form) = form?;

    match update_post(&state.db, &post, &form) {
        Ok(()) => {
            info!(post_id = id, author_id = user.id, "Post updated");
            Ok(Redirect::to("/").into_response())
        }
        Err(err @ PostError::MissingTitle) => {
            render_editor(&state, "blog/update.html", &user, Some(&post), &form, Some(&err))
                .map(IntoResponse::into_response)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<PostId>, PathRejection>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Redirect, AppError> {
    let Path(id) = path?;
    let post = get_post(&state.db, id, Some(&user), true)?;
    delete_post(&state.db, &post)?;

    info!(post_id = id, author_id = user.id, "Post deleted");
    Ok(Redirect::to("/"))
}

fn render_editor(
    state: &AppState,
    template: &str,
    user: &User,
    post: Option<&Post>,
    form: &PostForm,
    error: Option<&PostError>,
) -> Result<Html<String>, AppError> {
    let html = state.templates.render(
        template,
        context! {
            user => user,
            post => post,
            title => form.title,
            body => form.body,
            error => error.map(ToString::to_string),
        },
    )?;
    Ok(Html(html))
}
