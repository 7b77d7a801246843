use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth;
use crate::blog;
use crate::middleware::{load_current_user, render_error_page, require_login};
use crate::state::AppState;

/// All routes. The current user is resolved for every request before any
/// handler runs; the protected group additionally requires a login.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(blog::index))
        .route("/hello", get(hello))
        .route("/auth/register", get(auth::register_page).post(auth::register_submit))
        .route("/auth/login", get(auth::login_page).post(auth::login_submit))
        .route("/auth/logout", get(auth::logout));

    let protected_routes = Router::new()
        .route("/create", get(blog::create_page).post(blog::create_submit))
        .route("/{id}/update", get(blog::update_page).post(blog::update_submit))
        .route("/{id}/delete", post(blog::delete))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), render_error_page))
        .layer(middleware::from_fn_with_state(state.clone(), load_current_user))
        .with_state(state)
}

async fn hello() -> &'static str {
    "Hello, World!"
}
