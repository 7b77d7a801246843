pub mod auth;
pub mod blog;
pub mod error;
pub mod middleware;
pub mod password;
pub mod router;
pub mod session;
pub mod state;
pub mod templates;
