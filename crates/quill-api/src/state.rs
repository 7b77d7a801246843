use std::ops::Deref;
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tracing::error;

use quill_db::Database;

use crate::error::AppError;
use crate::templates::Templates;

/// Shared, read-only application state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState(Arc<AppStateInner>);

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub templates: Templates,
    key: Key,
}

impl AppState {
    /// Build the state. The session signing key is derived from `secret`, so
    /// any string works, but cookies only survive restarts with the same one.
    pub fn new(db: Database, secret: &str) -> anyhow::Result<Self> {
        let digest = Sha512::digest(secret.as_bytes());
        let key = Key::try_from(digest.as_slice())
            .map_err(|e| anyhow!("Invalid session signing key: {}", e))?;

        Ok(Self(Arc::new(AppStateInner {
            db: Arc::new(db),
            templates: Templates::new()?,
            key,
        })))
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Run CPU-heavy work (password hashing) off the async runtime.
pub async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        AppError::Internal(e.into())
    })
}
