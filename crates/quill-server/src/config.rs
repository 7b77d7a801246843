use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_SECRET: &str = "dev";

/// Runtime settings, read from `QUILL_*` environment variables
/// (a `.env` file is loaded first if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("QUILL_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("QUILL_PORT is not a valid port: {raw:?}"))?,
            None => 5000,
        };

        Ok(Self {
            secret_key: lookup("QUILL_SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET.into()),
            db_path: lookup("QUILL_DB_PATH")
                .unwrap_or_else(|| "quill.db".into())
                .into(),
            host: lookup("QUILL_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET
    }
}
