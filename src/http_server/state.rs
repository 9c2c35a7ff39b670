use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use color_eyre::{Result, eyre::eyre};

use crate::config::Config;
use crate::database::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    /// Signs the session cookies
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Config) -> Result<Self> {
        let cookie_key = match config.http.cookie_secret.as_deref() {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|e| eyre!("Invalid cookie_secret: {}", e))?,
            None => {
                log::warn!("No cookie_secret configured, generating a key for this run");
                Key::generate()
            }
        };

        Ok(Self {
            db,
            config,
            cookie_key,
        })
    }
}
