pub mod account;
pub mod form;
pub mod vendor;

use std::sync::Arc;

use anyhow::{Context, Result};
use permit_form::{Clock, SystemClock};

use crate::api::ApiClient;
use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::kv::{FileStore, KeyValueStore};

/// Everything a networked or stateful command needs.
pub struct Env {
    pub config: ClientConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub auth: Arc<AuthContext>,
    pub api: Arc<ApiClient>,
}

impl Env {
    pub fn open(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.store_path()));
        let auth = Arc::new(
            AuthContext::load(store.clone())
                .with_context(|| format!("failed to read {}", config.store_path().display()))?,
        );
        let api = Arc::new(ApiClient::new(&config, auth.clone()).map_err(report)?);
        Ok(Self {
            config,
            store,
            auth,
            api,
        })
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        clock(&self.config)
    }
}

pub fn clock(config: &ClientConfig) -> Arc<dyn Clock> {
    Arc::new(SystemClock::with_offset_hours(config.utc_offset_hours))
}

/// Wraps a client error so the user-facing text leads the report.
pub fn report(err: ClientError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}
