use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client settings. Loaded from TOML, then overridden by `PERMIT_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout_secs: u64,
    pub max_asset_bytes: u64,
    pub utc_offset_hours: i8,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url"),
            request_timeout_secs: 30,
            max_asset_bytes: permit_form::MAX_ASSET_BYTES,
            utc_offset_hours: 8,
            data_dir: default_data_dir(),
            log_filter: "info".into(),
        }
    }
}

impl ClientConfig {
    /// Reads `path`, or the per-user default location, then applies the
    /// environment. A missing file is not an error. Rejected environment
    /// values are returned for reporting once logging is up.
    pub fn load(path: Option<&Path>) -> Result<(Self, Vec<String>)> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        let rejected = config.apply_env();
        Ok((config, rejected))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Applies `PERMIT_*` overrides and describes every value it ignored.
    pub fn apply_env(&mut self) -> Vec<String> {
        [
            override_from("PERMIT_BASE_URL", &mut self.base_url),
            override_from("PERMIT_TIMEOUT_SECS", &mut self.request_timeout_secs),
            override_from("PERMIT_DATA_DIR", &mut self.data_dir),
            override_from("PERMIT_LOG", &mut self.log_filter),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Key-value file holding the session and gallery records.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

fn override_from<T: FromStr>(key: &str, slot: &mut T) -> Option<String>
where
    T::Err: Display,
{
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => {
            *slot = value;
            None
        }
        Err(err) => Some(format!("Invalid {key} value '{raw}': {err}")),
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("ph", "pasig", "permit-client")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".permit-client"))
}
