use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "memochain.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub gateway_url: Option<String>,
    pub wallet_address: Option<String>,
    pub cluster: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/memochain.db".into(),
            gateway_url: None,
            wallet_address: None,
            cluster: "devnet".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    gateway_url: Option<String>,
    wallet_address: Option<String>,
    cluster: Option<String>,
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

/// File values first, then environment, each layer only filling what it sets.
pub fn load_settings_with(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if file_cfg.gateway_url.is_some() {
                    settings.gateway_url = file_cfg.gateway_url;
                }
                if file_cfg.wallet_address.is_some() {
                    settings.wallet_address = file_cfg.wallet_address;
                }
                if let Some(v) = file_cfg.cluster {
                    settings.cluster = v;
                }
            }
            Err(error) => {
                warn!(path = %config_path.display(), %error, "ignoring unreadable config file");
            }
        }
    }

    if let Some(v) = env("MEMOCHAIN_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("MEMOCHAIN_GATEWAY_URL") {
        settings.gateway_url = Some(v);
    }

    if let Some(v) = env("MEMOCHAIN_WALLET") {
        settings.wallet_address = Some(v);
    }

    if let Some(v) = env("MEMOCHAIN_CLUSTER") {
        settings.cluster = v;
    }

    settings
}

/// Turns a bare file path into a `sqlite://` url; other urls pass through.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
