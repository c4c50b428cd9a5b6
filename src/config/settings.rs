//! Application settings from config.toml and the environment.
//!
//! Non-secret defaults live in `config.toml`; the admin password and the
//! messaging API credentials must come from environment variables (loaded
//! from `.env` if present). Nothing secret is ever embedded in source or in
//! the checked-in example configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default messaging API base URL.
pub const DEFAULT_BASE_URL: &str = "http://smartsmsbd.com/api";

/// Default administrator username.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// The fixed administrator credential pair.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    /// Administrator login username
    pub username: String,
    /// Administrator login password
    pub password: String,
}

/// Credentials and endpoint of the messaging gateway.
#[derive(Clone, Debug)]
pub struct MessagingSettings {
    /// API secret key
    pub api_secret: String,
    /// WhatsApp account unique id
    pub account_id: String,
    /// Base URL of the messaging API
    pub base_url: String,
}

/// Fully resolved application settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Administrator credentials
    pub admin: AdminCredentials,
    /// Messaging gateway settings
    pub messaging: MessagingSettings,
}

/// Configuration structure representing the config.toml file.
///
/// Every field is optional; the environment and the built-in defaults fill
/// the gaps.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(default)]
    admin: FileAdmin,
    #[serde(default)]
    messaging: FileMessaging,
}

#[derive(Debug, Default, Deserialize)]
struct FileAdmin {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileMessaging {
    api_secret: Option<String>,
    account_id: Option<String>,
    base_url: Option<String>,
}

impl Settings {
    /// Loads settings from `./config.toml` (if present) and the environment.
    ///
    /// A `.env` file is loaded first when one exists; environment variables
    /// always win over the file.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let file = if Path::new("config.toml").exists() {
            load_file("config.toml")?
        } else {
            FileSettings::default()
        };
        resolve(file, &|key| std::env::var(key).ok())
    }

    /// Loads settings from an explicit config file path plus the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();
        resolve(load_file(path)?, &|key| std::env::var(key).ok())
    }
}

fn load_file<P: AsRef<Path>>(path: P) -> Result<FileSettings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Merges file values with environment overrides and applies defaults.
///
/// Secrets (admin password, API secret, account id) have no default: a
/// missing value is a configuration error, not a fallback to anything
/// embedded in the binary.
fn resolve(file: FileSettings, env: &dyn Fn(&str) -> Option<String>) -> Result<Settings> {
    let username = env("ADMIN_USERNAME")
        .or(file.admin.username)
        .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
    let password = env("ADMIN_PASSWORD")
        .or(file.admin.password)
        .ok_or_else(|| Error::Config {
            message: "ADMIN_PASSWORD is not set".to_string(),
        })?;
    let api_secret = env("MESSAGING_API_SECRET")
        .or(file.messaging.api_secret)
        .ok_or_else(|| Error::Config {
            message: "MESSAGING_API_SECRET is not set".to_string(),
        })?;
    let account_id = env("MESSAGING_ACCOUNT_ID")
        .or(file.messaging.account_id)
        .ok_or_else(|| Error::Config {
            message: "MESSAGING_ACCOUNT_ID is not set".to_string(),
        })?;
    let base_url = env("MESSAGING_BASE_URL")
        .or(file.messaging.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(Settings {
        admin: AdminCredentials { username, password },
        messaging: MessagingSettings {
            api_secret,
            account_id,
            base_url,
        },
    })
}
