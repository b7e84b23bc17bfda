//! The configuration structs used to build the AppConfig, and their impls.
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::ConfigError;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub email_config: EmailConfig,
    #[serde(default)]
    pub store_config: StoreConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// Settings for the email-delivery provider.
/// A missing `auth_token` is not a startup error: the signup route answers with a
/// configuration error instead, so the rest of the service keeps running.
#[derive(Deserialize, Debug)]
pub struct EmailConfig {
    pub api_url: String,
    /// Full `From` value, e.g. `NomadCrew <welcome@nomadcrew.uk>`.
    pub sender: String,
    pub subject: String,
    pub auth_token: Option<SecretString>,
    /// Operator address that receives a plain-text notice for every signup.
    pub notify_addr: Option<String>,
    pub product_name: String,
    pub site_url: String,
    pub timeout_millis: u64,
}

/// Settings for the REST data store. The insert is skipped unless both `url` and `api_key` are set.
#[derive(Deserialize, Debug)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub api_key: Option<SecretString>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
}

// ###################################
// ->   IMPLs
// ###################################
impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            url: None,
            api_key: None,
            table: default_table(),
            timeout_millis: default_timeout_millis(),
        }
    }
}

fn default_table() -> String {
    "waitlist_signups".to_string()
}

fn default_timeout_millis() -> u64 {
    10_000
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}
