//! Builds an `AppConfig` from layered sources:
//! `config/base.toml`, then `config/{environment}.toml`, then `APP_`-prefixed
//! environment variables, and finally the provider variables the hosting platform sets
//! (`RESEND_API_KEY`, `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `PORT`).
//!
//! The resulting config is handed to `App::build_from_config` explicitly, nothing reads it globally.

mod data;
mod error;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

pub use data::{AppConfig, EmailConfig, Environment, NetConfig, StoreConfig};
pub use error::{ConfigError, ConfigResult};

impl AppConfig {
    /// Loads the configuration from the `config` directory in the current working directory.
    pub fn load() -> ConfigResult<Self> {
        let config_dir = std::env::current_dir()?.join("config");
        Self::load_from(config_dir)
    }

    /// Loads the configuration from `config_dir`, choosing the environment file from `APP_ENVIRONMENT`.
    pub fn load_from(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()?;
        info!(
            "{:<20} - Loading the configuration for: {}",
            "config",
            environment.as_ref()
        );

        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(provider_env("RESEND_API_KEY", "email_config.auth_token"))
            .merge(provider_env("SUPABASE_URL", "store_config.url"))
            .merge(provider_env("SUPABASE_ANON_KEY", "store_config.api_key"))
            .merge(provider_env("PORT", "net_config.app_port"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

/// Maps a single unprefixed environment variable onto a nested config key.
fn provider_env(var: &'static str, key: &'static str) -> Env {
    Env::raw().only(&[var]).map(move |_| key.into())
}
