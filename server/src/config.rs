use config::{ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use jiff::SignedDuration;
use secrecy::SecretString;
use serde::Deserialize;
use std::{env, time::Duration};
use types::{Result, err};
use url::Url;

const CONFIG_PATH_VAR: &str = "VOLUNTEER_ADMIN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "volunteer-admin.toml";
const MAX_SESSION_TTL_HOURS: u64 = 24 * 30;

#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base URL of the volunteer platform API.
    pub api_url: Url,
    /// Key for signing session cookies.
    pub signing_secret: SecretString,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_session_ttl_hours() -> u64 {
    12
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_secure_cookies() -> bool {
    true
}

impl Config {
    /// Reads the optional TOML file, then `VOLUNTEER_ADMIN_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let builder = config::Config::builder()
            .add_source(File::new(&path, FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("VOLUNTEER_ADMIN").try_parsing(true));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&config.session_ttl_hours) {
            return Err(err!(
                "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
                config.session_ttl_hours
            ));
        }
        Ok(config)
    }

    pub fn session_ttl(&self) -> SignedDuration {
        // In range since `from_builder`.
        SignedDuration::from_hours(self.session_ttl_hours as i64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
