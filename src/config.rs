use std::env;

use crate::cache::CacheConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    /// `<ref>` in `https://<ref>.supabase.co`.
    pub supabase_project_ref: String,
    pub supabase_anon_key: String,
    /// HS256 secret for locally issued tokens. When set it replaces JWKS lookups.
    pub jwt_secret: Option<String>,
    pub port: u16,
    pub run_migrations: bool,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let supabase_url = required("SUPABASE_URL")?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            supabase_project_ref: parse_project_ref(&supabase_url)?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            jwt_secret: env::var("SUPABASE_JWT_SECRET").ok().filter(|s| !s.is_empty()),
            port: parse_or("PORT", 8080)?,
            run_migrations: parse_or("RUN_MIGRATIONS", true)?,
            cache: CacheConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Extract the project ref from `https://PROJECT.supabase.co`.
pub fn parse_project_ref(supabase_url: &str) -> Result<String, ConfigError> {
    supabase_url
        .trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: "expected https://PROJECT.supabase.co".to_string(),
        })
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
