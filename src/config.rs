//! Provider configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
const KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable (and its fallback) is unset or blank.
    #[error("missing configuration: env var {var} not set")]
    Missing { var: &'static str },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub timeouts: Timeouts,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL` (or `VITE_SUPABASE_URL`)
    /// - `SUPABASE_ANON_KEY` (or `VITE_SUPABASE_ANON_KEY`)
    ///
    /// Optional:
    /// - `TODO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TODO_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the URL or key is absent and
    /// [`ConfigError::Invalid`] when the URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let supabase_url = first_env(&URL_VARS).ok_or(ConfigError::Missing { var: URL_VARS[0] })?;
        let anon_key = first_env(&KEY_VARS).ok_or(ConfigError::Missing { var: KEY_VARS[0] })?;

        let supabase_url = supabase_url.trim().trim_end_matches('/').to_owned();
        if !(supabase_url.starts_with("http://") || supabase_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!("{} must be an http(s) URL: {supabase_url}", URL_VARS[0])));
        }

        let timeouts = Timeouts {
            request_secs: env_parse_u64("TODO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("TODO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { supabase_url, anon_key: anon_key.trim().to_owned(), timeouts })
    }
}

/// Outcome of looking for a `.env` file in the working directory or above.
#[derive(Debug)]
pub enum DotEnv {
    Loaded(PathBuf),
    /// No file; variables come from the shell.
    Absent,
    /// A file was found but could not be read or parsed.
    Invalid(dotenvy::Error),
}

impl DotEnv {
    /// Load `.env` into the process environment.
    #[must_use]
    pub fn load() -> Self {
        Self::from_result(dotenvy::dotenv())
    }

    fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(e) if e.not_found() => Self::Absent,
            Err(e) => Self::Invalid(e),
        }
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
