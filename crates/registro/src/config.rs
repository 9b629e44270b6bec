//! Configuration loading from environment variables.

use anyhow::{bail, Context, Result};

/// Backend URL used when `REGISTRO_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Whether the reporting call carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportAuth {
    /// No `Authorization` header on the reporting call.
    #[default]
    Anonymous,
    /// Attach `Bearer <token>` when a session exists.
    Bearer,
}

impl std::str::FromStr for ReportAuth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "anonymous" | "none" => Ok(ReportAuth::Anonymous),
            "bearer" => Ok(ReportAuth::Bearer),
            other => bail!("unknown report auth mode '{}', expected 'anonymous' or 'bearer'", other),
        }
    }
}

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub report_auth: ReportAuth,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            report_auth: ReportAuth::Anonymous,
        }
    }
}

impl Settings {
    /// Load settings from `REGISTRO_URL` and `REGISTRO_REPORT_AUTH`,
    /// either in the environment or in a `.env` file.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = var("REGISTRO_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let report_auth = match var("REGISTRO_REPORT_AUTH") {
            Some(mode) => mode.parse().context("Invalid REGISTRO_REPORT_AUTH")?,
            None => ReportAuth::default(),
        };

        Ok(Self {
            base_url,
            report_auth,
        })
    }
}

/// Backend login credentials loaded from environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Load credentials from environment variables.
    ///
    /// Expects `REGISTRO_USER` and `REGISTRO_PASSWORD` to be set,
    /// either in the environment or in a `.env` file.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            username: var("REGISTRO_USER").context("REGISTRO_USER is not set")?,
            password: var("REGISTRO_PASSWORD").context("REGISTRO_PASSWORD is not set")?,
        })
    }
}
