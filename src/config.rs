//! Configuration module for ozon-labels.
//!
//! This module holds the validated settings that drive a run. It handles:
//! - Credential validation (construction-time, never per call)
//! - Defaults for directories, API endpoint and timeout
//! - Deterministic output and log file naming

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::error::ConfigError;

/// Production Seller API endpoint.
pub const DEFAULT_API_URL: &str = "https://api-seller.ozon.ru";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Seller API credentials sent as headers on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    api_key: String,
}

impl Credentials {
    /// Create credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is empty or cannot be sent as an
    /// HTTP header value.
    pub fn new(
        client_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id.into().trim().to_string();
        let api_key = api_key.into().trim().to_string();

        check_header_value("OZON_CLIENT_ID", &client_id)?;
        check_header_value("OZON_API_KEY", &api_key)?;

        Ok(Self { client_id, api_key })
    }

    /// The `Client-Id` header value.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The `Api-Key` header value.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn check_header_value(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Missing { name });
    }

    HeaderValue::from_str(value).map_err(|err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
    })?;

    Ok(())
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Client id as configured; may be empty until validated.
    pub client_id: String,

    /// API key as configured; may be empty until validated.
    pub api_key: String,

    /// Seller API base URL.
    pub api_url: String,

    /// Directory that receives assembled PDFs.
    pub output_dir: PathBuf,

    /// Directory that receives daily log files.
    pub logs_dir: PathBuf,

    /// Printer used when none is requested explicitly.
    pub default_printer: Option<String>,

    /// Upper bound for a single remote call.
    pub request_timeout: Duration,

    /// Quiet mode - suppress non-error console output.
    pub quiet: bool,

    /// Verbose mode - debug logging and extra detail.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            output_dir: PathBuf::from("./output"),
            logs_dir: PathBuf::from("./logs"),
            default_printer: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            quiet: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// Returns every problem found rather than stopping at the first one, so
    /// a user fixing their environment sees the full list at once.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(err) = check_header_value("OZON_CLIENT_ID", self.client_id.trim()) {
            errors.push(err);
        }

        if let Err(err) = check_header_value("OZON_API_KEY", self.api_key.trim()) {
            errors.push(err);
        }

        if self.api_url.trim().is_empty() {
            errors.push(ConfigError::Missing { name: "OZON_API_URL" });
        }

        if self.request_timeout.is_zero() {
            errors.push(ConfigError::Invalid {
                name: "timeout",
                reason: "must be at least one second".to_string(),
            });
        }

        if self.verbose && self.quiet {
            errors.push(ConfigError::Invalid {
                name: "verbosity",
                reason: "cannot use both --verbose and --quiet".to_string(),
            });
        }

        errors
    }

    /// Build API credentials from the configured values.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::new(self.client_id.as_str(), self.api_key.as_str())
    }

    /// Printer to use for a run, preferring an explicit request.
    pub fn printer_for<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .or(self.default_printer.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Path of the assembled PDF for an order or supply identifier.
    pub fn output_path_for(&self, reference: &str) -> PathBuf {
        self.output_dir.join(output_file_name(reference))
    }

    /// Path of the log file for the given calendar day.
    pub fn log_path_for(&self, date: chrono::NaiveDate) -> PathBuf {
        log_path_in(&self.logs_dir, date)
    }
}

/// File name of the assembled PDF for an identifier.
pub fn output_file_name(reference: &str) -> String {
    let sanitized: String = reference
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("supply_{sanitized}_full.pdf")
}

/// Daily log file inside `logs_dir`.
pub fn log_path_in(logs_dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    logs_dir.join(format!("ozon_labels_{}.log", date.format("%Y-%m-%d")))
}
