//! Runtime configuration for the analyzer.
//!
//! The only external setting the core needs is the network address of the
//! remote analysis service. Everything is read from environment variables and
//! can be overridden per session from JS.

use std::time::Duration;

use crate::error::{Error, Result};

pub const ENDPOINT_ENV: &str = "COLOR_ANALYZER_ENDPOINT";
pub const TIMEOUT_ENV: &str = "COLOR_ANALYZER_TIMEOUT_SECS";
pub const REPORT_NAME_ENV: &str = "COLOR_ANALYZER_REPORT_NAME";

pub const DEFAULT_ENDPOINT: &str = "https://color-accessibility-analyzer.onrender.com/analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_REPORT_FILE_NAME: &str = "accessibility_report.pdf";

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Full URL of the remote `/analyze` endpoint
    pub endpoint: String,

    /// Caller-level timeout for one analysis round trip.
    pub timeout_secs: u64,

    /// File name used when saving the exported report
    pub report_file_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            report_file_name: DEFAULT_REPORT_FILE_NAME.to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = lookup(ENDPOINT_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.endpoint);

        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"))
            })?,
            None => defaults.timeout_secs,
        };

        let report_file_name = lookup(REPORT_NAME_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.report_file_name);

        Ok(Self {
            endpoint,
            timeout_secs,
            report_file_name,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
