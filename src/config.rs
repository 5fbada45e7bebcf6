//! Extractor configuration
//!
//! Retry bounds, page caps and API settings are carried in an explicit
//! [`ExtractorConfig`] value that is handed to the client and the phase
//! workers at construction time. Files may be YAML or JSON; every section
//! falls back to its defaults when omitted.

use crate::error::{Error, Result};
use crate::http::{RetryPolicy, ThrottleConfig};
use crate::pagination::PageLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete extractor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// API endpoint settings
    pub api: ApiConfig,
    /// Rate-limit retry policy
    pub retry: RetryPolicy,
    /// Page sizes and page caps
    pub pagination: PageLimits,
    /// Optional client-side request throttle
    pub throttle: Option<ThrottleConfig>,
}

impl ExtractorConfig {
    /// Create a config with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a YAML or JSON file (by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = Some(url.into());
        self
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the page limits
    #[must_use]
    pub fn with_pagination(mut self, pagination: PageLimits) -> Self {
        self.pagination = pagination;
        self
    }

    /// Reject values that would make extraction loop forever or never run
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_value(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }
        if self.pagination.max_pages_per_grouping == 0 {
            return Err(Error::invalid_value(
                "pagination.max_pages_per_grouping",
                "must be at least 1",
            ));
        }
        if self.pagination.issues_page_size == 0 || self.pagination.events_page_size == 0 {
            return Err(Error::invalid_value(
                "pagination",
                "page sizes must be at least 1",
            ));
        }
        if let Some(base) = &self.api.base_url {
            url::Url::parse(base)?;
        }
        if let Some(throttle) = &self.throttle {
            if throttle.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "throttle.requests_per_second",
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// API
// ============================================================================

/// API endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; defaults to the organization subdomain
    pub base_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            user_agent: format!("sentry-extractor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Resolve the base URL for an organization
    pub fn base_url_for(&self, org_slug: &str) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{org_slug}.sentry.io/api/0"),
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
