use crate::error::{EnrichError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Browser-like User-Agent. The lookup service rejects requests carrying
/// default HTTP-client signatures.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything about the remote lookup service that is versioned against its
/// markup rather than against this crate. The CSS selector in particular is
/// an external contract with the site and must stay runtime data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the lookup service.
    pub base_url: String,

    /// Query parameter carrying the identifier.
    pub query_param: String,

    /// CSS selector for the element whose text is the display name.
    pub selector: String,

    /// User-Agent header sent with every lookup.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://orginfo.uz/".to_string(),
            query_param: "q".to_string(),
            selector: "h1.h1-seo".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl LookupConfig {
    /// Load a config from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EnrichError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: LookupConfig = serde_json::from_str(&raw).map_err(|e| {
            EnrichError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides (populated from `.env` when present).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("LOOKUP_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(query_param) = std::env::var("LOOKUP_QUERY_PARAM") {
            self.query_param = query_param;
        }
        if let Ok(selector) = std::env::var("LOOKUP_SELECTOR") {
            self.selector = selector;
        }
        if let Ok(user_agent) = std::env::var("LOOKUP_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Ok(timeout) = std::env::var("LOOKUP_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse() {
                self.timeout_secs = timeout;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(EnrichError::Config("base_url must not be empty".to_string()));
        }
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            EnrichError::Config(format!("Invalid base_url '{}': {}", self.base_url, e))
        })?;
        if self.query_param.trim().is_empty() {
            return Err(EnrichError::Config("query_param must not be empty".to_string()));
        }
        if self.selector.trim().is_empty() {
            return Err(EnrichError::Config("selector must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(EnrichError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
