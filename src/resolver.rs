//! Resolver - turns one identifier into one Resolution.
//!
//! Per-identifier failure is part of the return value, not a control-flow
//! jump: `resolve` has no error channel, so a transport failure or a missing
//! field can never abort the surrounding batch.

use crate::config::LookupConfig;
use crate::error::{EnrichError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Sentinel name reported when no display name could be resolved.
pub const NOT_FOUND_NAME: &str = "Not Found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// The lookup succeeded and the target element carried a name.
    Resolved,
    /// The lookup succeeded but the target element was absent or empty.
    NotFound,
    /// The request itself failed: DNS, connect, timeout or non-2xx status.
    FetchError,
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ResolutionStatus::Resolved => "Resolved",
            ResolutionStatus::NotFound => "NotFound",
            ResolutionStatus::FetchError => "FetchError",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of resolving one identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub identifier: String,
    pub name: String,
    pub status: ResolutionStatus,
}

impl Resolution {
    pub fn resolved(identifier: &str, name: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: name.to_string(),
            status: ResolutionStatus::Resolved,
        }
    }

    pub fn not_found(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: NOT_FOUND_NAME.to_string(),
            status: ResolutionStatus::NotFound,
        }
    }

    pub fn fetch_error(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: NOT_FOUND_NAME.to_string(),
            status: ResolutionStatus::FetchError,
        }
    }
}

/// The seam between the batch driver and the lookup protocol. Stub
/// implementations stand in for the network in tests; a retry decorator
/// would also slot in here.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, identifier: &str) -> Resolution;
}

/// Resolver backed by the real lookup service: one GET per identifier with
/// the identifier as a query parameter, display name extracted from the
/// response markup. Single attempt, no retry, no backoff.
pub struct HttpResolver {
    config: LookupConfig,
    selector: Selector,
    client: reqwest::Client,
}

impl HttpResolver {
    /// Build a resolver from a validated config. An unparsable selector is a
    /// config error here, not a per-identifier failure later.
    pub fn new(config: LookupConfig) -> Result<Self> {
        config.validate()?;

        let selector = Selector::parse(&config.selector).map_err(|e| {
            EnrichError::Config(format!("Invalid CSS selector '{}': {}", config.selector, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| EnrichError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            selector,
            client,
        })
    }

    async fn fetch_page(&self, identifier: &str) -> std::result::Result<String, reqwest::Error> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[(self.config.query_param.as_str(), identifier)])
            .send()
            .await?
            .error_for_status()?;

        response.text().await
    }
}

#[async_trait]
impl Resolve for HttpResolver {
    async fn resolve(&self, identifier: &str) -> Resolution {
        let html = match self.fetch_page(identifier).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Lookup request failed for {}: {}", identifier, e);
                return Resolution::fetch_error(identifier);
            }
        };

        match extract_text(&html, &self.selector) {
            Some(name) => Resolution::resolved(identifier, &name),
            None => {
                debug!("No element matched selector for {}", identifier);
                Resolution::not_found(identifier)
            }
        }
    }
}

/// Extract the whitespace-normalized text of the first element matching
/// `selector`. Returns None when nothing matches or the match is empty.
pub fn extract_text(html: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(selector).next()?;

    let text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    #[test]
    fn extracts_text_from_matching_element() {
        let html = r#"<html><body><h1 class="h1-seo">Acme LLC</h1></body></html>"#;
        assert_eq!(
            extract_text(html, &selector("h1.h1-seo")),
            Some("Acme LLC".to_string())
        );
    }

    #[test]
    fn normalizes_whitespace_and_nested_markup() {
        let html = r#"<h1 class="h1-seo">  "ACME"
            <span>LLC</span>  </h1>"#;
        assert_eq!(
            extract_text(html, &selector("h1.h1-seo")),
            Some(r#""ACME" LLC"#.to_string())
        );
    }

    #[test]
    fn missing_element_yields_none() {
        let html = "<html><body><p>no heading here</p></body></html>";
        assert_eq!(extract_text(html, &selector("h1.h1-seo")), None);
    }

    #[test]
    fn empty_element_yields_none() {
        let html = r#"<h1 class="h1-seo">   </h1>"#;
        assert_eq!(extract_text(html, &selector("h1.h1-seo")), None);
    }

    #[test]
    fn first_match_wins() {
        let html = r#"<h1 class="h1-seo">First Corp</h1><h1 class="h1-seo">Second Corp</h1>"#;
        assert_eq!(
            extract_text(html, &selector("h1.h1-seo")),
            Some("First Corp".to_string())
        );
    }

    #[test]
    fn sentinel_constructors_set_name_and_status() {
        let not_found = Resolution::not_found("12345");
        assert_eq!(not_found.name, NOT_FOUND_NAME);
        assert_eq!(not_found.status, ResolutionStatus::NotFound);

        let fetch_error = Resolution::fetch_error("12345");
        assert_eq!(fetch_error.name, NOT_FOUND_NAME);
        assert_eq!(fetch_error.status, ResolutionStatus::FetchError);
        assert_eq!(fetch_error.identifier, "12345");
    }

    #[test]
    fn invalid_selector_is_a_config_error() {
        let config = LookupConfig {
            selector: "h1..".to_string(),
            ..LookupConfig::default()
        };
        assert!(HttpResolver::new(config).is_err());
    }
}
