//! Vercel Client
//!
//! Main client for interacting with the Vercel API, combining the HTTP
//! executor with the base URL and the default team scope.

use super::error::{Error, Result};
use super::http::{build_url, VercelHttpClient};
use super::team::resolve_team_id;
use crate::config::Config;
use std::time::Duration;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.vercel.com";

/// Main Vercel client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct VercelClient {
    pub http: VercelHttpClient,
    base_url: String,
    team_id: String,
}

impl VercelClient {
    /// Create a client from an executor, a base URL and a default team scope.
    ///
    /// `base_url` must be an absolute http(s) URL without query string.
    pub fn new(http: VercelHttpClient, base_url: &str, default_team_id: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| Error::InvalidRequest(format!("invalid base URL {:?}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(Error::InvalidRequest(format!(
                "base URL must be an http(s) URL: {:?}",
                base_url
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::InvalidRequest(format!(
                "base URL must not carry a query or fragment: {:?}",
                base_url
            )));
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            team_id: default_team_id.to_string(),
        })
    }

    /// Create a client from configuration, attaching the configured token
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = VercelHttpClient::new(
            config.api_token.as_deref(),
            config.timeout_secs.map(Duration::from_secs),
        )?;
        Self::new(
            http,
            &config.effective_base_url(),
            config.team_id.as_deref().unwrap_or_default(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default team scope used when a call does not name one
    pub fn default_team_id(&self) -> &str {
        &self.team_id
    }

    /// Resolve the team scope for one call
    pub fn team_id<'a>(&'a self, explicit: &'a str) -> &'a str {
        resolve_team_id(explicit, &self.team_id)
    }

    /// Build an API URL for `path`, scoped to an already resolved team
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)], team_id: &str) -> String {
        build_url(&self.base_url, path, query, team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vercel::error::ErrorKind;

    fn client(default_team: &str) -> VercelClient {
        let http = VercelHttpClient::from_client(reqwest::Client::new());
        VercelClient::new(http, "https://api.example.test/", default_team).unwrap()
    }

    fn build_err(base_url: &str) -> Error {
        let http = VercelHttpClient::from_client(reqwest::Client::new());
        VercelClient::new(http, base_url, "").err().unwrap()
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(client("").base_url(), "https://api.example.test");
    }

    #[test]
    fn test_team_id_resolution() {
        let client = client("team_default");
        assert_eq!(client.default_team_id(), "team_default");
        assert_eq!(client.team_id(""), "team_default");
        assert_eq!(client.team_id("team_other"), "team_other");
    }

    #[test]
    fn test_url_uses_resolved_team() {
        let client = client("team_default");
        let team = client.team_id("");
        assert_eq!(
            client.url("/v8/projects", &[], team),
            "https://api.example.test/v8/projects?teamId=team_default"
        );
    }

    #[test]
    fn test_from_config_defaults() {
        let config = Config::default();
        let client = VercelClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.default_team_id(), "");
    }

    #[test]
    fn test_malformed_base_url_is_request_error() {
        for base_url in ["not a url", "", "ftp://api.vercel.com", "mailto:ops@example.test"] {
            let err = build_err(base_url);
            assert_eq!(err.kind(), ErrorKind::Request, "{base_url}");
            assert!(!err.is_retryable(), "{base_url}");
        }
    }

    #[test]
    fn test_base_url_with_query_rejected() {
        let err = build_err("https://api.vercel.com/?teamId=x");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_from_config_rejects_bad_base_url() {
        let mut config = Config::default();
        config.base_url = Some("api.vercel.com".into());
        let err = VercelClient::from_config(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Request);
    }
}
