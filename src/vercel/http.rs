//! HTTP utilities for Vercel REST API calls
//!
//! Two halves: the request builder (URL construction with team scoping and
//! payload marshaling into a [`PreparedRequest`]) and the executor
//! ([`VercelHttpClient`]) that sends a prepared request under a [`Context`],
//! checks the status and decodes the body.

use super::context::Context;
use super::error::{sanitize_for_log, ApiError, Error, Result};
use super::team::scope_url;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("vercel-client/", env!("CARGO_PKG_VERSION"));

/// A fully built request, ready for the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    /// Serialized JSON body
    pub body: Option<String>,
}

impl PreparedRequest {
    /// A GET request without body
    pub fn get(url: String) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    /// A POST request carrying `payload` as JSON
    pub fn post_json<T: Serialize + ?Sized>(url: String, payload: &T) -> Result<Self> {
        Ok(Self {
            method: Method::POST,
            url,
            body: Some(marshal(payload)?),
        })
    }
}

/// Build `{base_url}{path}` with the given query parameters, then apply team scoping
pub fn build_url(base_url: &str, path: &str, query: &[(&str, &str)], team_id: &str) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    for (i, (key, value)) in query.iter().enumerate() {
        let separator = if i == 0 { '?' } else { '&' };
        url.push(separator);
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    scope_url(url, team_id)
}

/// Percent-encode a caller supplied path segment, rejecting empty values
pub fn path_segment(name: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("{} must not be empty", name)));
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// Serialize a request payload. A failure here means the payload type is
/// malformed, and the call is aborted before anything is sent.
pub fn marshal<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    serde_json::to_string(payload).map_err(Error::Serialize)
}

/// HTTP client wrapper for Vercel API calls
#[derive(Clone)]
pub struct VercelHttpClient {
    client: Client,
}

impl VercelHttpClient {
    /// Create a new HTTP client, attaching `token` as bearer credential to every request
    pub fn new(token: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::InvalidRequest("API token contains invalid characters".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap a caller configured reqwest client (credentials already attached)
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Send `request` and decode the 2xx body into `T`
    pub async fn do_request<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: PreparedRequest,
    ) -> Result<T> {
        let body = self.send(ctx, request).await?;
        serde_json::from_str(&body).map_err(|e| Error::decode(e, &body))
    }

    /// Send `request`, drain the body and only report the status
    pub async fn do_request_discard(&self, ctx: &Context, request: PreparedRequest) -> Result<()> {
        self.send(ctx, request).await.map(|_| ())
    }

    async fn send(&self, ctx: &Context, request: PreparedRequest) -> Result<String> {
        if let Some(err) = ctx.err() {
            tracing::debug!("{} {} not sent: {}", request.method, request.url, err);
            return Err(err);
        }

        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, &request.url);
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            err = ctx.done() => {
                tracing::debug!("Request aborted: {}", err);
                return Err(err);
            }
            result = exchange => result?,
        };

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Api(ApiError::from_response(status, &body)));
        }

        Ok(body)
    }
}
