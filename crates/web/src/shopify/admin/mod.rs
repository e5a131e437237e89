//! Shopify Admin API GraphQL client with access-token authentication.
//!
//! Every request goes through [`RetryPolicy::run`], so callers see either the
//! response data or a terminal error.

use std::sync::Arc;
use std::time::Duration;

use graphql_client::QueryBody;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, instrument};

use crate::config::ShopifyAdminConfig;

use super::retry::{AttemptError, RetryPolicy};
use super::{GraphQLError, GraphQLErrorLocation, ShopifyError};

mod conversions;
mod products;
pub mod queries;

/// Per-request timeout for upstream calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Longest upstream body excerpt kept in errors and logs.
const BODY_EXCERPT_LEN: usize = 500;

/// GraphQL error code Shopify uses for cost-based throttling.
const THROTTLED_CODE: &str = "THROTTLED";

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Security
///
/// The access token grants read access to the whole product catalog. It is
/// only ever sent in the `X-Shopify-Access-Token` header and never logged.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    retry: RetryPolicy,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("endpoint", &self.inner.endpoint)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Configuration` if the store or access token is
    /// empty, or `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        if config.endpoint_override.is_none() && config.store.trim().is_empty() {
            return Err(ShopifyError::Configuration(
                "Shopify store domain is empty".to_string(),
            ));
        }
        if config.access_token.expose_secret().trim().is_empty() {
            return Err(ShopifyError::Configuration(
                "Shopify access token is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                endpoint: config.endpoint(),
                access_token: config.access_token.clone(),
                retry: RetryPolicy::from(config),
            }),
        })
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL document, retrying throttled and transient failures.
    #[instrument(skip(self, body), fields(operation = body.operation_name))]
    async fn execute<V, D>(&self, body: &QueryBody<V>) -> Result<D, ShopifyError>
    where
        V: Serialize + Sync,
        D: DeserializeOwned,
    {
        self.inner
            .retry
            .run(body.operation_name, |attempt| self.send_once(body, attempt))
            .await
    }

    /// One POST to the endpoint, classified for the retry loop.
    async fn send_once<V, D>(&self, body: &QueryBody<V>, attempt: u32) -> Result<D, AttemptError>
    where
        V: Serialize + Sync,
        D: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(
                "X-Shopify-Access-Token",
                self.inner.access_token.expose_secret(),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| classify(e.into()))?;

        let status = response.status();
        debug!(attempt, status = status.as_u16(), "Admin API response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::Throttled(parse_retry_after(
                response.headers(),
            )));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptError::Fatal(ShopifyError::Unauthorized(format!(
                "Admin API rejected the access token (HTTP {})",
                status.as_u16()
            ))));
        }

        let text = response.text().await.map_err(|e| classify(e.into()))?;

        if !status.is_success() {
            return Err(classify(ShopifyError::Upstream {
                status: status.as_u16(),
                body: excerpt(&text),
            }));
        }

        let parsed: graphql_client::Response<D> = serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                body = %excerpt(&text),
                "Failed to parse Admin API response"
            );
            AttemptError::Fatal(e.into())
        })?;

        if let Some(errors) = parsed.errors
            && !errors.is_empty()
        {
            if errors.iter().any(is_throttled) {
                return Err(AttemptError::Throttled(None));
            }
            return Err(AttemptError::Fatal(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            )));
        }

        parsed.data.ok_or_else(|| {
            AttemptError::Fatal(ShopifyError::MalformedResponse(
                "No data in response".to_string(),
            ))
        })
    }
}

fn classify(error: ShopifyError) -> AttemptError {
    if error.is_retryable() {
        AttemptError::Retryable(error)
    } else {
        AttemptError::Fatal(error)
    }
}

/// Parse a `Retry-After` header given in (possibly fractional) seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

fn is_throttled(error: &graphql_client::Error) -> bool {
    error
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .and_then(serde_json::Value::as_str)
        == Some(THROTTLED_CODE)
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: error.message,
        locations: error
            .locations
            .unwrap_or_default()
            .into_iter()
            .map(|l| GraphQLErrorLocation {
                line: i64::from(l.line),
                column: i64::from(l.column),
            })
            .collect(),
        path: error
            .path
            .unwrap_or_default()
            .into_iter()
            .map(|p| match p {
                graphql_client::PathFragment::Key(k) => serde_json::Value::String(k),
                graphql_client::PathFragment::Index(i) => serde_json::Value::from(i),
            })
            .collect(),
    }
}

fn excerpt(text: &str) -> String {
    if text.len() <= BODY_EXCERPT_LEN {
        return text.to_string();
    }
    let mut end = BODY_EXCERPT_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
