//! Shopify Admin API client.
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents sent through `graphql_client` envelopes
//!   (`QueryBody` out, `Response` in), HTTP via `reqwest` directly
//! - Cursors and page sizes travel as GraphQL variables
//! - Rate limiting (HTTP 429 and `THROTTLED` GraphQL errors) and transient
//!   failures are retried with capped exponential backoff, see [`retry`]
//! - No caching at this layer; see [`crate::catalog`]
//!
//! # Example
//!
//! ```rust,ignore
//! use ncv_compare_web::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify)?;
//!
//! // First page of vendor listings
//! let page = client.get_vendor_page(250, None).await?;
//! ```

mod admin;
pub mod retry;
pub mod types;

pub use admin::AdminClient;
pub use admin::queries::{
    MAX_PRODUCT_PAGE_SIZE, MAX_QUERY_COST, ProductMetafields, product_page_cost,
};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// Credentials or endpoint missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Still throttled after the last allowed attempt.
    #[error("Rate limited, gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Every attempt failed for a reason other than throttling.
    #[error("Retries exhausted after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },

    /// Non-success HTTP status other than 429/401/403. Always retried.
    #[error("Upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Access token rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but lacks fields the sweep depends on.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ShopifyError {
    /// Whether a later attempt might succeed where this one failed.
    ///
    /// Exhaustion variants report `false`: the retry budget is already spent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Upstream { .. } => true,
            Self::Configuration(_)
            | Self::RateLimited { .. }
            | Self::RetriesExhausted { .. }
            | Self::Unauthorized(_)
            | Self::GraphQL(_)
            | Self::Parse(_)
            | Self::MalformedResponse(_) => false,
        }
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field 'vendr' doesn't exist on type 'Product'".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid cursor".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field 'vendr' doesn't exist on type 'Product'; Invalid cursor"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 3, column: 7 }],
            path: vec![
                serde_json::Value::String("products".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(err.to_string(), "GraphQL errors: path: products.0 at line 3:7");
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = ShopifyError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(
            ShopifyError::Upstream {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!ShopifyError::Unauthorized("bad token".to_string()).is_retryable());
        assert!(!ShopifyError::RateLimited { attempts: 5 }.is_retryable());
        assert!(!ShopifyError::MalformedResponse("no pageInfo".to_string()).is_retryable());
    }

    #[test]
    fn test_exhaustion_messages() {
        assert_eq!(
            ShopifyError::RateLimited { attempts: 5 }.to_string(),
            "Rate limited, gave up after 5 attempts"
        );
        assert_eq!(
            ShopifyError::RetriesExhausted {
                attempts: 5,
                reason: "Upstream returned HTTP 502: bad gateway".to_string()
            }
            .to_string(),
            "Retries exhausted after 5 attempts: Upstream returned HTTP 502: bad gateway"
        );
    }
}
