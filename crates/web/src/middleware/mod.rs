//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (record in span, tag Sentry scope, echo header)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
