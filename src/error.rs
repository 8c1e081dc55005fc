//! Routing and dispatch errors.

use http::Method;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a request that did not reach a handler normally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// No trie for the method, or no pattern matched the path.
    #[error("no route for {method} {path}")]
    NotFound { method: Method, path: String },

    /// A pattern matched but nothing is bound to it. Registration and trie
    /// insertion went out of step.
    #[error("route {method} {pattern} matched but has no handler")]
    MissingHandler { method: Method, pattern: Arc<str> },

    /// The handler panicked while processing the request.
    #[error("handler for {method} {pattern} panicked: {message}")]
    HandlerPanicked {
        method: Method,
        pattern: Arc<str>,
        message: String,
    },
}

impl RouteError {
    /// HTTP status the serving layer should answer with.
    #[must_use]
    pub fn status(&self) -> http::StatusCode {
        match self {
            RouteError::NotFound { .. } => http::StatusCode::NOT_FOUND,
            RouteError::MissingHandler { .. } | RouteError::HandlerPanicked { .. } => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
