//! Declarative route tables.
//!
//! A route table lists the routes of a service in TOML:
//!
//! ```toml
//! [[route]]
//! method = "GET"
//! pattern = "/users/:id"
//! name = "get_user"
//!
//! [[route]]
//! method = "get"
//! pattern = "/files/*path"
//! ```
//!
//! Methods are case-insensitive. Tables are used by the `trierouter` CLI and
//! to build a [`Router`] without handlers.

use anyhow::{Context, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::router::Router;

/// One `[[route]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub method: String,
    pub pattern: String,
    /// Optional label reported by the CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RouteSpec {
    /// The entry's method as an [`http::Method`].
    ///
    /// # Errors
    ///
    /// Fails when the method is not a valid HTTP token.
    pub fn http_method(&self) -> Result<Method> {
        parse_method(&self.method)
    }
}

/// Parse a method name case-insensitively.
///
/// # Errors
///
/// Fails for empty input or characters not allowed in an HTTP method.
pub fn parse_method(method: &str) -> Result<Method> {
    let upper = method.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).with_context(|| format!("Invalid HTTP method: {method:?}"))
}

/// A parsed route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteSpec>,
}

impl RouteTable {
    /// Parse a table from TOML text, validating every method.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or an invalid method.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let table: Self = toml::from_str(input).context("Failed to parse route table")?;
        for (index, spec) in table.routes.iter().enumerate() {
            spec.http_method()
                .with_context(|| format!("route #{} ({})", index + 1, spec.pattern))?;
        }
        debug!(routes = table.routes.len(), "Route table parsed");
        Ok(table)
    }

    /// Read and parse a table file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = fs::read_to_string(path)
            .with_context(|| format!("Failed to read route table {}", path.display()))?;
        let table = Self::from_toml_str(&input)
            .with_context(|| format!("Invalid route table {}", path.display()))?;
        info!(
            path = %path.display(),
            routes = table.routes.len(),
            "Route table loaded"
        );
        Ok(table)
    }

    /// Insert every entry into a fresh router configured by `config`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid method.
    pub fn build_router(&self, config: &EngineConfig) -> Result<Router> {
        let mut router = Router::with_precedence(config.precedence)
            .slow_match_threshold(config.slow_match_threshold);
        for spec in &self.routes {
            router.insert(spec.http_method()?, &spec.pattern);
        }
        Ok(router)
    }

    /// Name of the route registered for `method` + `pattern`.
    ///
    /// Later entries win, matching re-registration on the router.
    #[must_use]
    pub fn name_for(&self, method: &Method, pattern: &str) -> Option<&str> {
        self.routes
            .iter()
            .rev()
            .find(|spec| {
                spec.pattern == pattern
                    && spec.http_method().is_ok_and(|m| m == *method)
            })
            .and_then(|spec| spec.name.as_deref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
