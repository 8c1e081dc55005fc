//! Router core module - hot path for request routing.
//!
//! Holds one segment trie per HTTP method, resolves request paths against it
//! and derives parameter bindings from the matched pattern.

use http::Method;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::segments::{remainder_from, split_segments, SegmentKind};
use super::trie::{MatchPrecedence, TrieNode};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` because they come from the registered pattern;
/// values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Identity of a registered route: the method plus the registered pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: Method,
    pub pattern: Arc<str>,
}

impl RouteKey {
    #[must_use]
    pub fn new(method: Method, pattern: &str) -> Self {
        Self {
            method,
            pattern: Arc::from(pattern),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// Registered route as reported by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub method: String,
    pub pattern: String,
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Method the route was registered under
    pub method: Method,
    /// The registered pattern that matched (e.g. `/users/:id`)
    pub pattern: Arc<str>,
    /// Parameters bound from the path (e.g. `:id` → `{"id": "42"}`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: a pattern such as
    /// `/org/:id/user/:id` reports the user id.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Key under which the matched route's handler is bound.
    #[must_use]
    pub fn key(&self) -> RouteKey {
        RouteKey {
            method: self.method.clone(),
            pattern: Arc::clone(&self.pattern),
        }
    }

    /// Convert path_params to HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Router that matches HTTP requests to registered patterns using segment tries
///
/// Route lookup is O(k) in the number of path segments for routes without
/// ambiguity; literal/wild ambiguity backtracks within a single level.
#[derive(Debug, Clone, Default)]
pub struct Router {
    /// One trie per HTTP method
    trees: HashMap<Method, TrieNode>,
    /// Candidate order at each trie level
    precedence: MatchPrecedence,
    /// Matches slower than this are logged at warn level
    slow_match_threshold: Option<Duration>,
}

impl Router {
    /// Create an empty router that prefers literal segments over wild ones.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty router with an explicit candidate precedence.
    #[must_use]
    pub fn with_precedence(precedence: MatchPrecedence) -> Self {
        Self {
            precedence,
            ..Self::default()
        }
    }

    /// Log matches taking longer than `threshold` as slow.
    #[must_use]
    pub fn slow_match_threshold(mut self, threshold: Duration) -> Self {
        self.slow_match_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn precedence(&self) -> MatchPrecedence {
        self.precedence
    }

    /// Insert `pattern` into the trie for `method`.
    ///
    /// Returns the key the route's handler should be bound under. Inserting
    /// the same pair twice is a no-op on the trie.
    pub fn insert(&mut self, method: Method, pattern: &str) -> RouteKey {
        let key = RouteKey::new(method, pattern);
        let segments = split_segments(pattern);

        if segments.len() < pattern_segment_count(pattern) {
            warn!(
                method = %key.method,
                pattern = %pattern,
                "Segments after a wildcard are ignored"
            );
        }

        let insertion = self
            .trees
            .entry(key.method.clone())
            .or_default()
            .insert(&key.pattern, &segments, 0);

        if let Some(shadowed) = insertion.shadowed {
            warn!(
                method = %key.method,
                pattern = %pattern,
                shadowed_pattern = %shadowed,
                "Pattern replaces an existing route with the same shape"
            );
        }
        for (previous, segment) in insertion.retyped {
            warn!(
                method = %key.method,
                pattern = %pattern,
                previous_segment = %previous,
                segment = %segment,
                "Wild segment changed kind"
            );
        }

        key
    }

    /// Match an HTTP request to a registered pattern
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - If a matching route is found
    /// * `None` - If no trie exists for the method or no pattern matches
    ///
    /// # Example
    ///
    /// ```rust
    /// use http::Method;
    /// use trierouter::router::Router;
    ///
    /// let mut router = Router::new();
    /// router.insert(Method::GET, "/users/:id");
    ///
    /// let m = router.route(&Method::GET, "/users/42").unwrap();
    /// assert_eq!(&*m.pattern, "/users/:id");
    /// assert_eq!(m.get_path_param("id"), Some("42"));
    /// ```
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        let result = self.trees.get(method).and_then(|root| {
            let segments = split_segments(path);
            root.search(&segments, 0, self.precedence)
                .map(|pattern| (Arc::clone(pattern), extract_params(pattern, &segments, path)))
        });
        let match_duration = match_start.elapsed();

        let Some((pattern, path_params)) = result else {
            warn!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            return None;
        };

        if self
            .slow_match_threshold
            .is_some_and(|threshold| match_duration > threshold)
        {
            warn!(
                method = %method,
                path = %path,
                route_pattern = %pattern,
                path_params = ?path_params,
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %method,
                path = %path,
                route_pattern = %pattern,
                path_params = ?path_params,
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
        }

        Some(RouteMatch {
            method: method.clone(),
            pattern,
            path_params,
        })
    }

    /// `true` if no pattern has been inserted for any method.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// All registered routes, sorted by method then pattern.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteEntry> {
        let mut entries = Vec::new();
        for (method, root) in &self.trees {
            let mut patterns = Vec::new();
            root.collect_patterns(&mut patterns);
            entries.extend(patterns.into_iter().map(|pattern| RouteEntry {
                method: method.to_string(),
                pattern: pattern.to_string(),
            }));
        }
        entries.sort_by(|a, b| (&a.method, &a.pattern).cmp(&(&b.method, &b.pattern)));
        entries
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        let routes = self.routes();
        println!("[routes] count={}", routes.len());
        for route in routes {
            println!("[route] {} {}", route.method, route.pattern);
        }
    }
}

/// Number of non-empty segments in `pattern`, ignoring the wildcard cut-off.
fn pattern_segment_count(pattern: &str) -> usize {
    pattern.split('/').filter(|s| !s.is_empty()).count()
}

/// Bind the path segments to the parameter names of `pattern`.
///
/// `segments` is the split request path that matched `pattern`; `path` is the
/// raw request path, used so a wildcard captures everything after it.
pub(crate) fn extract_params(pattern: &str, segments: &[&str], path: &str) -> ParamVec {
    let shape = split_segments(pattern);
    debug_assert!(
        shape.len() <= segments.len(),
        "pattern {pattern} has more segments than the path that matched it"
    );

    let mut params = ParamVec::new();
    for (i, segment) in shape.iter().enumerate() {
        match SegmentKind::of(segment) {
            SegmentKind::Literal(_) => {}
            SegmentKind::Param(name) => {
                if let Some(value) = segments.get(i) {
                    params.push((Arc::from(name), (*value).to_string()));
                }
            }
            SegmentKind::Wildcard(Some(name)) => {
                params.push((Arc::from(name), remainder_from(path, i)));
                break;
            }
            SegmentKind::Wildcard(None) => break,
        }
    }
    params
}
