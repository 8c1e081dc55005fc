//! # Router Module
//!
//! The router module provides path matching and route resolution for trierouter.
//! Route patterns are stored in one segment trie per HTTP method.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Splitting patterns and request paths into segments
//! - Building a trie per method from the registered patterns
//! - Matching incoming request paths against that trie
//! - Extracting path parameters from the matched pattern
//!
//! ## Pattern Syntax
//!
//! ```text
//!  Syntax    Type
//!  users     literal segment, matches only "users"
//!  :name     named parameter, matches exactly one segment
//!  *name     wildcard, matches one or more trailing segments
//! ```
//!
//! A wildcard must be the last segment of a pattern; anything after it is
//! ignored. Empty segments are dropped, so `/a//b/` and `/a/b` are the same
//! pattern and the same path.
//!
//! ```text
//!  Pattern: /files/*path
//!
//!   /files/LICENSE              match: path="LICENSE"
//!   /files/templates/a.html     match: path="templates/a.html"
//!   /files                      no match
//! ```
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use trierouter::router::Router;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/blog/:category/:post");
//!
//! let m = router.route(&Method::GET, "/blog/rust/request-routers").unwrap();
//! assert_eq!(m.get_path_param("category"), Some("rust"));
//! assert_eq!(m.get_path_param("post"), Some("request-routers"));
//! assert!(router.route(&Method::GET, "/blog/rust").is_none());
//! ```
//!
//! ## Precedence
//!
//! When a literal and a wild child both accept a segment, the literal branch
//! is tried first by default and the wild branch only if it dead-ends. See
//! [`MatchPrecedence`] for the insertion-order alternative.

mod core;
mod segments;
mod trie;

pub use self::core::{ParamVec, RouteEntry, RouteKey, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use segments::{remainder_from, split_segments, SegmentKind, SegmentVec};
pub use trie::MatchPrecedence;
