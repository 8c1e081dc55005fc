//! # Engine Configuration
//!
//! Runtime behaviour of the [`Engine`](crate::engine::Engine) that is worth
//! tuning per deployment, loaded from environment variables.
//!
//! ## Environment Variables
//!
//! ### `TRIEROUTER_MATCH_PRECEDENCE`
//!
//! Order in which sibling trie children are tried:
//! - `literal-first` (default): `/users/me` beats `/users/:id` for `/users/me`
//!   regardless of registration order
//! - `insertion-order`: whichever child was registered first is tried first
//!
//! ### `TRIEROUTER_SLOW_MATCH_US`
//!
//! Route lookups slower than this many microseconds are logged at `warn`
//! instead of `info`. Default: `1000` (1 ms).
//!
//! ## Usage
//!
//! ```rust
//! use trierouter::config::EngineConfig;
//!
//! let config = EngineConfig::from_env();
//! println!("precedence: {:?}", config.precedence);
//! ```

use std::env;
use std::time::Duration;

pub use crate::router::MatchPrecedence;

const DEFAULT_SLOW_MATCH_US: u64 = 1_000;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Candidate order at each trie level
    pub precedence: MatchPrecedence,
    /// Lookups slower than this are reported as slow
    pub slow_match_threshold: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precedence: MatchPrecedence::LiteralFirst,
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let precedence = env::var("TRIEROUTER_MATCH_PRECEDENCE")
            .map(|v| MatchPrecedence::parse(&v))
            .unwrap_or_default();
        let slow_match_us = env::var("TRIEROUTER_SLOW_MATCH_US")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        Self {
            precedence,
            slow_match_threshold: Duration::from_micros(slow_match_us),
        }
    }

    #[must_use]
    pub fn with_precedence(mut self, precedence: MatchPrecedence) -> Self {
        self.precedence = precedence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.precedence, MatchPrecedence::LiteralFirst);
        assert_eq!(config.slow_match_threshold, Duration::from_millis(1));
    }

    #[test]
    fn test_with_precedence() {
        let config = EngineConfig::default().with_precedence(MatchPrecedence::InsertionOrder);
        assert_eq!(config.precedence, MatchPrecedence::InsertionOrder);
    }
}
