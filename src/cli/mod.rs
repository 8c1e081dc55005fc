//! # CLI Module
//!
//! Command-line access to route tables (see [`crate::table`]).
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List the routes of a table, sorted by method then pattern:
//!
//! ```bash
//! trierouter routes --table routes.toml
//! trierouter routes --table routes.toml --json
//! ```
//!
//! ### `resolve`
//!
//! Match a request against a table and print the result as JSON:
//!
//! ```bash
//! trierouter resolve --table routes.toml GET /users/42
//! ```
//!
//! When no route matches it prints `{"matched": false, ...}` and exits with
//! status 1.
//!
//! ## Environment
//!
//! - `TRIEROUTER_TABLE` - default for `--table`
//! - `TRIEROUTER_MATCH_PRECEDENCE`, `TRIEROUTER_SLOW_MATCH_US` - see
//!   [`crate::config`]
//! - `TRIEROUTER_LOG_*` - see [`crate::logging`]; logs go to stderr

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
