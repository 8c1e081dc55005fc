//! # trierouter
//!
//! **trierouter** is a small HTTP request router built on per-method segment
//! tries. Patterns are made of literal segments, named parameters (`:name`)
//! and a trailing wildcard (`*name`); a lookup finds the single best matching
//! pattern, binds its parameters and runs the handler registered for it.
//!
//! ## Architecture
//!
//! - **[`router`]** - Path splitting, the segment trie and parameter binding
//! - **[`dispatcher`]** - Handler bindings keyed by method + pattern
//! - **[`engine`]** - Router and dispatcher kept in lock-step, plus a
//!   swappable [`SharedEngine`] for runtime route updates
//! - **[`context`]** - The per-request context handlers read from and write to
//! - **[`logging`]** - `tracing` setup and the injected [`Logger`]
//! - **[`config`]** - Engine tuning from the environment
//! - **[`table`]** - Declarative TOML route tables
//! - **[`cli`]** - The `trierouter` command-line tool
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use trierouter::{Engine, RequestContext, RouteError};
//!
//! let mut engine = Engine::new();
//! engine.get("/users/:id", |ctx: &mut RequestContext| {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.text(StatusCode::OK, format!("user {id}"));
//! });
//!
//! let mut ctx = RequestContext::from_parts(Method::GET, "/users/42");
//! engine.dispatch(&mut ctx).unwrap();
//! assert_eq!(ctx.response().body, b"user 42");
//!
//! let mut missing = RequestContext::from_parts(Method::GET, "/nope");
//! assert!(matches!(engine.dispatch(&mut missing), Err(RouteError::NotFound { .. })));
//! assert_eq!(missing.status(), StatusCode::NOT_FOUND);
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut Engine`; lookups take `&Engine` and never lock, so
//! a finished engine can be shared across threads behind an `Arc`. Use
//! [`SharedEngine`] when routes change while requests are being served.

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod ids;
pub mod logging;
pub mod router;
pub mod table;

pub use config::{EngineConfig, MatchPrecedence};
pub use context::{RequestContext, ResponseWriter};
pub use dispatcher::{BoxedHandler, Dispatcher, Handler};
pub use engine::{Engine, SharedEngine};
pub use error::RouteError;
pub use ids::RequestId;
pub use logging::{LogConfig, Logger};
pub use router::{split_segments, RouteEntry, RouteKey, RouteMatch, Router};
pub use table::{RouteSpec, RouteTable};
