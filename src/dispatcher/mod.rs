//! # Dispatcher Module
//!
//! The dispatcher binds handlers to routes and invokes the right one for a
//! matched request.
//!
//! ## Request Flow
//!
//! 1. Router matches the incoming request → pattern + parameters
//! 2. Dispatcher looks up the handler by `(method, pattern)`
//! 3. Parameters are attached to the [`RequestContext`](crate::context::RequestContext)
//! 4. The handler writes status and body through the context
//!
//! ## Error Handling
//!
//! - A matched route without a handler is logged and reported as
//!   [`RouteError::MissingHandler`](crate::error::RouteError::MissingHandler);
//!   no handler runs
//! - Handler panics are caught and answered with 500

mod core;

pub use self::core::{BoxedHandler, Dispatcher, Handler};
