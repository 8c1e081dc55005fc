use http::StatusCode;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::context::RequestContext;
use crate::error::RouteError;
use crate::router::{RouteKey, RouteMatch};

/// A request handler.
///
/// Implemented for every `Fn(&mut RequestContext) + Send + Sync`, so plain
/// closures and functions can be registered directly.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext);
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    #[inline]
    fn call(&self, ctx: &mut RequestContext) {
        self(ctx)
    }
}

/// Shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Dispatcher that invokes the handler bound to a matched route
///
/// Handlers are keyed by [`RouteKey`] (method + registered pattern), so the
/// pattern reported by the router maps straight onto its handler.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<RouteKey, BoxedHandler>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Dispatcher {
    /// Create a new empty dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `key`.
    ///
    /// **IMPORTANT**: If a handler is already bound to the same key it is
    /// replaced; only the new handler runs for subsequent requests.
    pub fn add_route(&mut self, key: RouteKey, handler: BoxedHandler) {
        if self.handlers.insert(key.clone(), handler).is_some() {
            warn!(
                route = %key,
                total_handlers = self.handlers.len(),
                "Replaced existing handler"
            );
        } else {
            info!(
                route = %key,
                total_handlers = self.handlers.len(),
                "Handler registered successfully"
            );
        }
    }

    /// Unbind the handler for `key`, returning it.
    pub fn remove_route(&mut self, key: &RouteKey) -> Option<BoxedHandler> {
        self.handlers.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &RouteKey) -> bool {
        self.handlers.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a matched request to its handler
    ///
    /// Attaches the route's parameters and pattern to `ctx`, then runs the
    /// bound handler. A handler panic is caught and answered with 500.
    ///
    /// # Errors
    ///
    /// * [`RouteError::MissingHandler`] - nothing is bound to the matched
    ///   route; no handler runs and `ctx`'s response is left untouched
    /// * [`RouteError::HandlerPanicked`] - the handler panicked
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        ctx: &mut RequestContext,
    ) -> Result<(), RouteError> {
        let key = route_match.key();

        debug!(
            route = %key,
            available_handlers = self.handlers.len(),
            "Handler lookup"
        );

        let Some(handler) = self.handlers.get(&key) else {
            error!(
                request_id = %ctx.request_id,
                method = %key.method,
                path = %ctx.path,
                route_pattern = %key.pattern,
                "Handler not found - CRITICAL"
            );
            return Err(RouteError::MissingHandler {
                method: key.method,
                pattern: key.pattern,
            });
        };

        ctx.params = route_match.path_params;
        ctx.pattern = Some(Arc::clone(&key.pattern));

        info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            route_pattern = %key.pattern,
            path_params = ?ctx.params,
            "Request start"
        );

        let execution_start = Instant::now();
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler.call(ctx))) {
            let message = panic_message(panic.as_ref());
            error!(
                request_id = %ctx.request_id,
                route_pattern = %key.pattern,
                panic_message = %message,
                "Handler panicked - CRITICAL"
            );
            ctx.text(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("500 INTERNAL SERVER ERROR: {}\n", ctx.path),
            );
            return Err(RouteError::HandlerPanicked {
                method: key.method,
                pattern: key.pattern,
                message,
            });
        }

        debug!(
            request_id = %ctx.request_id,
            route_pattern = %key.pattern,
            status = ctx.status().as_u16(),
            execution_time_us = execution_start.elapsed().as_micros(),
            "Request complete"
        );
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn routed(router: &Router, method: Method, path: &str) -> (RouteMatch, RequestContext) {
        let m = router.route(&method, path).unwrap();
        (m, RequestContext::from_parts(method, path))
    }

    #[test]
    fn test_dispatch_attaches_params() {
        let mut router = Router::new();
        let key = router.insert(Method::GET, "/users/:id");
        let mut dispatcher = Dispatcher::new();
        dispatcher.add_route(
            key,
            Arc::new(|ctx: &mut RequestContext| {
                let id = ctx.param("id").unwrap_or_default().to_string();
                ctx.text(StatusCode::OK, id);
            }),
        );

        let (m, mut ctx) = routed(&router, Method::GET, "/users/42");
        dispatcher.dispatch(m, &mut ctx).unwrap();
        assert_eq!(ctx.pattern.as_deref(), Some("/users/:id"));
        assert_eq!(ctx.response().body, b"42");
    }

    #[test]
    fn test_missing_handler_leaves_response_untouched() {
        let mut router = Router::new();
        router.insert(Method::GET, "/orphan");
        let dispatcher = Dispatcher::new();

        let (m, mut ctx) = routed(&router, Method::GET, "/orphan");
        let err = dispatcher.dispatch(m, &mut ctx).unwrap_err();
        assert!(matches!(err, RouteError::MissingHandler { .. }));
        assert_eq!(ctx.status(), StatusCode::OK);
        assert!(ctx.response().body.is_empty());
        assert!(ctx.pattern.is_none());
    }

    #[test]
    fn test_replacing_handler() {
        let mut router = Router::new();
        let key = router.insert(Method::GET, "/x");
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = Dispatcher::new();
        let counter = Arc::clone(&first);
        dispatcher.add_route(
            key.clone(),
            Arc::new(move |_: &mut RequestContext| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = Arc::clone(&second);
        dispatcher.add_route(
            key,
            Arc::new(move |_: &mut RequestContext| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(dispatcher.len(), 1);

        let (m, mut ctx) = routed(&router, Method::GET, "/x");
        dispatcher.dispatch(m, &mut ctx).unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_handler_returns_500() {
        let mut router = Router::new();
        let key = router.insert(Method::POST, "/boom");
        let mut dispatcher = Dispatcher::new();
        dispatcher.add_route(
            key,
            Arc::new(|_: &mut RequestContext| panic!("kaboom")),
        );

        let (m, mut ctx) = routed(&router, Method::POST, "/boom");
        let err = dispatcher.dispatch(m, &mut ctx).unwrap_err();
        match err {
            RouteError::HandlerPanicked { message, .. } => assert_eq!(message, "kaboom"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
