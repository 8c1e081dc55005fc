//! # Engine
//!
//! The [`Engine`] ties the [`Router`] and the [`Dispatcher`] together: it keeps
//! trie insertion and handler binding in lock-step, resolves requests and runs
//! the bound handler with a [`RequestContext`].
//!
//! ## Lifecycle
//!
//! Routes are registered through `&mut Engine`, typically during startup.
//! Once registration is done the engine is shared read-only (`Arc<Engine>`)
//! across serving threads; lookups never lock.
//!
//! When routes must change while traffic is flowing, wrap the engine in a
//! [`SharedEngine`]. Updates clone the current engine, apply the change and
//! publish the result atomically; in-flight requests keep the snapshot they
//! started with.
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, Request, StatusCode};
//! use trierouter::{Engine, RequestContext};
//!
//! let mut engine = Engine::new();
//! engine.get("/hello/:name", |ctx: &mut RequestContext| {
//!     let name = ctx.param("name").unwrap_or("world").to_string();
//!     ctx.text(StatusCode::OK, format!("Hello, {name}!"));
//! });
//!
//! let request = Request::get("/hello/ferris").body(Vec::new()).unwrap();
//! let response = engine.serve(request);
//! assert_eq!(response.body(), b"Hello, ferris!");
//! ```

use arc_swap::ArcSwap;
use http::{Method, Request, Response};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::context::RequestContext;
use crate::dispatcher::{BoxedHandler, Dispatcher, Handler};
use crate::error::RouteError;
use crate::logging::Logger;
use crate::router::{RouteEntry, RouteKey, RouteMatch, Router};

/// Router plus handler bindings plus the injected logger.
#[derive(Debug, Clone)]
pub struct Engine {
    router: Router,
    dispatcher: Dispatcher,
    logger: Logger,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with default configuration, logging to the ambient subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), Logger::inherit())
    }

    /// Engine with default configuration and an explicit logger.
    #[must_use]
    pub fn with_logger(logger: Logger) -> Self {
        Self::with_config(EngineConfig::default(), logger)
    }

    #[must_use]
    pub fn with_config(config: EngineConfig, logger: Logger) -> Self {
        Self {
            router: Router::with_precedence(config.precedence)
                .slow_match_threshold(config.slow_match_threshold),
            dispatcher: Dispatcher::new(),
            logger,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Register `handler` for `method` + `pattern`.
    ///
    /// Registering the same pair again replaces the handler.
    pub fn register<H: Handler>(&mut self, method: Method, pattern: &str, handler: H) -> RouteKey {
        self.register_boxed(method, pattern, Arc::new(handler))
    }

    /// Register an already shared handler.
    pub fn register_boxed(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxedHandler,
    ) -> RouteKey {
        self.logger.scope(|| {
            let key = self.router.insert(method, pattern);
            self.dispatcher.add_route(key.clone(), handler);
            key
        })
    }

    /// Register a handler for GET requests
    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::GET, pattern, handler)
    }

    /// Register a handler for POST requests
    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::POST, pattern, handler)
    }

    /// Register a handler for PUT requests
    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::PUT, pattern, handler)
    }

    /// Register a handler for DELETE requests
    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::DELETE, pattern, handler)
    }

    /// Register a handler for PATCH requests
    pub fn patch<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::PATCH, pattern, handler)
    }

    /// Register a handler for HEAD requests
    pub fn head<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::HEAD, pattern, handler)
    }

    /// Register a handler for OPTIONS requests
    pub fn options<H: Handler>(&mut self, pattern: &str, handler: H) -> RouteKey {
        self.register(Method::OPTIONS, pattern, handler)
    }

    /// Find the route for `method` + `path` and bind its parameters.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.logger.scope(|| self.router.route(method, path))
    }

    /// Route `ctx` and run the matching handler.
    ///
    /// Returns the matched pattern.
    ///
    /// # Errors
    ///
    /// * [`RouteError::NotFound`] - nothing matched; `ctx` already holds the
    ///   404 response naming the path
    /// * [`RouteError::MissingHandler`] - a pattern matched with nothing bound
    ///   to it; no handler ran
    /// * [`RouteError::HandlerPanicked`] - the handler panicked; `ctx` holds a
    ///   500 response
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Result<Arc<str>, RouteError> {
        self.logger.scope(|| match self.router.route(&ctx.method, &ctx.path) {
            Some(route_match) => {
                let pattern = Arc::clone(&route_match.pattern);
                self.dispatcher.dispatch(route_match, ctx)?;
                Ok(pattern)
            }
            None => {
                ctx.not_found();
                Err(RouteError::NotFound {
                    method: ctx.method.clone(),
                    path: ctx.path.clone(),
                })
            }
        })
    }

    /// Run a whole request through [`Engine::dispatch`] and build the response.
    ///
    /// A missing handler is answered with 500.
    pub fn serve(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let mut ctx = RequestContext::new(request);
        if let Err(err @ RouteError::MissingHandler { .. }) = self.dispatch(&mut ctx) {
            let body = format!("500 INTERNAL SERVER ERROR: {}\n", ctx.path);
            ctx.text(err.status(), body);
        }
        ctx.into_response()
    }

    /// All registered routes, sorted by method then pattern.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.router.routes()
    }

    /// Routes reachable in the trie that have no handler bound.
    ///
    /// Always empty while routes are only added through this engine.
    #[must_use]
    pub fn unbound_routes(&self) -> Vec<RouteKey> {
        self.router
            .routes()
            .into_iter()
            .filter_map(|entry| {
                let method = entry.method.parse::<Method>().ok()?;
                let key = RouteKey::new(method, &entry.pattern);
                (!self.dispatcher.contains(&key)).then_some(key)
            })
            .collect()
    }

    /// Publish this engine behind a swappable snapshot.
    #[must_use]
    pub fn into_shared(self) -> SharedEngine {
        SharedEngine::new(self)
    }
}

/// Engine behind an atomically swappable snapshot.
///
/// Cloning is cheap; all clones observe the same snapshot.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<ArcSwap<Engine>>,
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("current", &self.inner.load_full())
            .finish()
    }
}

impl SharedEngine {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(engine)),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<Engine> {
        self.inner.load_full()
    }

    /// Dispatch against the current snapshot.
    ///
    /// # Errors
    ///
    /// See [`Engine::dispatch`].
    pub fn dispatch(&self, ctx: &mut RequestContext) -> Result<Arc<str>, RouteError> {
        self.load().dispatch(ctx)
    }

    /// Serve against the current snapshot.
    pub fn serve(&self, request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        self.load().serve(request)
    }

    /// Apply `f` to a copy of the current engine and publish the copy.
    ///
    /// Concurrent updates are retried, so `f` may run more than once.
    pub fn update<F>(&self, mut f: F)
    where
        F: FnMut(&mut Engine),
    {
        self.inner.rcu(|current| {
            let mut next = Engine::clone(current);
            f(&mut next);
            next
        });
    }

    /// Replace the whole engine.
    pub fn replace(&self, engine: Engine) {
        self.inner.store(Arc::new(engine));
    }
}
