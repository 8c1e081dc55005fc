use http::{Method, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trierouter::{Dispatcher, RequestContext, RouteError, RouteKey, Router};

mod common;
use common::log_capture::LogCapture;

fn counting_handler(counter: &Arc<AtomicUsize>) -> trierouter::BoxedHandler {
    let counter = Arc::clone(counter);
    Arc::new(move |ctx: &mut RequestContext| {
        counter.fetch_add(1, Ordering::SeqCst);
        ctx.text(StatusCode::OK, "counted");
    })
}

fn dispatch(
    router: &Router,
    dispatcher: &Dispatcher,
    method: Method,
    path: &str,
) -> (Result<(), RouteError>, RequestContext) {
    let mut ctx = RequestContext::from_parts(method.clone(), path);
    let route_match = router.route(&method, path).unwrap();
    let result = dispatcher.dispatch(route_match, &mut ctx);
    (result, ctx)
}

#[test]
fn test_dispatch_to_bound_handler() {
    let mut router = Router::new();
    let mut dispatcher = Dispatcher::new();
    let key = router.insert(Method::GET, "/pets/:id/toys/:toy");
    dispatcher.add_route(
        key,
        Arc::new(|ctx: &mut RequestContext| {
            let body = format!(
                "{}:{}",
                ctx.param("id").unwrap_or_default(),
                ctx.param("toy").unwrap_or_default()
            );
            ctx.text(StatusCode::OK, body);
        }),
    );

    let (result, ctx) = dispatch(&router, &dispatcher, Method::GET, "/pets/12/toys/ball");
    result.unwrap();
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(ctx.response().body, b"12:ball");
    assert_eq!(ctx.pattern.as_deref(), Some("/pets/:id/toys/:toy"));
}

#[test]
fn test_handlers_keyed_by_method_and_pattern() {
    let mut router = Router::new();
    let mut dispatcher = Dispatcher::new();
    let gets = Arc::new(AtomicUsize::new(0));
    let posts = Arc::new(AtomicUsize::new(0));
    dispatcher.add_route(router.insert(Method::GET, "/pets"), counting_handler(&gets));
    dispatcher.add_route(router.insert(Method::POST, "/pets"), counting_handler(&posts));

    dispatch(&router, &dispatcher, Method::POST, "/pets").0.unwrap();
    dispatch(&router, &dispatcher, Method::POST, "/pets").0.unwrap();
    dispatch(&router, &dispatcher, Method::GET, "/pets").0.unwrap();

    assert_eq!(gets.load(Ordering::SeqCst), 1);
    assert_eq!(posts.load(Ordering::SeqCst), 2);
    assert!(dispatcher.contains(&RouteKey::new(Method::POST, "/pets")));
    assert!(!dispatcher.contains(&RouteKey::new(Method::PUT, "/pets")));
}

#[test]
fn test_second_registration_replaces_first() {
    let capture = LogCapture::new();
    let mut router = Router::new();
    let mut dispatcher = Dispatcher::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    capture.logger().scope(|| {
        dispatcher.add_route(router.insert(Method::GET, "/x"), counting_handler(&first));
        dispatcher.add_route(router.insert(Method::GET, "/x"), counting_handler(&second));
    });

    dispatch(&router, &dispatcher, Method::GET, "/x").0.unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.len(), 1);
    assert_eq!(capture.count("Handler registered successfully"), 1);
    assert_eq!(capture.count("Replaced existing handler"), 1);
}

#[test]
fn test_missing_handler_is_logged_and_not_invoked() {
    let capture = LogCapture::new();
    let mut router = Router::new();
    let mut dispatcher = Dispatcher::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let key = router.insert(Method::GET, "/gone");
    dispatcher.add_route(key.clone(), counting_handler(&counter));
    assert!(dispatcher.remove_route(&key).is_some());
    assert!(dispatcher.is_empty());

    let (result, ctx) = capture
        .logger()
        .scope(|| dispatch(&router, &dispatcher, Method::GET, "/gone"));

    assert_eq!(
        result,
        Err(RouteError::MissingHandler {
            method: Method::GET,
            pattern: Arc::from("/gone"),
        })
    );
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.status(), StatusCode::OK);
    assert!(ctx.response().body.is_empty());

    let event = capture.find("Handler not found - CRITICAL").unwrap();
    assert_eq!(event.level, tracing::Level::ERROR);
    assert_eq!(event.field("route_pattern"), Some("/gone"));
}

#[test]
fn test_panicking_handler_is_contained() {
    let capture = LogCapture::new();
    let mut router = Router::new();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_route(
        router.insert(Method::PUT, "/explode/:what"),
        Arc::new(|ctx: &mut RequestContext| {
            let what = ctx.param("what").unwrap_or_default().to_string();
            panic!("cannot handle {what}");
        }),
    );

    let (result, ctx) = capture
        .logger()
        .scope(|| dispatch(&router, &dispatcher, Method::PUT, "/explode/now"));

    match result {
        Err(RouteError::HandlerPanicked { message, pattern, .. }) => {
            assert_eq!(message, "cannot handle now");
            assert_eq!(&*pattern, "/explode/:what");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8_lossy(&ctx.response().body).contains("/explode/now"));
    assert!(capture.find("Handler panicked - CRITICAL").is_some());
}

#[test]
fn test_request_lifecycle_is_logged_with_request_id() {
    let capture = LogCapture::new();
    let mut router = Router::new();
    let mut dispatcher = Dispatcher::new();
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.add_route(router.insert(Method::GET, "/ping"), counting_handler(&counter));

    let request = http::Request::get("/ping")
        .header("x-request-id", "req-123")
        .body(Vec::new())
        .unwrap();
    let mut ctx = RequestContext::new(request);
    let route_match = router.route(&Method::GET, "/ping").unwrap();
    capture
        .logger()
        .scope(|| dispatcher.dispatch(route_match, &mut ctx))
        .unwrap();

    let start = capture.find("Request start").unwrap();
    assert_eq!(start.field("request_id"), Some("req-123"));
    assert_eq!(start.field("route_pattern"), Some("/ping"));
    let complete = capture.find("Request complete").unwrap();
    assert_eq!(complete.field("request_id"), Some("req-123"));
    assert_eq!(complete.field("status"), Some("200"));
}
