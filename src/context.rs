//! Per-request context handed to handlers.
//!
//! A [`RequestContext`] wraps the parsed `http::Request`, carries the
//! parameters bound by the router and collects the response the handler
//! writes. The serving layer turns it back into an `http::Response` with
//! [`RequestContext::into_response`].

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use std::borrow::Cow;
use std::sync::Arc;

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::ParamVec;

/// Response under construction.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

/// Request data plus response-writing capability for one request.
#[derive(Debug)]
pub struct RequestContext {
    /// Correlation id, from `x-request-id` or generated
    pub request_id: RequestId,
    /// HTTP method of the request
    pub method: Method,
    /// URL path, percent-decoded, without the query string
    pub path: String,
    /// Parameters bound by the matched route
    pub params: ParamVec,
    /// Pattern of the matched route, set by the dispatcher
    pub pattern: Option<Arc<str>>,
    request: Request<Vec<u8>>,
    response: ResponseWriter,
}

impl RequestContext {
    /// Build a context for an incoming request.
    #[must_use]
    pub fn new(request: Request<Vec<u8>>) -> Self {
        let request_id = RequestId::from_header_or_new(
            request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        Self {
            request_id,
            method: request.method().clone(),
            path: decode_path(request.uri().path()),
            params: ParamVec::new(),
            pattern: None,
            request,
            response: ResponseWriter::default(),
        }
    }

    /// Shorthand for a bodiless request, mostly useful in tests.
    ///
    /// Falls back to `/` if `uri` cannot be parsed.
    #[must_use]
    pub fn from_parts(method: Method, uri: &str) -> Self {
        let mut request = Request::new(Vec::new());
        *request.method_mut() = method;
        *request.uri_mut() = uri.parse().unwrap_or_else(|_| http::Uri::from_static("/"));
        Self::new(request)
    }

    /// The underlying request.
    #[must_use]
    pub fn request(&self) -> &Request<Vec<u8>> {
        &self.request
    }

    /// Value bound to a route parameter, e.g. `id` for `/users/:id`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value of a query string parameter, percent-decoded.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Request header by name (case-insensitive), if it is valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw request body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.request.body()
    }

    /// Request body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.request.body())
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers.insert(name, value);
    }

    /// Append bytes to the response body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.response.body.extend_from_slice(bytes.as_ref());
    }

    /// Replace the response with a `text/plain` body.
    pub fn text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.set_status(status);
        self.set_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        self.response.body = body.into().into_bytes();
    }

    /// Answer with 404 and a diagnostic naming the requested path.
    pub fn not_found(&mut self) {
        let body = format!("404 NOT FOUND: {}\n", self.path);
        self.text(StatusCode::NOT_FOUND, body);
    }

    /// The response written so far.
    #[must_use]
    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// Finish the request and build the `http::Response`.
    #[must_use]
    pub fn into_response(self) -> Response<Vec<u8>> {
        let ResponseWriter {
            status,
            headers,
            body,
        } = self.response;
        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Percent-decode a request path; invalid UTF-8 keeps the raw form.
fn decode_path(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
