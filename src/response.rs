//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] and return it; the server turns it into the
//! hyper response that goes on the wire. Content-Length is always set
//! explicitly from the body.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use siteserve::Response;
///
/// Response::json(br#"{"status":"ok"}"#.to_vec());
/// Response::html("<h1>hello</h1>");
/// Response::text("hello");
/// Response::status(http::StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status, headers, or content type)
///
/// ```rust
/// use http::StatusCode;
/// use siteserve::Response;
///
/// Response::builder()
///     .status(StatusCode::MOVED_PERMANENTLY)
///     .header("location", "/docs/")
///     .empty();
///
/// Response::builder()
///     .status(StatusCode::OK)
///     .body("image/png", vec![/* bytes */]);
/// ```
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Response {
    /// `200 OK` — `application/json; charset=utf-8`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::with_content_type("application/json; charset=utf-8", body)
    }

    /// `200 OK` — `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_content_type("text/html; charset=utf-8", body.into().into_bytes())
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: StatusCode::OK, headers: HeaderMap::new() }
    }

    fn with_content_type(content_type: &'static str, body: Vec<u8>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self { status: StatusCode::OK, headers, body: body.into() }
    }

    /// Converts into the hyper response the connection task writes out.
    pub(crate) fn into_inner(mut self) -> http::Response<Full<Bytes>> {
        self.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`]. Defaults to `200 OK`.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    ///
    /// # Panics
    ///
    /// Panics on an invalid header name or value — headers are authored by
    /// the application, so a bad one is a programming error, caught the
    /// same way an invalid route registration is.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name)
            .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::try_from(value)
            .unwrap_or_else(|e| panic!("invalid header value for `{name}`: {e}"));
        self.headers.insert(name, value);
        self
    }

    /// Terminate with a JSON body.
    pub fn json(self, body: Vec<u8>) -> Response {
        self.body("application/json; charset=utf-8", body)
    }

    /// Terminate with an HTML body.
    pub fn html(self, body: impl Into<String>) -> Response {
        self.body("text/html; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with a plain-text body.
    pub fn text(self, body: impl Into<String>) -> Response {
        self.body("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with a body of arbitrary content type — static files get
    /// their type from an extension table, not an enum.
    pub fn body(mut self, content_type: &str, body: Vec<u8>) -> Response {
        if !self.headers.contains_key(CONTENT_TYPE) {
            let value = HeaderValue::try_from(content_type)
                .unwrap_or_else(|e| panic!("invalid content type `{content_type}`: {e}"));
            self.headers.insert(CONTENT_TYPE, value);
        }
        Response { status: self.status, headers: self.headers, body: body.into() }
    }

    /// Terminate with no body (redirects, bare status codes).
    pub fn empty(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`], so handlers can return plain values.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}
