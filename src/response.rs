//! Outgoing HTTP response type.
//!
//! Every response is fully buffered: the body is a `Vec<u8>` that hyper
//! writes in one go behind a `content-length` header. Nothing streams.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values the relay produces itself. Forwarded upstream types go
/// through [`ResponseBuilder::typed`] untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Json, // application/json
    Text, // text/plain
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }

    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use http::StatusCode;
/// use momo_relay::{ContentType, Response};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NOT_IMPLEMENTED);
///
/// Response::builder()
///     .status(StatusCode::BAD_GATEWAY)
///     .bytes(ContentType::Json, br#"{"error":"proxy_failed"}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: HeaderMap,
    pub(crate) status: StatusCode,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().bytes(ContentType::Json, body)
    }

    /// `200 OK` — `text/plain`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body and no content type.
    pub fn status(code: StatusCode) -> Self {
        Self { body: Vec::new(), headers: HeaderMap::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Sets `name`, replacing any value already present.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Converts into the hyper response written to the wire.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`. Terminated by a
/// body method, which also sets the content type.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Terminate with a plain-text body (`text/plain`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.typed(ContentType::Text.header_value(), body.into().into_bytes())
    }

    /// Terminate with one of the relay's own content types.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.typed(content_type.header_value(), body)
    }

    /// Terminate with an arbitrary content type, e.g. one copied from upstream.
    pub fn typed(mut self, content_type: HeaderValue, body: Vec<u8>) -> Response {
        self.headers.insert(CONTENT_TYPE, content_type);
        Response { body, headers: self.headers, status: self.status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_plain_without_charset() {
        let res = Response::text("hi");
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(res.body(), b"hi");
    }

    #[test]
    fn typed_keeps_foreign_content_type() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .typed(HeaderValue::from_static("text/csv; charset=utf-8"), b"a,b".to_vec());
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/csv; charset=utf-8");
    }

    #[test]
    fn into_inner_carries_status_headers_body() {
        let mut res = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .bytes(ContentType::Json, br#"{"x":1}"#.to_vec());
        res.set_header(HeaderName::from_static("x-extra"), HeaderValue::from_static("1"));

        let inner = res.into_inner();
        assert_eq!(inner.status(), StatusCode::NOT_FOUND);
        assert_eq!(inner.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(inner.headers()["x-extra"], "1");
    }
}
