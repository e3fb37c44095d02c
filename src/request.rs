//! Incoming HTTP request type.

use http::Method;

/// An incoming HTTP request.
///
/// The relay only ever issues bodiless GETs upstream, so neither the inbound
/// body nor the inbound headers are kept.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) target: String,
}

impl Request {
    pub(crate) fn new<B>(req: &http::Request<B>) -> Self {
        let target = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned());
        Self { method: req.method().clone(), target }
    }

    pub fn method(&self) -> &Method { &self.method }

    /// Path without the query component.
    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Path plus `?query`, byte-for-byte as the client sent it.
    pub fn target(&self) -> &str { &self.target }
}
