//! Permissive cross-origin headers.
//!
//! The relay exists so a browser page on another origin can read the upstream
//! API, so every response allows any origin. The values are fixed.

use http::HeaderValue;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};

use crate::response::Response;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Sets the three `Access-Control-Allow-*` headers, overwriting any value a
/// handler (or the upstream) put there.
pub fn decorate(mut res: Response) -> Response {
    res.set_header(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    res.set_header(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    res.set_header(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    res
}
