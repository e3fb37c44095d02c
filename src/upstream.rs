//! The fixed upstream and the one request the relay ever makes to it.
//!
//! A fetch ends in one of three ways:
//!
//! | Outcome | Meaning | Relay answer |
//! |---|---|---|
//! | `Ok(UpstreamReply)` | upstream answered below 400 | forwarded as-is |
//! | `Err(UpstreamError::Status)` | upstream answered 400 or above | status and body passed through |
//! | `Err(UpstreamError::Transport)` | no usable answer at all | 502 error envelope |
//!
//! The request line carries the client's target exactly as received. The URL
//! is parsed as an [`http::Uri`], which keeps dot segments, doubled slashes
//! and percent escapes untouched.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, StatusCode, Uri};
use http_body_util::{BodyExt, Empty};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use crate::config::RelayConfig;

/// Redirect hops followed before a 3xx is handed back as the answer.
const MAX_REDIRECTS: usize = 10;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// A complete, buffered upstream answer with a non-error status.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream answered with an error status. Displays the way a status-only
    /// failure reads when there is no body to show.
    #[error("HTTP Error {}: {}", .status.as_u16(), .status.canonical_reason().unwrap_or("Unknown"))]
    Status { status: StatusCode, body: Bytes },

    /// DNS, connect, TLS, timeout, or a body cut short. Carries the whole
    /// error source chain, joined by `": "`.
    #[error("{0}")]
    Transport(String),
}

fn transport(e: &(dyn StdError + 'static)) -> UpstreamError {
    UpstreamError::Transport(describe(e))
}

/// HTTPS client bound to one base URL.
///
/// Certificates are checked against the platform's native root store.
/// Redirects are followed up to [`MAX_REDIRECTS`] hops. Apart from `Host`, no
/// request headers are sent.
#[derive(Clone)]
pub struct Upstream {
    client: HttpsClient,
    base: String,
    timeout: Duration,
}

impl Upstream {
    pub fn new(config: &RelayConfig) -> Result<Self, rustls::Error> {
        let native = rustls_native_certs::load_native_certs();
        for e in &native.errors {
            warn!(error = %e, "unreadable native root certificate source");
        }
        let mut roots = rustls::RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        debug!(added, ignored, "loaded native root certificates");

        let tls = rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .build();

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(https),
            base: config.upstream_base.clone(),
            timeout: config.upstream_timeout,
        })
    }

    pub fn base(&self) -> &str { &self.base }

    /// `base` followed by `target`, no re-encoding and no separator fix-up.
    pub fn url_for(&self, target: &str) -> String {
        format!("{}{}", self.base, target)
    }

    /// One bodiless GET to `base + target`, fully buffered, bounded by the
    /// configured timeout from connect through the last body byte.
    pub async fn fetch(&self, target: &str) -> Result<UpstreamReply, UpstreamError> {
        let url = self.url_for(target);
        match tokio::time::timeout(self.timeout, self.exchange(&url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpstreamError::Transport(format!(
                "GET \"{url}\" timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn exchange(&self, url: &str) -> Result<UpstreamReply, UpstreamError> {
        let mut uri: Uri = url.parse().map_err(|e| transport(&e))?;
        let mut hops = 0;
        let res = loop {
            let req = http::Request::get(uri.clone())
                .body(Empty::new())
                .map_err(|e| transport(&e))?;
            let res = self.client.request(req).await.map_err(|e| transport(&e))?;
            match redirect_target(&uri, &res) {
                Some(next) if hops < MAX_REDIRECTS => {
                    debug!(from = %uri, to = %next, status = res.status().as_u16(), "following redirect");
                    hops += 1;
                    uri = next;
                }
                _ => break res,
            }
        };

        let status = res.status();
        let content_type = res.headers().get(CONTENT_TYPE).cloned();
        let body = res
            .into_body()
            .collect()
            .await
            .map_err(|e| transport(&e))?
            .to_bytes();

        if status.is_client_error() || status.is_server_error() {
            return Err(UpstreamError::Status { status, body });
        }
        Ok(UpstreamReply { status, content_type, body })
    }
}

/// Where a 301/302/303/307/308 points, resolved against the request URI.
/// Only absolute URLs and absolute paths are understood.
fn redirect_target<B>(from: &Uri, res: &http::Response<B>) -> Option<Uri> {
    if !matches!(res.status().as_u16(), 301 | 302 | 303 | 307 | 308) {
        return None;
    }
    let location = res.headers().get(LOCATION)?.to_str().ok()?;
    let next = if location.starts_with('/') {
        format!("{}://{}{}", from.scheme_str()?, from.authority()?, location)
    } else {
        location.to_owned()
    };
    let next: Uri = next.parse().ok()?;
    next.scheme().is_some().then_some(next)
}

/// Flattens an error and its sources into one line. The client's top-level
/// message is generic; the cause (refused, DNS, certificate) is in the chain.
fn describe(e: &(dyn StdError + 'static)) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    fn upstream(base: &str) -> Upstream {
        let config = RelayConfig { upstream_base: base.to_owned(), ..RelayConfig::default() };
        Upstream::new(&config).unwrap()
    }

    #[test]
    fn url_is_plain_concatenation() {
        let up = upstream("https://api.example");
        assert_eq!(up.url_for("/transactions"), "https://api.example/transactions");
        assert_eq!(
            up.url_for("/transactions/summary?from=2025-02-01&to=%2A"),
            "https://api.example/transactions/summary?from=2025-02-01&to=%2A",
        );
        assert_eq!(up.url_for("//double"), "https://api.example//double");
    }

    fn redirect(status: u16, location: &str) -> http::Response<()> {
        http::Response::builder()
            .status(status)
            .header(LOCATION, location)
            .body(())
            .unwrap()
    }

    #[test]
    fn redirect_resolves_absolute_path_against_request() {
        let from: Uri = "https://api.example/a/../old?x=1".parse().unwrap();
        let next = redirect_target(&from, &redirect(302, "/new/./path?y=2")).unwrap();
        assert_eq!(next.to_string(), "https://api.example/new/./path?y=2");
    }

    #[test]
    fn redirect_keeps_absolute_url() {
        let from: Uri = "https://api.example/old".parse().unwrap();
        let next = redirect_target(&from, &redirect(308, "https://mirror.example/new")).unwrap();
        assert_eq!(next.to_string(), "https://mirror.example/new");
    }

    #[test]
    fn non_redirects_and_relative_locations_are_not_followed() {
        let from: Uri = "https://api.example/old".parse().unwrap();
        assert!(redirect_target(&from, &redirect(304, "/new")).is_none());
        assert!(redirect_target(&from, &redirect(200, "/new")).is_none());
        assert!(redirect_target(&from, &redirect(302, "sibling")).is_none());

        let bare = http::Response::builder().status(301).body(()).unwrap();
        assert!(redirect_target(&from, &bare).is_none());
    }

    #[tokio::test]
    async fn fetch_with_unparseable_url_is_transport_error() {
        let up = upstream("not a url");
        match up.fetch("/transactions").await {
            Err(UpstreamError::Transport(message)) => assert!(!message.is_empty()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn status_error_reads_like_http_error() {
        let e = UpstreamError::Status { status: StatusCode::NOT_FOUND, body: Bytes::new() };
        assert_eq!(e.to_string(), "HTTP Error 404: Not Found");
    }

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.0) }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn describe_joins_source_chain() {
        let e = Layer(
            "client error (Connect)",
            Some(Box::new(Layer("tcp connect error", Some(Box::new(Layer("Connection refused", None)))))),
        );
        assert_eq!(describe(&e), "client error (Connect): tcp connect error: Connection refused");
    }

    #[test]
    fn describe_skips_repeated_suffix() {
        let e = Layer("tcp connect: Connection refused", Some(Box::new(Layer("Connection refused", None))));
        assert_eq!(describe(&e), "tcp connect: Connection refused");
    }
}
