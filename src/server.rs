//! HTTP listener and the sequential accept loop.
//!
//! # One request at a time
//!
//! The loop accepts a connection, serves it to completion, and only then
//! accepts the next one. Keep-alive is off, so every connection carries exactly
//! one request and the client sees the socket close after the response. A slow
//! upstream therefore holds up every client queued behind it; the upstream
//! timeout in [`RelayConfig`](crate::RelayConfig) is what bounds that wait.
//!
//! There is no shutdown path. The process runs until it is killed, and a
//! request in flight at that moment is dropped.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::middleware::cors;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::router::Router;

/// A client that connects but never finishes its request head would
/// otherwise stall the loop forever.
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds the listening socket. Port `0` picks a free port; see
    /// [`local_addr`](Server::local_addr).
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), momo_relay::Error> {
    /// let server = momo_relay::Server::bind("0.0.0.0:8000".parse().unwrap()).await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections and dispatches them through `router`, one at a
    /// time, until the process is terminated. Per-connection failures are
    /// logged and never end the loop.
    pub async fn serve(self, router: Router) {
        let router = Arc::new(router);
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "momo relay listening");
        }

        let mut conn = http1::Builder::new();
        conn.keep_alive(false)
            .timer(TokioTimer::new())
            .header_read_timeout(HEADER_READ_TIMEOUT);

        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(v) => v,
                Err(e) => {
                    error!("accept error: {e}");
                    continue;
                }
            };

            let router = Arc::clone(&router);
            let svc = service_fn(move |req| {
                let router = Arc::clone(&router);
                async move { dispatch(&router, req).await }
            });

            // Awaited inline, not spawned: the next accept waits for this
            // response to be written.
            if let Err(e) = conn.serve_connection(TokioIo::new(stream), svc).await {
                debug!(peer = %remote_addr, "connection error: {e}");
            }
        }
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one CORS-decorated response.
///
/// Infallible: misses become `404`/`501` responses, handler failures are
/// already responses, so hyper never sees an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let request = Request::new(&req);

    let response = match router.lookup(request.method(), request.target()) {
        Ok(handler) => handler.call(request).await,
        Err(status) => Response::builder()
            .status(status)
            .bytes(ContentType::Json, Vec::new()),
    };

    Ok(cors::decorate(response).into_inner())
}
