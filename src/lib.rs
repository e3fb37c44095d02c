//! # momo-relay
//!
//! A CORS relay in front of one fixed HTTPS API.
//!
//! The Momo transactions dashboard runs in a browser and reads an API that
//! does not send cross-origin headers. The relay sits on `localhost:8000`,
//! copies each `GET` path onto the upstream base URL, and hands the answer
//! back with `Access-Control-Allow-*` headers attached.
//!
//! ```text
//! browser ── GET /transactions?page=0 ──▶ relay ── GET <base>/transactions?page=0 ──▶ upstream
//!         ◀── status + body + CORS ──────       ◀── status + body ──────────────────
//! ```
//!
//! What it deliberately leaves out: authentication, request validation, rate
//! limiting, streaming, a configurable upstream, retries, graceful shutdown.
//!
//! ## Running it
//!
//! ```rust,no_run
//! use momo_relay::{RelayConfig, Server, Upstream, relay};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), momo_relay::Error> {
//!     let config = RelayConfig::default();
//!     let app = relay::router(Upstream::new(&config)?);
//!     Server::bind(config.listen).await?.serve(app).await;
//!     Ok(())
//! }
//! ```
//!
//! The underlying pieces (router, handler erasure, buffered responses) are
//! small enough to reuse for a mock upstream in tests:
//!
//! ```rust,no_run
//! use momo_relay::{Request, Response, Router};
//!
//! async fn transactions(_req: Request) -> Response {
//!     Response::json(br#"[{"id":"tx1","amount":5500}]"#.to_vec())
//! }
//!
//! let mock = Router::new().on(http::Method::GET, "/transactions", transactions);
//! ```

mod config;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;
pub mod relay;
pub mod upstream;

pub use config::{LISTEN_PORT, RelayConfig, UPSTREAM_BASE, UPSTREAM_TIMEOUT};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use upstream::Upstream;
