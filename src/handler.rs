//! Route handlers.
//!
//! A handler takes the [`Request`] by value and resolves to a [`Response`].
//! The router keeps them as `Arc<dyn Handler>`, so a plain `async fn` (the
//! health banner) and a closure holding the upstream client (the forwarder)
//! sit in the same table.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// Boxed response future. `Send + 'static` so the server can drive it from
/// any runtime worker.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

pub(crate) type BoxedHandler = Arc<dyn Handler>;

/// Something that answers a request.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = Response>`,
/// named `async fn` items and capturing closures alike:
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use momo_relay::{Request, Response, Router};
/// let greeting = Arc::new(String::from("hello"));
/// Router::new().on(http::Method::GET, "/hello", move |_req: Request| {
///     let greeting = Arc::clone(&greeting);
///     async move { Response::text(greeting.as_str()) }
/// });
/// ```
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin(self(req))
    }
}
