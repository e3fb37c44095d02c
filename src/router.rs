//! Radix-tree request router.
//!
//! One tree per HTTP method, plus an optional per-method fallback that takes
//! every target the tree does not match. The relay needs exactly that shape:
//! `GET /` is a route, every other `GET` target is the fallback.
//!
//! Routes match the whole request target, query included: `/` matches `/`
//! but not `/?page=1`, which falls through to the fallback.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router. Build it once at startup and hand it to
/// [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallbacks: HashMap<Method, BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallbacks: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid `matchit` route or conflicts with one
    /// already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler) as BoxedHandler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Register a handler for every `method` request whose target no route
    /// matches, including targets that are not paths at all (`OPTIONS *`).
    pub fn fallback(mut self, method: Method, handler: impl Handler) -> Self {
        self.fallbacks.insert(method, Arc::new(handler));
        self
    }

    /// Finds the handler for `method` + `target` (path plus `?query`).
    ///
    /// On a miss, the error is the status to answer with: `404` when the
    /// method has routes but none matches, `501` when nothing at all is
    /// registered for the method.
    pub(crate) fn lookup(&self, method: &Method, target: &str) -> Result<BoxedHandler, StatusCode> {
        let tree = self.routes.get(method);
        if let Some(matched) = tree.and_then(|tree| tree.at(target).ok()) {
            return Ok(Arc::clone(matched.value));
        }
        match self.fallbacks.get(method) {
            Some(handler) => Ok(Arc::clone(handler)),
            None if tree.is_some() => Err(StatusCode::NOT_FOUND),
            None => Err(StatusCode::NOT_IMPLEMENTED),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn named(_req: Request) -> Response { Response::text("route") }
    async fn rest(_req: Request) -> Response { Response::text("fallback") }

    async fn answer(router: &Router, method: Method, uri: &str) -> Result<Vec<u8>, StatusCode> {
        let req = http::Request::builder().method(method.clone()).uri(uri).body(()).unwrap();
        let req = Request::new(&req);
        let handler = router.lookup(&method, req.target())?;
        Ok(handler.call(req).await.body().to_vec())
    }

    #[tokio::test]
    async fn exact_route_beats_fallback() {
        let router = Router::new().on(Method::GET, "/", named).fallback(Method::GET, rest);

        assert_eq!(answer(&router, Method::GET, "/").await.unwrap(), b"route");
        assert_eq!(answer(&router, Method::GET, "/transactions").await.unwrap(), b"fallback");
        assert_eq!(answer(&router, Method::GET, "/a/b/c?q=1").await.unwrap(), b"fallback");
    }

    #[tokio::test]
    async fn query_on_exact_route_goes_to_fallback() {
        let router = Router::new().on(Method::GET, "/", named).fallback(Method::GET, rest);

        assert_eq!(answer(&router, Method::GET, "/?page=1").await.unwrap(), b"fallback");
        assert_eq!(answer(&router, Method::GET, "/?").await.unwrap(), b"fallback");
    }

    #[tokio::test]
    async fn fallback_is_per_method() {
        let router = Router::new().fallback(Method::OPTIONS, rest);

        assert!(answer(&router, Method::OPTIONS, "/anything").await.is_ok());
        assert_eq!(answer(&router, Method::GET, "/anything").await, Err(StatusCode::NOT_IMPLEMENTED));
    }

    #[tokio::test]
    async fn unmatched_path_without_fallback_is_not_found() {
        let router = Router::new().on(Method::GET, "/", named);

        assert_eq!(answer(&router, Method::GET, "/missing").await, Err(StatusCode::NOT_FOUND));
        assert_eq!(answer(&router, Method::POST, "/").await, Err(StatusCode::NOT_IMPLEMENTED));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new().on(Method::GET, "/a", named).on(Method::GET, "/a", named);
    }
}
