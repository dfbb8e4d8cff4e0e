//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: failure translation, session attachment, metrics,
//! request-id injection.
//!
//! A middleware is a decorator: it receives the next handler and returns a
//! new handler that runs code before and/or after it. Most middleware is a
//! closure adapted with [`from_fn`]; implement [`Middleware`] directly only
//! when you need configuration state.
//!
//! # Composition order
//!
//! [`Chain::apply`] folds the registered middleware over the base handler in
//! registration order: `handler = layer.wrap(handler)` for each layer, first
//! to last. The **last** registered middleware therefore ends up as the
//! **outermost** wrapper — its pre-logic runs first on the way in and its
//! post-logic last on the way out:
//!
//! ```text
//! chain: [A, B]        request ──► B-pre ─► A-pre ─► handler
//!                      response ◄─ B-post ◄─ A-post ◄──┘
//! ```
//!
//! This is pinned by tests in `tests/dispatch.rs` — do not change it without
//! changing them.

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler, Outcome};
use crate::request::Request;

mod abort;
mod session;

pub use abort::Abort;
pub use session::Sessions;

/// A handler decorator.
///
/// Implementations must be stateless across requests: `wrap` is called once
/// at boot, and the handler it returns is shared by every concurrent request.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

/// The remainder of the pipeline, as seen from inside a middleware.
///
/// Call [`Next::run`] exactly once to continue; skip it to short-circuit.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    pub async fn run(&self, req: Request) -> Outcome {
        self.inner.call(req).await
    }
}

impl Clone for Next {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

/// Adapts an async closure `(Request, Next) -> Outcome` into a [`Middleware`].
///
/// ```rust,no_run
/// use plinth::middleware::{self, Chain};
///
/// let chain = Chain::new().with(middleware::from_fn(|req, next| async move {
///     tracing::info!(path = req.path(), "request in");
///     let outcome = next.run(req).await;
///     tracing::info!("request out");
///     outcome
/// }));
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    FromFn(f)
}

/// Middleware backed by a closure. Built with [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let f = self.0.clone();
        let next = Next { inner: next };
        (move |req: Request| {
            let f = f.clone();
            let next = next.clone();
            async move { f(req, next).await }
        })
        .into_boxed_handler()
    }
}

/// An ordered middleware chain.
///
/// Append-only during boot; treated as immutable once serving begins. The
/// dispatcher applies it uniformly to whichever base handler answers a
/// request — routed, static file, or 404 fallback.
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    /// An empty chain: `apply` returns the base handler untouched.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// The chain most applications want: [`Abort`] translation, then
    /// [`Sessions`]. Sessions is registered last, so it wraps outermost and
    /// sees the request first.
    pub fn default_chain() -> Self {
        Self::new().with(Abort).with(Sessions::new())
    }

    /// Appends a middleware. Returns `self` for chaining.
    pub fn with(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Folds the chain over `base` per the order rule in the module docs.
    pub fn apply(&self, base: BoxedHandler) -> BoxedHandler {
        self.layers.iter().fold(base, |handler, layer| layer.wrap(handler))
    }
}

impl Default for Chain {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::response::Response;

    fn base() -> BoxedHandler {
        (|_req: Request| async { Response::text("base") }).into_boxed_handler()
    }

    fn request() -> Request {
        Request::new(Method::Get, "/", Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn empty_chain_is_identity() {
        let handler = Chain::new().apply(base());
        let resp = handler.call(request()).await.unwrap();
        assert_eq!(resp.body(), b"base");
    }

    #[tokio::test]
    async fn from_fn_can_short_circuit() {
        let gate = from_fn(|req: Request, next: Next| async move {
            if req.header("authorization").is_none() {
                return Ok(Response::status(crate::Status::Unauthorized));
            }
            next.run(req).await
        });
        let handler = Chain::new().with(gate).apply(base());
        let resp = handler.call(request()).await.unwrap();
        assert_eq!(resp.status_code(), 401);
    }
}
