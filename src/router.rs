//! The routing contract and the built-in radix-tree implementation.
//!
//! The dispatcher only ever sees the [`Router`] trait — one operation, one
//! answer. Any matcher can stand behind it; [`RadixRouter`] is the one plinth
//! ships: one tree per HTTP method, O(path-length) lookup.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// A successful route lookup: the handler plus the path parameters the
/// matcher extracted (e.g. `{id}` → `"42"`).
pub struct RouteMatch {
    pub handler: BoxedHandler,
    pub params: HashMap<String, String>,
}

/// What the dispatcher requires of a router — nothing more.
///
/// `None` means "no registered handler answers this request"; the dispatcher
/// then falls back to static file resolution. Implementations must be safe
/// for concurrent lookups: the route table is built before serving starts and
/// never mutated afterwards.
pub trait Router: Send + Sync + 'static {
    fn route(&self, method: Method, path: &str) -> Option<RouteMatch>;
}

/// The built-in radix-tree router.
///
/// One tree per HTTP method — no allocations on the match path itself. Build
/// it once at startup; hand it to [`Dispatcher::new`](crate::Dispatcher::new).
/// Each registration call returns `self` so registrations chain naturally.
pub struct RadixRouter {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl RadixRouter {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use plinth::{Method, RadixRouter, Request, Response};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// # async fn delete_user(_: Request) -> Response { Response::text("") }
    /// RadixRouter::new()
    ///     .on(Method::Delete, "/users/{id}", delete_user)
    ///     .on(Method::Get,    "/users/{id}", get_user)
    ///     .on(Method::Post,   "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on an invalid or conflicting path pattern. Routes are
    /// registered at boot, so a bad pattern is a programming error that
    /// should stop the process before it serves anything.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Shorthand for `on(Method::Get, …)`.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    /// Shorthand for `on(Method::Post, …)`.
    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    /// Shorthand for `on(Method::Put, …)`.
    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    /// Shorthand for `on(Method::Delete, …)`.
    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }
}

impl Router for RadixRouter {
    fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some(RouteMatch { handler, params })
    }
}

impl Default for RadixRouter {
    fn default() -> Self { Self::new() }
}
