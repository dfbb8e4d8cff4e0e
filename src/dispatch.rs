//! The dispatch core: one request in, one response out.
//!
//! For every request the dispatcher picks exactly one base handler — the
//! routed handler, a constant handler serving a static file, or the constant
//! 404 handler — wraps it in the middleware chain, and invokes it inside a
//! failure boundary. The transport layer never observes a failure, only a
//! well-formed [`Response`].

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::config::Config;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Chain;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::router::Router;
use crate::static_files::{Resolved, StaticFiles};
use crate::status::Status;

/// Orchestrates router lookup, static fallback, middleware wrapping, and
/// failure translation.
///
/// Built once at boot and shared (via `Arc`, by the server) across every
/// connection task. Holds no per-request state, so concurrent `handle` calls
/// never interfere.
pub struct Dispatcher {
    router: Arc<dyn Router>,
    files: StaticFiles,
    chain: Chain,
}

impl Dispatcher {
    /// The work directory comes from [`Config`] — an explicit value, not
    /// process-global state. Static files are served from
    /// `<work_dir>/Public`.
    pub fn new(router: impl Router, config: &Config, chain: Chain) -> Self {
        Self {
            router: Arc::new(router),
            files: StaticFiles::new(&config.work_dir),
            chain,
        }
    }

    /// Produces exactly one response for one request. Called once per
    /// request by the transport layer; never re-entrant on shared mutable
    /// state, so concurrent calls are fine.
    ///
    /// No failure escapes this method: a handler or middleware that fails is
    /// translated into a textual 500 response at this boundary.
    pub async fn handle(&self, mut req: Request) -> Response {
        let base = match self.router.route(req.method(), req.path()) {
            Some(matched) => {
                req.params = matched.params;
                matched.handler
            }
            None => self.fallback(req.path()).await,
        };

        let handler = self.chain.apply(base);

        let response = match handler.call(req).await {
            Ok(response) => response,
            Err(failure) => Response::builder()
                .status(Status::InternalServerError)
                .text(format!("internal server error: {failure}")),
        };

        if response.header("content-type").is_none() {
            warn!(status = response.status_code(), "response has no content-type header");
        }
        response
    }

    /// Static-file fallback for a route miss.
    ///
    /// A file that exists but cannot be read gets a warning; a plain miss
    /// does not. Both surface to the client as the same 404 — the asymmetry
    /// is only in the logs, where an unreadable file is an operator problem
    /// and a miss is everyday traffic.
    async fn fallback(&self, path: &str) -> BoxedHandler {
        match self.files.resolve(path).await {
            Resolved::File(bytes) => file_handler(bytes),
            Resolved::Unreadable(e) => {
                warn!(path, error = %e, "static file exists but could not be read");
                not_found_handler()
            }
            Resolved::NotFound => not_found_handler(),
        }
    }
}

/// Constant handler serving already-loaded file bytes.
///
/// Served files get the generic text content type; there is no
/// extension-based sniffing in the dispatch core.
fn file_handler(bytes: Bytes) -> BoxedHandler {
    (move |_req: Request| {
        let body = bytes.clone();
        async move { Response::builder().bytes(ContentType::Text, body) }
    })
    .into_boxed_handler()
}

/// Constant 404 handler — the final fallback.
fn not_found_handler() -> BoxedHandler {
    (|_req: Request| async {
        Response::builder()
            .status(Status::NotFound)
            .text("Page not found")
    })
    .into_boxed_handler()
}
