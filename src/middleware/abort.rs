//! Abort translation middleware.

use std::sync::Arc;

use crate::handler::{BoxedHandler, Failure, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Converts an intentional [`Failure::Abort`] from anything it wraps into the
/// bare status-coded response the handler asked for.
///
/// Without this middleware an abort is indistinguishable from any other
/// failure and becomes a 500 at the dispatch boundary. Other failures pass
/// through untouched.
pub struct Abort;

impl Middleware for Abort {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (move |req: Request| {
            let next = Arc::clone(&next);
            async move {
                match next.call(req).await {
                    Err(Failure::Abort(status)) => Ok(Response::status(status)),
                    outcome => outcome,
                }
            }
        })
        .into_boxed_handler()
    }
}
