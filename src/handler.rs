//! Handler trait, failure signalling, and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`, and the middleware chain needs to wrap handlers
//! it knows nothing about. Rust collections can only hold one concrete type,
//! so we use **trait objects** (`dyn ErasedHandler`) to hide the concrete
//! handler type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_outcome() })  ← BoxFuture
//! ```
//!
//! The only runtime cost per request is **one Arc clone** (atomic inc) +
//! **one virtual call** — negligible compared to network I/O.
//!
//! # Failure
//!
//! Every erased handler resolves to an [`Outcome`]: `Ok(Response)` or
//! `Err(Failure)`. Failures never reach the transport layer — the
//! [`Dispatcher`](crate::Dispatcher) translates anything still `Err` at its
//! boundary into a textual 500 response.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

// ── Failure ───────────────────────────────────────────────────────────────────

/// A failed handler invocation.
///
/// `Abort` is the intentional short-circuit: the
/// [`Abort`](crate::middleware::Abort) middleware converts it into a bare
/// status-coded response. Anything else is carried as a message and becomes a
/// 500 response at the dispatch boundary.
#[derive(Debug)]
pub enum Failure {
    /// Intentional abort with the status the client should see.
    Abort(Status),
    /// Any other handler failure, described for the 500 body.
    Message(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort(status) => write!(f, "abort: {} {}", status.code(), status.reason()),
            Self::Message(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Failure {}

impl From<String> for Failure {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

impl From<&str> for Failure {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_owned())
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Self::Message(format!("io: {e}"))
    }
}

/// What a handler invocation resolves to.
pub type Outcome = Result<Response, Failure>;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to an [`Outcome`].
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedHandler`.
/// `Arc` gives us cheap, thread-safe shared ownership (one atomic reference
/// count increment per request) without copying the handler.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// which covers both infallible handlers (`-> Response`, `-> String`,
/// `-> Status`) and fallible ones (`-> Result<Response, Failure>`).
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion into an [`Outcome`] — the return-type contract for handlers.
///
/// Implemented for the common infallible return types (anything
/// [`IntoResponse`] that plinth ships) and for `Result<impl IntoResponse,
/// Failure>` for handlers that use `?`.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<T: IntoResponse> IntoOutcome for Result<T, Failure> {
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response)
    }
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> Outcome {
        Ok(self)
    }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

impl IntoOutcome for Status {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

// ── Blanket implementations ───────────────────────────────────────────────────

/// Implement the sealing trait for any function with the right signature.
///
/// `Fn(Request) -> Fut` covers:
///   - named `async fn` items
///   - closures returning `async move` blocks
///   - any struct that implements `Fn`
impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

/// Implement `Handler` for any function with the right signature.
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Call the wrapped function — this returns the concrete `Fut`.
        // We then map it to `Outcome` via `IntoOutcome` and box the whole
        // thing so the return type matches the trait signature.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    fn request() -> Request {
        Request::new(Method::Get, "/", Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn infallible_handler_erases_to_ok() {
        async fn hello(_req: Request) -> Response {
            Response::text("hello")
        }
        let handler = hello.into_boxed_handler();
        let resp = handler.call(request()).await.unwrap();
        assert_eq!(resp.body(), b"hello");
    }

    #[tokio::test]
    async fn fallible_handler_carries_failure() {
        async fn broken(_req: Request) -> Outcome {
            Err(Failure::from("db connection lost"))
        }
        let handler = broken.into_boxed_handler();
        let failure = handler.call(request()).await.unwrap_err();
        assert_eq!(failure.to_string(), "db connection lost");
    }

    #[test]
    fn abort_failure_displays_status() {
        let failure = Failure::Abort(Status::ImATeapot);
        assert_eq!(failure.to_string(), "abort: 418 I'm a Teapot");
    }
}
