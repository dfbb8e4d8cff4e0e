//! # plinth
//!
//! A minimal HTTP framework built around one pipeline: route the request,
//! fall back to a static file, fall back to 404, wrap whichever handler won
//! in the middleware chain, and translate any failure into a response at a
//! single boundary. Nothing more. Nothing less.
//!
//! ## The pipeline
//!
//! Every request goes through [`Dispatcher::handle`] exactly once:
//!
//! 1. **Router** — a registered handler for the method + path wins outright.
//! 2. **Static fallback** — otherwise the path is resolved under
//!    `<work_dir>/Public`; an existing readable file is served as-is.
//! 3. **404** — otherwise a constant "Page not found" handler.
//! 4. **Middleware** — the [`middleware::Chain`] wraps the winner uniformly,
//!    whichever of the three it was.
//! 5. **Failure boundary** — a handler or middleware failure becomes a
//!    textual 500; the transport layer only ever sees a response.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plinth::{Config, Dispatcher, Method, RadixRouter, Request, Response, Server, middleware};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_args(std::env::args().skip(1));
//!
//!     let router = RadixRouter::new()
//!         .on(Method::Get,  "/users/{id}", get_user)
//!         .on(Method::Post, "/users",      create_user);
//!
//!     let dispatcher = Dispatcher::new(router, &config, middleware::Chain::default_chain());
//!
//!     Server::bind(&format!("0.0.0.0:{}", config.port))
//!         .serve(dispatcher)
//!         .await
//!         .unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     # let _ = req;
//!     Response::status(plinth::Status::Created)
//! }
//! ```

mod config;
mod dispatch;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod static_files;
mod status;

pub mod middleware;

pub use config::{Config, Environment};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use handler::{Failure, Handler, IntoOutcome, Outcome};
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::{RadixRouter, RouteMatch, Router};
pub use server::Server;
pub use static_files::{Resolved, StaticFiles};
pub use status::Status;
