//! Minimal plinth example — JSON endpoints plus the static fallback.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic -- --workDir=. --port=3000
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/index.html        # served from ./Public/
//!   curl http://localhost:3000/missing           # 404 "Page not found"

use plinth::{
    Config, Dispatcher, Failure, Method, RadixRouter, Request, Response, Server, Status,
    middleware,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_args(std::env::args().skip(1));

    let router = RadixRouter::new()
        .on(Method::Get, "/users/{id}", get_user)
        .on(Method::Post, "/users", create_user)
        .on(Method::Delete, "/users/{id}", delete_user);

    let dispatcher = Dispatcher::new(router, &config, middleware::Chain::default_chain());

    Server::bind(&format!("0.0.0.0:{}", config.port))
        .serve(dispatcher)
        .await
        .expect("server error");
}

// GET /users/{id}
//
// Response::json takes bytes — pass them from your serialiser:
//   serde_json:  Response::json(serde_json::to_vec(&user)?)
//   hand-built:  Response::json(format!(...).into_bytes())
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /users
//
// Fallible handler: an empty body aborts with 400, which the Abort middleware
// in the default chain turns into a bare 400 response.
async fn create_user(req: Request) -> Result<Response, Failure> {
    if req.body().is_empty() {
        return Err(Failure::Abort(Status::BadRequest));
    }
    Ok(Response::builder()
        .status(Status::Created)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#.as_bytes().to_vec()))
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Response {
    Response::status(Status::NoContent)
}
