//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;

use crate::method::Method;

/// An incoming HTTP request.
///
/// Built once by the transport layer (or by tests) and handed to
/// [`Dispatcher::handle`](crate::Dispatcher::handle). The dispatch pipeline
/// treats it as immutable apart from two documented attachment points: route
/// parameters, filled in when the router matches, and the session id, filled
/// in by the [`Sessions`](crate::middleware::Sessions) middleware.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) session: Option<String>,
}

impl Request {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body: body.into(),
            params: HashMap::new(),
            session: None,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The session id attached by the `Sessions` middleware, if it ran.
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_deref()
    }
}
