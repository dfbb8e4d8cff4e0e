//! Session attachment middleware.
//!
//! Restores the session id from the request cookie, or mints a fresh one and
//! asks the client to keep it. Session *storage* is deliberately out of
//! scope — an application that wants server-side session state keys its own
//! store (database, cache, …) by the id this middleware exposes through
//! [`Request::session_id`](crate::Request::session_id).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;

const COOKIE_NAME: &str = "plinth-session";

/// Attaches a session id to every request before invocation.
///
/// If the request already carries the session cookie, its value is restored;
/// otherwise a new id is minted and a `set-cookie` header is added to the
/// response so the client presents it next time. Only successful responses
/// get the cookie — a failed invocation has nothing to decorate.
pub struct Sessions {
    counter: Arc<AtomicU64>,
}

impl Sessions {
    pub fn new() -> Self {
        Self { counter: Arc::new(AtomicU64::new(0)) }
    }

    fn mint(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{nanos:x}-{n:x}")
    }
}

impl Default for Sessions {
    fn default() -> Self { Self::new() }
}

impl Middleware for Sessions {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let sessions = Sessions { counter: Arc::clone(&self.counter) };
        (move |mut req: Request| {
            let next = Arc::clone(&next);
            let restored = cookie_value(&req, COOKIE_NAME);
            let (id, fresh) = match restored {
                Some(id) => (id, false),
                None => (sessions.mint(), true),
            };
            req.session = Some(id.clone());
            async move {
                let outcome = next.call(req).await;
                match outcome {
                    Ok(mut resp) if fresh => {
                        resp.set_header(
                            "set-cookie",
                            &format!("{COOKIE_NAME}={id}; Path=/; HttpOnly"),
                        );
                        Ok(resp)
                    }
                    outcome => outcome,
                }
            }
        })
        .into_boxed_handler()
    }
}

/// Pulls one value out of a `cookie` header (`a=1; b=2`).
fn cookie_value(req: &Request, name: &str) -> Option<String> {
    let header = req.header("cookie")?;
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_owned())
    })
}
