//! HTTP/1.1 server and graceful shutdown.
//!
//! The transport layer: accepts connections, parses each request off the
//! wire, calls [`Dispatcher::handle`] exactly once per request, and writes
//! the response back. Anything that fails to parse is answered here — a
//! malformed request gets 400 and an unknown method 405 before the
//! dispatcher is ever involved.
//!
//! # Graceful shutdown
//!
//! On SIGTERM (sent by orchestrators such as Kubernetes) or Ctrl-C the server
//! stops accepting new connections, lets every in-flight connection task run
//! to completion, and then returns from [`Server::serve`] so `main` can exit
//! cleanly.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use plinth::Server;
    /// let server = Server::bind("0.0.0.0:8080");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `dispatcher`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, dispatcher: Dispatcher) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Arc so the dispatcher can be shared across concurrent connection
        // tasks without copying the route table or middleware chain.
        let dispatcher = Arc::new(dispatcher);

        info!(addr = %self.addr, "plinth listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        // Pin the shutdown future so we can poll it in a loop.
        // Futures in Rust must not move in memory after the first poll — that
        // is what `Pin` enforces. `tokio::pin!` pins the future on the stack.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` makes select! check arms top-to-bottom instead of
                // randomly. We check shutdown first so a SIGTERM immediately
                // stops accepting new connections, even if more are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let dispatcher = Arc::clone(&dispatcher);
                    tasks.spawn(async move {
                        if let Err(e) = serve_connection(dispatcher, stream).await {
                            debug!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish before we return.
        while tasks.join_next().await.is_some() {}

        info!("plinth stopped");
        Ok(())
    }
}

// ── Connection loop ───────────────────────────────────────────────────────────

/// One request-response cycle at a time until the client closes or asks to.
async fn serve_connection(
    dispatcher: Arc<Dispatcher>,
    stream: TcpStream,
) -> std::io::Result<()> {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        match read_request(&mut reader).await? {
            Parsed::Eof => return Ok(()),
            Parsed::BadRequest => {
                Response::status(Status::BadRequest).write_to(&mut writer).await?;
                return Ok(());
            }
            Parsed::UnknownMethod => {
                Response::status(Status::MethodNotAllowed).write_to(&mut writer).await?;
                return Ok(());
            }
            Parsed::Request(req) => {
                let close = req.header("connection")
                    .is_some_and(|v| v.eq_ignore_ascii_case("close"));
                let response = dispatcher.handle(req).await;
                response.write_to(&mut writer).await?;
                if close {
                    return Ok(());
                }
            }
        }
    }
}

// ── Wire parsing ──────────────────────────────────────────────────────────────

enum Parsed {
    /// A complete, well-formed request.
    Request(Request),
    /// The request line or a header could not be parsed.
    BadRequest,
    /// Well-formed request line with a method we do not serve.
    UnknownMethod,
    /// Clean end of stream before any bytes of a request.
    Eof,
}

/// Reads one line, distinguishing malformed bytes from transport failure.
///
/// `read_line` reports invalid UTF-8 as an `InvalidData` io error, but for
/// us that is a malformed *request*, not a broken connection — it must end
/// up as a 400, so it is surfaced as `None` here.
async fn next_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    line: &mut String,
) -> std::io::Result<Option<usize>> {
    match reader.read_line(line).await {
        Ok(n) => Ok(Some(n)),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads one HTTP/1.1 request: request line, headers, content-length body.
async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Parsed> {
    let mut line = String::new();
    match next_line(reader, &mut line).await? {
        None => return Ok(Parsed::BadRequest),
        Some(0) => return Ok(Parsed::Eof),
        Some(_) => {}
    }
    let request_line = line.trim_end();

    let mut parts = request_line.split(' ');
    let (Some(method), Some(target), Some(_version)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Ok(Parsed::BadRequest);
    };
    let Ok(method) = method.parse::<Method>() else {
        return Ok(Parsed::UnknownMethod);
    };
    // The dispatcher routes on the path alone; the query string is dropped.
    let path = target.split_once('?').map_or(target, |(path, _)| path).to_owned();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        match next_line(reader, &mut line).await? {
            // Malformed bytes, or stream ended mid-headers.
            None | Some(0) => return Ok(Parsed::BadRequest),
            Some(_) => {}
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Ok(Parsed::BadRequest);
        };
        headers.push((name.trim().to_owned(), value.trim().to_owned()));
    }

    // A content-length we cannot parse means we cannot know where the body
    // ends — that is a malformed request, not a zero-length one.
    let content_length = match headers.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
    {
        Some((_, v)) => match v.trim().parse::<usize>() {
            Ok(n) => n,
            Err(_) => return Ok(Parsed::BadRequest),
        },
        None => 0,
    };
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).await?;
    }

    Ok(Parsed::Request(Request::new(method, path, headers, body)))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by orchestrators) and
/// **SIGINT** (Ctrl-C, for local dev). On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` is a future that never resolves — on non-Unix platforms
    // the SIGTERM arm is effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
