//! End-to-end dispatch pipeline tests: routing precedence, static fallback,
//! warning policy, middleware composition order, and the failure boundary.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use plinth::middleware::{self, Chain};
use plinth::{Config, Dispatcher, Failure, Method, RadixRouter, Request, Response, Status};
use tempfile::TempDir;
use tracing::instrument::WithSubscriber;
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A work directory with an empty `Public` inside it.
fn workspace() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("Public")).unwrap();
    let config = Config {
        work_dir: format!("{}/", dir.path().display()),
        ..Config::default()
    };
    (dir, config)
}

fn get(path: &str) -> Request {
    Request::new(Method::Get, path, Vec::new(), Vec::new())
}

/// Minimal subscriber that counts WARN events and ignores everything else.
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Subscriber for WarnCounter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        *metadata.level() == Level::WARN
    }
    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }
    fn record(&self, _: &Id, _: &Record<'_>) {}
    fn record_follows_from(&self, _: &Id, _: &Id) {}
    fn event(&self, _: &Event<'_>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
    fn enter(&self, _: &Id) {}
    fn exit(&self, _: &Id) {}
}

// ── Base handler selection ────────────────────────────────────────────────────

#[tokio::test]
async fn routed_handler_wins_over_identically_named_file() {
    let (dir, config) = workspace();
    std::fs::write(dir.path().join("Public/greet"), b"file content").unwrap();

    let router = RadixRouter::new().get("/greet", |_req: Request| async {
        Response::text("handler content")
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::new());

    let resp = dispatcher.handle(get("/greet")).await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.body(), b"handler content");
}

#[tokio::test]
async fn static_file_round_trips_byte_for_byte() {
    let (dir, config) = workspace();
    let content: &[u8] = b"raw bytes \x00\xff\xfe not utf-8";
    std::fs::write(dir.path().join("Public/blob.bin"), content).unwrap();

    let dispatcher = Dispatcher::new(RadixRouter::new(), &config, Chain::new());

    let resp = dispatcher.handle(get("/blob.bin")).await;
    assert_eq!(resp.status_code(), 200);
    assert_eq!(resp.body(), content);
    assert_eq!(resp.header("content-type"), Some("text/plain; charset=utf-8"));
}

#[tokio::test]
async fn route_miss_without_file_is_silent_404() {
    let (_dir, config) = workspace();
    let dispatcher = Dispatcher::new(RadixRouter::new(), &config, Chain::new());

    let counter = WarnCounter::default();
    let resp = dispatcher
        .handle(get("/missing"))
        .with_subscriber(counter.clone())
        .await;

    assert_eq!(resp.status_code(), 404);
    assert_eq!(resp.body(), b"Page not found");
    assert_eq!(counter.count(), 0, "a plain miss must not warn");
}

#[tokio::test]
async fn unreadable_file_is_404_with_exactly_one_warning() {
    let (dir, config) = workspace();
    // A directory at the resolved path: it exists but cannot be read as a file.
    std::fs::create_dir(dir.path().join("Public/assets")).unwrap();

    let dispatcher = Dispatcher::new(RadixRouter::new(), &config, Chain::new());

    let counter = WarnCounter::default();
    let resp = dispatcher
        .handle(get("/assets"))
        .with_subscriber(counter.clone())
        .await;

    assert_eq!(resp.status_code(), 404);
    assert_eq!(resp.body(), b"Page not found");
    assert_eq!(counter.count(), 1, "exists-but-unreadable must warn once");
}

// ── Middleware composition order ──────────────────────────────────────────────

type CallLog = Arc<Mutex<Vec<String>>>;

fn marker(name: &'static str, log: CallLog) -> impl middleware::Middleware {
    middleware::from_fn(move |req: Request, next: middleware::Next| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("{name}-pre"));
            let outcome = next.run(req).await;
            log.lock().unwrap().push(format!("{name}-post"));
            outcome
        }
    })
}

async fn run_chain(chain: Chain, log: CallLog) -> Vec<String> {
    let (_dir, config) = workspace();
    let handler_log = Arc::clone(&log);
    let router = RadixRouter::new().get("/", move |_req: Request| {
        let log = Arc::clone(&handler_log);
        async move {
            log.lock().unwrap().push("handler".to_owned());
            Response::text("ok")
        }
    });
    let dispatcher = Dispatcher::new(router, &config, chain);
    dispatcher.handle(get("/")).await;
    let order = log.lock().unwrap().clone();
    order
}

/// Last registered wraps outermost: its pre runs first, its post runs last.
#[tokio::test]
async fn last_registered_middleware_runs_pre_logic_first() {
    let log: CallLog = Arc::default();
    let chain = Chain::new()
        .with(marker("a", Arc::clone(&log)))
        .with(marker("b", Arc::clone(&log)));
    let order = run_chain(chain, log).await;
    assert_eq!(order, ["b-pre", "a-pre", "handler", "a-post", "b-post"]);
}

#[tokio::test]
async fn reversed_registration_reverses_execution() {
    let log: CallLog = Arc::default();
    let chain = Chain::new()
        .with(marker("b", Arc::clone(&log)))
        .with(marker("a", Arc::clone(&log)));
    let order = run_chain(chain, log).await;
    assert_eq!(order, ["a-pre", "b-pre", "handler", "b-post", "a-post"]);
}

#[tokio::test]
async fn three_middleware_nest_consistently() {
    let log: CallLog = Arc::default();
    let chain = Chain::new()
        .with(marker("a", Arc::clone(&log)))
        .with(marker("b", Arc::clone(&log)))
        .with(marker("c", Arc::clone(&log)));
    let order = run_chain(chain, log).await;
    assert_eq!(
        order,
        ["c-pre", "b-pre", "a-pre", "handler", "a-post", "b-post", "c-post"]
    );
}

#[tokio::test]
async fn chain_wraps_the_static_fallback_too() {
    let (dir, config) = workspace();
    std::fs::write(dir.path().join("Public/note.txt"), b"note").unwrap();

    let log: CallLog = Arc::default();
    let chain = Chain::new().with(marker("a", Arc::clone(&log)));
    let dispatcher = Dispatcher::new(RadixRouter::new(), &config, chain);

    let resp = dispatcher.handle(get("/note.txt")).await;
    assert_eq!(resp.body(), b"note");
    assert_eq!(*log.lock().unwrap(), ["a-pre", "a-post"]);
}

// ── Failure boundary ──────────────────────────────────────────────────────────

#[tokio::test]
async fn handler_failure_becomes_textual_500() {
    let (_dir, config) = workspace();
    let router = RadixRouter::new().get("/boom", |_req: Request| async {
        Err::<Response, _>(Failure::from("db connection lost"))
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::new());

    let resp = dispatcher.handle(get("/boom")).await;
    assert_eq!(resp.status_code(), 500);
    let body = String::from_utf8(resp.body().to_vec()).unwrap();
    assert!(body.contains("db connection lost"));
}

#[tokio::test]
async fn abort_through_default_chain_becomes_its_status() {
    let (_dir, config) = workspace();
    let router = RadixRouter::new().get("/private", |_req: Request| async {
        Err::<Response, _>(Failure::Abort(Status::Unauthorized))
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::default_chain());

    let resp = dispatcher.handle(get("/private")).await;
    assert_eq!(resp.status_code(), 401);
}

#[tokio::test]
async fn abort_without_the_middleware_is_a_500() {
    let (_dir, config) = workspace();
    let router = RadixRouter::new().get("/private", |_req: Request| async {
        Err::<Response, _>(Failure::Abort(Status::Unauthorized))
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::new());

    let resp = dispatcher.handle(get("/private")).await;
    assert_eq!(resp.status_code(), 500);
}

// ── Content-type warning ──────────────────────────────────────────────────────

#[tokio::test]
async fn missing_content_type_warns_but_leaves_response_untouched() {
    let (_dir, config) = workspace();
    let router = RadixRouter::new().get("/bare", |_req: Request| async {
        Response::status(Status::NoContent)
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::new());

    let counter = WarnCounter::default();
    let resp = dispatcher
        .handle(get("/bare"))
        .with_subscriber(counter.clone())
        .await;

    assert_eq!(counter.count(), 1);
    // The header is warned about, never injected.
    assert_eq!(resp.status_code(), 204);
    assert_eq!(resp.header("content-type"), None);
    assert!(resp.headers().is_empty());
    assert!(resp.body().is_empty());
}

// ── Idempotence ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn identical_requests_yield_identical_responses() {
    let (dir, config) = workspace();
    std::fs::write(dir.path().join("Public/stable.txt"), b"stable").unwrap();

    let router = RadixRouter::new().get("/users/{id}", |req: Request| async move {
        Response::json(format!(r#"{{"id":"{}"}}"#, req.param("id").unwrap_or("?")).into_bytes())
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::new());

    for path in ["/users/42", "/stable.txt", "/nothing-here"] {
        let first = dispatcher.handle(get(path)).await;
        let second = dispatcher.handle(get(path)).await;
        assert_eq!(first.status_code(), second.status_code());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(first.body(), second.body());
    }
}

// ── Sessions in the default chain ─────────────────────────────────────────────

#[tokio::test]
async fn default_chain_attaches_a_session() {
    let (_dir, config) = workspace();
    let router = RadixRouter::new().get("/whoami", |req: Request| async move {
        Response::text(req.session_id().unwrap_or("none").to_owned())
    });
    let dispatcher = Dispatcher::new(router, &config, Chain::default_chain());

    let resp = dispatcher.handle(get("/whoami")).await;
    assert_ne!(resp.body(), b"none");
    assert!(resp.header("set-cookie").is_some());
}
