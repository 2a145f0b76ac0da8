//! Sample handlers, middleware and a throwaway server shared by the
//! integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use apollo::{
    BoxError, BoxFuture, BoxedClassicHandler, BoxedHandler, ClassicHandler, Context, Handler, Request,
    ResponseWriter, Server, classic_fn, handler_fn,
};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// ── Context values ────────────────────────────────────────────────────────────

#[derive(PartialEq)]
struct TestKey;

pub fn new_test_context(parent: &Context, value: i32) -> Context {
    parent.with_value(TestKey, value)
}

pub fn from_context(ctx: &Context) -> Option<i32> {
    ctx.value::<_, i32>(&TestKey).copied()
}

// ── Terminal handlers ─────────────────────────────────────────────────────────

pub fn handler_zero<'a>(w: &'a mut ResponseWriter, _req: &'a Request) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        w.write_str("h0\n");
    })
}

/// Writes the test value from the context, or fails when it is missing.
pub fn handler_context<'a>(
    ctx: &'a Context,
    w: &'a mut ResponseWriter,
    _req: &'a Request,
) -> BoxFuture<'a, Result<(), BoxError>> {
    Box::pin(async move {
        let value = from_context(ctx).ok_or("value not in context")?;
        w.write_str(&format!("{value}\n"));
        Ok(())
    })
}

pub fn handler_error<'a>(
    _ctx: &'a Context,
    _w: &'a mut ResponseWriter,
    _req: &'a Request,
) -> BoxFuture<'a, Result<(), BoxError>> {
    Box::pin(async move { Err("err1".into()) })
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// Classic middleware: writes `m0` and calls through.
pub fn middle_zero(next: BoxedClassicHandler) -> BoxedClassicHandler {
    Arc::new(classic_fn(move |w, req| {
        let next = next.clone();
        Box::pin(async move {
            w.write_str("m0\n");
            next.serve(w, req).await;
        })
    }))
}

fn marker(label: &'static str, next: BoxedHandler) -> BoxedHandler {
    Arc::new(handler_fn(move |ctx, w, req| {
        let next = next.clone();
        Box::pin(async move {
            w.write_str(label);
            next.serve(ctx, w, req).await
        })
    }))
}

pub fn middle_one(next: BoxedHandler) -> BoxedHandler {
    marker("m1\n", next)
}

pub fn middle_two(next: BoxedHandler) -> BoxedHandler {
    marker("m2\n", next)
}

/// Reports the downstream error into the response and consumes it.
pub fn middle_handle_error(next: BoxedHandler) -> BoxedHandler {
    Arc::new(handler_fn(move |ctx, w, req| {
        let next = next.clone();
        Box::pin(async move {
            if let Err(e) = next.serve(ctx, w, req).await {
                w.write_str(&format!("error:{e}\n"));
            }
            Ok(())
        })
    }))
}

/// Reports the downstream error, then fails with an error of its own.
pub fn middle_add_error(next: BoxedHandler) -> BoxedHandler {
    Arc::new(handler_fn(move |ctx, w, req| {
        let next = next.clone();
        Box::pin(async move {
            if let Err(e) = next.serve(ctx, w, req).await {
                w.write_str(&format!("error:{e}\n"));
            }
            Err("found an error".into())
        })
    }))
}

// ── Test server ───────────────────────────────────────────────────────────────

pub struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), apollo::Error>>,
}

impl TestServer {
    /// Serves `handler` on an ephemeral localhost port.
    pub async fn start(handler: impl ClassicHandler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::from_listener(listener);
        let addr = server.local_addr().unwrap();
        let (shutdown, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(server.serve_with_shutdown(handler, async move {
            let _ = rx.await;
        }));

        Self { addr, shutdown, task }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Issues `GET /` and returns the status code and the body.
    pub async fn get(&self) -> (u16, String) {
        get(self.addr).await
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        self.task.await.unwrap().unwrap();
    }
}

/// `GET /` on a fresh connection the server closes after responding.
pub async fn get(addr: SocketAddr) -> (u16, String) {
    let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();
    let req = http::Request::get(format!("http://{addr}/"))
        .header(http::header::CONNECTION, "close")
        .body(Empty::new())
        .unwrap();

    let res = client.request(req).await.unwrap();
    let status = res.status().as_u16();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
