//! End-to-end chain scenarios, served over a real socket.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use apollo::{Chain, Constructor, Context, classic_fn, wrap};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use common::{
    TestServer, from_context, handler_context, handler_error, handler_zero, middle_add_error,
    middle_handle_error, middle_one, middle_two, middle_zero, new_test_context,
};

fn ten() -> Context {
    let ctx = new_test_context(&Context::background(), 10);
    assert_eq!(from_context(&ctx), Some(10));
    ctx
}

#[tokio::test]
async fn wrap_chains() {
    let chain = Chain::new([Constructor::new(middle_one), wrap(middle_zero), Constructor::new(middle_two)])
        .with(ten())
        .then_fn(handler_context);

    let server = TestServer::start(chain).await;
    let (status, body) = server.get().await;
    server.stop().await;

    assert_eq!(status, 200);
    assert_eq!(body, "m1\nm0\nm2\n10\n");
}

#[tokio::test]
async fn wrap_chains_with_nil_error() {
    let chain = Chain::new([
        Constructor::new(middle_handle_error),
        wrap(middle_zero),
        Constructor::new(middle_two),
    ])
    .with(ten())
    .then_fn(handler_context);

    let server = TestServer::start(chain).await;
    let (status, body) = server.get().await;
    server.stop().await;

    assert_eq!(status, 200);
    assert_eq!(body, "m0\nm2\n10\n");
}

#[tokio::test]
async fn wrap_chains_with_error() {
    let chain = Chain::new([
        Constructor::new(middle_handle_error),
        wrap(middle_zero),
        Constructor::new(middle_two),
    ])
    .with(ten())
    .then_fn(handler_error);

    let server = TestServer::start(chain).await;
    let (status, body) = server.get().await;
    server.stop().await;

    assert_eq!(status, 200);
    assert_eq!(body, "m0\nm2\nerror:err1\n");
}

#[tokio::test]
async fn wrap_chains_with_error_and_empty_context() {
    let chain = Chain::new([
        Constructor::new(middle_handle_error),
        wrap(middle_zero),
        Constructor::new(middle_two),
    ])
    .with(Context::background())
    .then_fn(handler_context);

    let server = TestServer::start(chain).await;
    let (status, body) = server.get().await;
    server.stop().await;

    assert_eq!(status, 200);
    assert_eq!(body, "m0\nm2\nerror:value not in context\n");
}

#[tokio::test]
async fn wrap_chains_with_multiple_errors() {
    let chain = Chain::new([
        Constructor::new(middle_handle_error),
        wrap(middle_zero),
        Constructor::new(middle_two),
        Constructor::new(middle_add_error),
    ])
    .with(ten())
    .then_fn(handler_error);

    let server = TestServer::start(chain).await;
    let (status, body) = server.get().await;
    server.stop().await;

    assert_eq!(status, 200);
    assert_eq!(body, "m0\nm2\nerror:err1\nerror:found an error\n");
}

#[tokio::test]
async fn unconsumed_error_looks_like_success_at_the_boundary() {
    let base = Chain::new([Constructor::new(middle_one), Constructor::new(middle_two)]).with(ten());

    let failing = TestServer::start(base.then_fn(handler_error)).await;
    let succeeding = TestServer::start(base.then_fn(|_ctx, _w, _req| Box::pin(async { Ok(()) }))).await;

    let (failed_status, failed_body) = failing.get().await;
    let (ok_status, ok_body) = succeeding.get().await;
    failing.stop().await;
    succeeding.stop().await;

    assert_eq!(failed_status, ok_status);
    assert_eq!(failed_body, ok_body);
    assert_eq!(failed_body, "m1\nm2\n");
}

#[tokio::test]
async fn derived_context_leaves_base_chain_alone() {
    let base = Chain::new([Constructor::new(middle_handle_error)]);
    let derived = base.with(ten());

    let plain = TestServer::start(base.then_fn(handler_context)).await;
    let with_value = TestServer::start(derived.then_fn(handler_context)).await;

    let (_, plain_body) = plain.get().await;
    let (_, value_body) = with_value.get().await;
    plain.stop().await;
    with_value.stop().await;

    assert_eq!(plain_body, "error:value not in context\n");
    assert_eq!(value_body, "10\n");
}

#[tokio::test]
async fn classic_terminal_handler() {
    let chain = Chain::new([wrap(middle_zero), Constructor::new(middle_one)]).with(ten());

    let server = TestServer::start(chain.then_classic(classic_fn(handler_zero))).await;
    let (status, body) = server.get().await;
    server.stop().await;

    assert_eq!(status, 200);
    assert_eq!(body, "m0\nm1\nh0\n");
}

#[tokio::test]
async fn concurrent_requests_share_one_chain() {
    let chain = Chain::new([wrap(middle_zero), Constructor::new(middle_two)])
        .with(ten())
        .then_fn(handler_context);
    let server = TestServer::start(chain).await;
    let addr = server.addr();

    let clients: Vec<_> = (0..16).map(|_| tokio::spawn(common::get(addr))).collect();
    for client in clients {
        let (status, body) = client.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, "m0\nm2\n10\n");
    }

    server.stop().await;
}

#[tokio::test]
async fn unreadable_body_is_rejected_before_the_chain() {
    let called = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&called);
    let chain = Chain::new([Constructor::new(middle_one)]).then_fn(move |_ctx, w, _req| {
        seen.store(true, Ordering::SeqCst);
        Box::pin(async move {
            w.write_str("h\n");
            Ok(())
        })
    });
    let server = TestServer::start(chain).await;

    // `zz` is not a hex chunk size, so the body can never be decoded.
    let mut stream = TcpStream::connect(server.addr()).await.unwrap();
    stream
        .write_all(b"POST / HTTP/1.1\r\nhost: localhost\r\ntransfer-encoding: chunked\r\n\r\nzz\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("server kept the connection open")
        .unwrap();
    drop(stream);
    server.stop().await;

    assert!(raw.starts_with(b"HTTP/1.1 400"), "{}", String::from_utf8_lossy(&raw));
    assert!(!called.load(Ordering::SeqCst));
}
