//! Minimal apollo example: per-request context values, a wrapped classic
//! middleware, and an outermost middleware that turns errors into 500s.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/fail

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use apollo::{
    BoxError, BoxFuture, BoxedClassicHandler, BoxedHandler, ClassicHandler, Chain, Constructor, Context,
    Handler, Request, ResponseWriter, Server, classic_fn, handler_fn, wrap,
};
use http::StatusCode;

#[derive(PartialEq)]
struct AppName;

#[derive(PartialEq)]
struct RequestId;

#[tokio::main]
async fn main() -> Result<(), apollo::Error> {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("APOLLO_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_owned());
    let ctx = Context::background().with_value(AppName, "apollo-demo");

    let app = Chain::new([
        Constructor::new(report_errors),
        request_id(),
        wrap(powered_by),
    ])
    .with(ctx)
    .then_fn(hello);

    Server::bind(&addr)?.serve(app).await
}

/// Outermost: whatever fails further in becomes a 500 with the message.
fn report_errors(next: BoxedHandler) -> BoxedHandler {
    Arc::new(handler_fn(move |ctx, w, req| {
        let next = next.clone();
        Box::pin(async move {
            if let Err(e) = next.serve(ctx, w, req).await {
                w.write_header(StatusCode::INTERNAL_SERVER_ERROR);
                w.write_str(&format!("error: {e}\n"));
            }
            Ok(())
        })
    }))
}

/// Derives a per-request context carrying a sequential id.
fn request_id() -> Constructor {
    let counter = Arc::new(AtomicU64::new(1));
    Constructor::new(move |next| {
        let counter = Arc::clone(&counter);
        Arc::new(handler_fn(move |ctx, w, req| {
            let next = next.clone();
            let id = counter.fetch_add(1, Ordering::Relaxed);
            Box::pin(async move {
                let ctx = ctx.with_value(RequestId, id);
                w.set_header("x-request-id", &id.to_string());
                next.serve(&ctx, w, req).await
            })
        })) as BoxedHandler
    })
}

/// A classic middleware that knows nothing about contexts.
fn powered_by(next: BoxedClassicHandler) -> BoxedClassicHandler {
    Arc::new(classic_fn(move |w, req| {
        let next = next.clone();
        Box::pin(async move {
            w.set_header("x-powered-by", "apollo");
            next.serve(w, req).await;
        })
    }))
}

fn hello<'a>(
    ctx: &'a Context,
    w: &'a mut ResponseWriter,
    req: &'a Request,
) -> BoxFuture<'a, Result<(), BoxError>> {
    Box::pin(async move {
        if req.path() == "/fail" {
            return Err("asked to fail".into());
        }
        let app = ctx.value::<_, &str>(&AppName).ok_or("app name missing")?;
        let id = ctx.value::<_, u64>(&RequestId).ok_or("request id missing")?;
        w.write_str(&format!("hello from {app}, request #{id}\n"));
        Ok(())
    })
}
