//! The two handler contracts and their function adapters.
//!
//! # Two shapes, one pipeline
//!
//! A [`Handler`] is context-aware: it receives the request [`Context`], the
//! response sink and the request, and may report an error. A
//! [`ClassicHandler`] only sees the transport objects and reports nothing.
//! The server drives the classic shape; middleware and terminal handlers are
//! usually written against the context-aware one. The adapters
//! [`SupplyContext`](crate::SupplyContext) and
//! [`StripContext`](crate::StripContext) convert between the two.
//!
//! Both traits have exactly one method and return a boxed future, so they are
//! object safe and every stage of a chain can be stored as
//! `Arc<dyn Handler>`:
//!
//! ```text
//! fn hello(ctx, w, req) -> BoxFuture<…>        ← user writes this
//!        ↓ handler_fn(hello)
//! HandlerFn(hello)                             ← implements Handler
//!        ↓ Arc::new(…)
//! BoxedHandler = Arc<dyn Handler>              ← what constructors receive
//!        ↓ next.serve(ctx, w, req)  at request time
//! one vtable dispatch + one boxed future
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;
use crate::response::ResponseWriter;

// ── Shared types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future borrowing from the call arguments.
///
/// `Send` lets tokio move the future across worker threads; `'a` ties it to
/// the context, sink and request it was handed.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The error a context-aware handler may report.
///
/// The taxonomy belongs to the application. The chain only forwards these
/// values; what they mean is decided by whichever middleware inspects them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A shared, type-erased context-aware handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// A shared, type-erased classic handler.
pub type BoxedClassicHandler = Arc<dyn ClassicHandler>;

// ── Contracts ─────────────────────────────────────────────────────────────────

/// The context-aware handler contract.
///
/// Terminal handlers and the handlers produced by middleware
/// [`Constructor`](crate::Constructor)s both implement this.
pub trait Handler: Send + Sync + 'static {
    fn serve<'a>(
        &'a self,
        ctx: &'a Context,
        w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// The classic handler contract: transport objects in, nothing out.
///
/// This is the only shape [`Server`](crate::Server) knows how to drive.
pub trait ClassicHandler: Send + Sync + 'static {
    fn serve<'a>(&'a self, w: &'a mut ResponseWriter, req: &'a Request) -> BoxFuture<'a, ()>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve<'a>(
        &'a self,
        ctx: &'a Context,
        w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        (**self).serve(ctx, w, req)
    }
}

impl<C: ClassicHandler + ?Sized> ClassicHandler for Arc<C> {
    fn serve<'a>(&'a self, w: &'a mut ResponseWriter, req: &'a Request) -> BoxFuture<'a, ()> {
        (**self).serve(w, req)
    }
}

// ── Function adapters ─────────────────────────────────────────────────────────

/// A plain function or closure acting as a [`Handler`].
///
/// Obtain via [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Adapts a function into a [`Handler`].
///
/// The function returns a boxed future so that it can borrow its arguments.
/// Closures work as long as they are passed straight to `handler_fn`, which
/// lets the compiler infer the higher-ranked signature:
///
/// ```rust
/// use apollo::{BoxError, Handler, handler_fn};
///
/// let hello = handler_fn(|_ctx, w, _req| {
///     Box::pin(async move {
///         w.write_str("hello\n");
///         Ok::<(), BoxError>(())
///     })
/// });
/// # fn assert_handler(_: &impl Handler) {}
/// # assert_handler(&hello);
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a Context, &'a mut ResponseWriter, &'a Request) -> BoxFuture<'a, Result<(), BoxError>>
        + Send
        + Sync
        + 'static,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a Context, &'a mut ResponseWriter, &'a Request) -> BoxFuture<'a, Result<(), BoxError>>
        + Send
        + Sync
        + 'static,
{
    fn serve<'a>(
        &'a self,
        ctx: &'a Context,
        w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        (self.0)(ctx, w, req)
    }
}

/// A plain function or closure acting as a [`ClassicHandler`].
///
/// Obtain via [`classic_fn`].
#[derive(Clone)]
pub struct ClassicFn<F>(F);

/// Adapts a function into a [`ClassicHandler`].
pub fn classic_fn<F>(f: F) -> ClassicFn<F>
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a Request) -> BoxFuture<'a, ()> + Send + Sync + 'static,
{
    ClassicFn(f)
}

impl<F> ClassicHandler for ClassicFn<F>
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a Request) -> BoxFuture<'a, ()> + Send + Sync + 'static,
{
    fn serve<'a>(&'a self, w: &'a mut ResponseWriter, req: &'a Request) -> BoxFuture<'a, ()> {
        (self.0)(w, req)
    }
}
