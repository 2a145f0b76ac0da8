//! One-directional bridges between the two handler contracts.
//!
//! | Adapter | From | To | Context | Error |
//! |---|---|---|---|---|
//! | [`SupplyContext`] | [`Handler`] | [`ClassicHandler`] | bound at construction | dropped |
//! | [`StripContext`] | [`ClassicHandler`] | [`Handler`] | ignored | always `Ok` |
//!
//! `SupplyContext` sits at the transport boundary. The classic contract has no
//! return channel, so an error that no middleware consumed ends there. Install
//! an outermost middleware that inspects the error if the edge must see it.

use tracing::trace;

use crate::context::Context;
use crate::handler::{BoxError, BoxFuture, ClassicHandler, Handler};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Serves a context-aware handler through the classic contract, always with
/// the same bound [`Context`].
///
/// This is what [`Chain::then`](crate::Chain::then) returns.
#[derive(Clone, Debug)]
pub struct SupplyContext<H> {
    ctx: Context,
    handler: H,
}

impl<H: Handler> SupplyContext<H> {
    pub fn new(ctx: Context, handler: H) -> Self {
        Self { ctx, handler }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

impl<H: Handler> ClassicHandler for SupplyContext<H> {
    fn serve<'a>(&'a self, w: &'a mut ResponseWriter, req: &'a Request) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if let Err(e) = self.handler.serve(&self.ctx, w, req).await {
                trace!(error = %e, "unhandled handler error dropped at transport boundary");
            }
        })
    }
}

/// Serves a classic handler through the context-aware contract.
///
/// The context is never shown to the wrapped handler, and the result is
/// always `Ok(())`.
#[derive(Clone, Debug)]
pub struct StripContext<C>(C);

impl<C: ClassicHandler> StripContext<C> {
    pub fn new(handler: C) -> Self {
        Self(handler)
    }
}

impl<C: ClassicHandler> Handler for StripContext<C> {
    fn serve<'a>(
        &'a self,
        _ctx: &'a Context,
        w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            self.0.serve(w, req).await;
            Ok(())
        })
    }
}
