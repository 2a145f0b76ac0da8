//! # apollo
//!
//! Context-aware middleware chaining for HTTP services.
//!
//! ## The model
//!
//! A handler has one of two shapes:
//!
//! - **Context-aware** ([`Handler`]): receives a [`Context`], the
//!   [`ResponseWriter`] and the [`Request`], and may report an error.
//! - **Classic** ([`ClassicHandler`]): receives only the writer and the
//!   request, reports nothing. This is what the [`Server`] drives.
//!
//! A middleware is a [`Constructor`]: `Handler -> Handler`. Classic middleware
//! joins in through [`wrap`]. A [`Chain`] is an immutable, ordered list of
//! constructors plus a context; [`Chain::then`] folds them around a terminal
//! handler and returns a classic handler ready for the server.
//!
//! What apollo deliberately leaves to you:
//!
//! - **Error policy**: errors travel outward through the chain like return
//!   values. Any middleware may inspect, swallow or replace them. An error no
//!   middleware consumed is dropped at the transport boundary.
//! - **Routing**: one chain, one handler. Put a router in front if you need
//!   one.
//! - **Logging, panic recovery, timeouts**: write them as middleware.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use apollo::{BoxedHandler, Chain, Constructor, Context, Handler, Server, handler_fn};
//!
//! #[derive(PartialEq)]
//! struct Greeting;
//!
//! fn report_errors(next: BoxedHandler) -> BoxedHandler {
//!     Arc::new(handler_fn(move |ctx, w, req| {
//!         let next = next.clone();
//!         Box::pin(async move {
//!             if let Err(e) = next.serve(ctx, w, req).await {
//!                 w.write_header(http::StatusCode::INTERNAL_SERVER_ERROR);
//!                 w.write_str(&format!("error: {e}\n"));
//!             }
//!             Ok(())
//!         })
//!     }))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apollo::Error> {
//!     let ctx = Context::background().with_value(Greeting, "hello");
//!
//!     let app = Chain::new([Constructor::new(report_errors)])
//!         .with(ctx)
//!         .then_fn(|ctx, w, _req| {
//!             Box::pin(async move {
//!                 let greeting = ctx.value::<_, &str>(&Greeting).ok_or("no greeting")?;
//!                 w.write_str(greeting);
//!                 Ok(())
//!             })
//!         });
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod adapter;
mod chain;
mod context;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use adapter::{StripContext, SupplyContext};
pub use chain::{Chain, Finalized};
pub use context::{CancelHandle, Context};
pub use error::Error;
pub use handler::{
    BoxError, BoxFuture, BoxedClassicHandler, BoxedHandler, ClassicFn, ClassicHandler, Handler, HandlerFn,
    classic_fn, handler_fn,
};
pub use middleware::{Constructor, wrap};
pub use request::Request;
pub use response::ResponseWriter;
pub use server::Server;
