//! Middleware layer.
//!
//! A middleware is a [`Constructor`]: a function that receives the next
//! [`Handler`](crate::Handler) in the chain and returns a new handler wrapping it. The new
//! handler may write to the response before and after calling `next`, inspect
//! or replace the error `next` returns, or never call `next` at all.
//!
//! ```rust
//! use apollo::{BoxedHandler, Constructor, Handler, handler_fn};
//! use std::sync::Arc;
//!
//! fn report_errors(next: BoxedHandler) -> BoxedHandler {
//!     Arc::new(handler_fn(move |ctx, w, req| {
//!         let next = next.clone();
//!         Box::pin(async move {
//!             if let Err(e) = next.serve(ctx, w, req).await {
//!                 w.write_str(&format!("error:{e}\n"));
//!             }
//!             Ok(())
//!         })
//!     }))
//! }
//!
//! let c = Constructor::new(report_errors);
//! ```
//!
//! Middleware written against the classic contract joins a chain through
//! [`wrap`].

mod wrap;

pub use wrap::wrap;

use std::fmt;
use std::sync::Arc;

use crate::handler::BoxedHandler;

/// A middleware: `Handler -> Handler`.
///
/// Cheap to clone. Constructors are stateless values; the same one can be
/// shared by any number of chains.
#[derive(Clone)]
pub struct Constructor(Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>);

impl Constructor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Decorates `next`.
    pub fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        (self.0)(next)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constructor(..)")
    }
}
