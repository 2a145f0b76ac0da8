//! Immutable, ordered middleware chains.
//!
//! # Ordering
//!
//! The first constructor listed is the outermost. For `[c0, c1, c2]` and a
//! terminal handler `h` the finalized handler is `c0(c1(c2(h)))`:
//!
//! ```text
//! request ─▶ c0 ─▶ c1 ─▶ c2 ─▶ h
//!                                │
//! response ◀─ c0 ◀─ c1 ◀─ c2 ◀───┘
//! ```
//!
//! Pre-work runs `c0, c1, c2`, post-work runs `c2, c1, c0`. Position decides
//! the order, not whether a stage was written against the context-aware or
//! the classic contract.
//!
//! # Sharing
//!
//! Every builder method returns a new [`Chain`]; the receiver is never
//! touched. Build a base chain once at startup and derive per-route or
//! per-request chains from it freely, from any number of tasks.

use std::sync::Arc;

use crate::adapter::{StripContext, SupplyContext};
use crate::context::Context;
use crate::handler::{BoxError, BoxFuture, BoxedHandler, ClassicHandler, Handler, handler_fn};
use crate::middleware::Constructor;
use crate::request::Request;
use crate::response::ResponseWriter;

/// The classic-contract handler a [`Chain`] finalizes into. Hand it to
/// [`Server::serve`](crate::Server::serve) or call it directly.
pub type Finalized = SupplyContext<BoxedHandler>;

/// An immutable list of middleware constructors plus the context to run
/// them with.
///
/// ```rust
/// use apollo::{BoxedHandler, Chain, Constructor, Context};
///
/// fn noop(next: BoxedHandler) -> BoxedHandler { next }
///
/// let base = Chain::new([Constructor::new(noop)]);
/// let app = base
///     .append([Constructor::new(noop)])
///     .with(Context::background())
///     .then_fn(|_ctx, w, _req| {
///         Box::pin(async move {
///             w.write_str("hello\n");
///             Ok(())
///         })
///     });
///
/// assert_eq!(base.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Chain {
    constructors: Arc<[Constructor]>,
    ctx: Context,
}

impl Chain {
    /// A chain running `constructors` in the given order, with the
    /// background context attached.
    pub fn new(constructors: impl IntoIterator<Item = Constructor>) -> Self {
        Self { constructors: constructors.into_iter().collect(), ctx: Context::background() }
    }

    /// Returns a new chain with `constructors` placed after the existing ones.
    pub fn append(&self, constructors: impl IntoIterator<Item = Constructor>) -> Self {
        let constructors = self.constructors.iter().cloned().chain(constructors).collect();
        Self { constructors, ctx: self.ctx.clone() }
    }

    /// Returns a new chain with `other`'s constructors placed after this
    /// chain's. The context of `self` is kept.
    pub fn extend(&self, other: &Chain) -> Self {
        self.append(other.constructors.iter().cloned())
    }

    /// Returns a new chain that finalizes with `ctx` instead of the current
    /// context.
    pub fn with(&self, ctx: Context) -> Self {
        Self { constructors: Arc::clone(&self.constructors), ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Folds the constructors around `handler` and binds the chain's context.
    pub fn then(&self, handler: impl Handler) -> Finalized {
        let handler: BoxedHandler = Arc::new(handler);
        let composed = self
            .constructors
            .iter()
            .rev()
            .fold(handler, |next, constructor| constructor.apply(next));
        SupplyContext::new(self.ctx.clone(), composed)
    }

    /// [`then`](Self::then) for a plain function or closure.
    pub fn then_fn<F>(&self, f: F) -> Finalized
    where
        F: for<'a> Fn(&'a Context, &'a mut ResponseWriter, &'a Request) -> BoxFuture<'a, Result<(), BoxError>>
            + Send
            + Sync
            + 'static,
    {
        self.then(handler_fn(f))
    }

    /// [`then`](Self::then) for a classic terminal handler. The handler does
    /// not see the context and never reports an error.
    pub fn then_classic(&self, handler: impl ClassicHandler) -> Finalized {
        self.then(StripContext::new(handler))
    }
}
