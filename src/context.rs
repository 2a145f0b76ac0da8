//! Request-scoped, immutable value carrier.
//!
//! A [`Context`] is a persistent singly-linked list: every
//! [`with_value`](Context::with_value) allocates one node pointing at its
//! parent and returns a new handle. Parents never see values added by their
//! children, and two requests derived from the same base context cannot see
//! each other's additions. Cloning a context is one `Arc` increment.
//!
//! ```rust
//! use apollo::Context;
//!
//! #[derive(PartialEq)]
//! struct UserId;
//!
//! let ctx = Context::background().with_value(UserId, 42_u64);
//!
//! assert_eq!(ctx.value::<_, u64>(&UserId), Some(&42));
//! assert_eq!(ctx.value::<_, u32>(&UserId), None); // wrong type, not found
//! assert_eq!(Context::background().value::<_, u64>(&UserId), None);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Immutable, key-addressed values for one request's lifetime.
///
/// See the [module documentation](self) for the sharing rules.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
    cancel: Option<CancellationToken>,
}

struct Node {
    key: Box<dyn Any + Send + Sync>,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

// Unlink iteratively: the derived drop would recurse once per ancestor.
impl Drop for Node {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = match Arc::into_inner(node) {
                Some(mut node) => node.parent.take(),
                None => break,
            };
        }
    }
}

impl Context {
    /// The empty root context. Every lookup reports "not found" and it can
    /// never be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context carrying `value` under `key`.
    ///
    /// `self` is left untouched. A key matches on lookup only when both its
    /// type and its value are equal, so a private unit struct makes a
    /// collision-free key.
    pub fn with_value<K, V>(&self, key: K, value: V) -> Self
    where
        K: Any + PartialEq + Send + Sync,
        V: Any + Send + Sync,
    {
        let node = Node {
            key: Box::new(key),
            value: Box::new(value),
            parent: self.head.clone(),
        };
        Self { head: Some(Arc::new(node)), cancel: self.cancel.clone() }
    }

    /// Looks up `key`, walking from this context towards the root.
    ///
    /// The nearest ancestor holding an equal key wins. Returns `None` when no
    /// ancestor holds the key, or when the value stored there is not a `V`.
    pub fn value<K, V>(&self, key: &K) -> Option<&V>
    where
        K: Any + PartialEq,
        V: Any,
    {
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            if n.key.downcast_ref::<K>().is_some_and(|k| k == key) {
                return n.value.downcast_ref::<V>();
            }
            node = n.parent.as_deref();
        }
        None
    }

    /// Returns a cancellable child context and the handle that cancels it.
    ///
    /// Values are inherited. Cancelling this context's ancestors also cancels
    /// the child; cancelling the child leaves `self` alone.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = match &self.cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let ctx = Self { head: self.head.clone(), cancel: Some(token.clone()) };
        (ctx, CancelHandle(token))
    }

    /// Whether cancellation has been signaled for this context.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Resolves once this context is cancelled.
    ///
    /// Never resolves for a context that has no cancellation attached.
    pub async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            depth += 1;
            node = n.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.depth())
            .field("cancellable", &self.cancel.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Signals cancellation to the context returned alongside it by
/// [`Context::with_cancel`] and to everything derived from that context.
#[derive(Clone, Debug)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }
}
