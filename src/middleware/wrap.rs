//! Lifting classic middleware into a chain.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::Context;
use crate::handler::{BoxError, BoxFuture, BoxedClassicHandler, BoxedHandler, ClassicHandler, Handler};
use crate::middleware::Constructor;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Turns classic middleware (`ClassicHandler -> ClassicHandler`) into a
/// [`Constructor`].
///
/// On every request the classic middleware is applied around a classic view
/// of the next handler, bound to the context the wrapped stage was called
/// with. The classic middleware itself never sees that context.
///
/// Errors still cross the wrapped stage: if the next handler fails while the
/// classic middleware runs, that error is what the wrapped stage returns. If
/// the classic middleware does not call its handler, the stage succeeds. When
/// the handler is called more than once, the result of the last call decides.
///
/// ```rust
/// use apollo::{BoxedClassicHandler, ClassicHandler, classic_fn, wrap};
/// use std::sync::Arc;
///
/// fn banner(next: BoxedClassicHandler) -> BoxedClassicHandler {
///     Arc::new(classic_fn(move |w, req| {
///         let next = next.clone();
///         Box::pin(async move {
///             w.write_str("m0\n");
///             next.serve(w, req).await;
///         })
///     }))
/// }
///
/// let constructor = wrap(banner);
/// ```
pub fn wrap<F>(middleware: F) -> Constructor
where
    F: Fn(BoxedClassicHandler) -> BoxedClassicHandler + Send + Sync + 'static,
{
    let middleware = Arc::new(middleware);
    Constructor::new(move |next| {
        Arc::new(Wrapped { middleware: Arc::clone(&middleware), next }) as BoxedHandler
    })
}

struct Wrapped<F> {
    middleware: Arc<F>,
    next: BoxedHandler,
}

impl<F> Handler for Wrapped<F>
where
    F: Fn(BoxedClassicHandler) -> BoxedClassicHandler + Send + Sync + 'static,
{
    fn serve<'a>(
        &'a self,
        ctx: &'a Context,
        w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let failure = Arc::new(Mutex::new(None));
            let inner: BoxedClassicHandler = Arc::new(Bound {
                ctx: ctx.clone(),
                next: Arc::clone(&self.next),
                failure: Arc::clone(&failure),
            });

            (self.middleware)(inner).serve(w, req).await;

            let failure = failure.lock().take();
            failure.map_or(Ok(()), Err)
        })
    }
}

/// The classic face of `next`: calls it with a fixed context and parks its
/// error where the wrapped stage can pick it up.
struct Bound {
    ctx: Context,
    next: BoxedHandler,
    failure: Arc<Mutex<Option<BoxError>>>,
}

impl ClassicHandler for Bound {
    fn serve<'a>(&'a self, w: &'a mut ResponseWriter, req: &'a Request) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let result = self.next.serve(&self.ctx, w, req).await;
            *self.failure.lock() = result.err();
        })
    }
}
