//! HTTP server and graceful shutdown.
//!
//! The server knows nothing about chains or contexts. It drives any
//! [`ClassicHandler`], usually the [`Finalized`](crate::Finalized)
//! handler a [`Chain`](crate::Chain) produced, once per request. It does not
//! route: one handler sees every path.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C (or the caller's own signal with
//! [`Server::serve_with_shutdown`]) the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from `serve`, which lets `main` exit cleanly.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::ClassicHandler;
use crate::request::Request;
use crate::response::ResponseWriter;

/// The HTTP server.
pub struct Server {
    listen: Listen,
}

enum Listen {
    Addr(SocketAddr),
    Bound(TcpListener),
}

impl Server {
    /// Configures the server to bind to `addr` when it starts serving.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use apollo::Server;
    /// let server = Server::bind("0.0.0.0:3000")?;
    /// # Ok::<(), apollo::Error>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr
            .parse()
            .map_err(|source| Error::InvalidAddr { addr: addr.to_owned(), source })?;
        Ok(Self { listen: Listen::Addr(addr) })
    }

    /// Serves on an already bound listener, e.g. one bound to port 0.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listen: Listen::Bound(listener) }
    }

    /// The address the server listens on, or will listen on.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        match &self.listen {
            Listen::Addr(addr) => Ok(*addr),
            Listen::Bound(listener) => Ok(listener.local_addr()?),
        }
    }

    /// Starts accepting connections and dispatching requests to `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, handler: impl ClassicHandler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Self::serve), but shuts down when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        handler: impl ClassicHandler,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = match self.listen {
            Listen::Addr(addr) => TcpListener::bind(addr).await?,
            Listen::Bound(listener) => listener,
        };
        let addr = listener.local_addr()?;

        // Shared read-only by every connection task.
        let handler = Arc::new(handler);

        info!(%addr, "apollo listening");

        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let handler = Arc::clone(&handler);
                            async move { dispatch(handler, req, remote_addr).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("apollo stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers one request, runs the handler, and hands back what it wrote.
///
/// The error type is [`Infallible`](std::convert::Infallible): whatever the
/// handler does, hyper gets a response.
async fn dispatch<H: ClassicHandler>(
    handler: Arc<H>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            let mut w = ResponseWriter::new();
            w.write_header(http::StatusCode::BAD_REQUEST);
            return Ok(w.into_response());
        }
    };

    let req = Request::from_parts(parts, body);
    let mut w = ResponseWriter::new();
    handler.serve(&mut w, &req).await;

    Ok(w.into_response())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C). On
/// Windows only Ctrl-C is available. If a listener cannot be installed the
/// failure is logged and that signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // `pending()` never resolves, so on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
