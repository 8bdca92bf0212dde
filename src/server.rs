//! HTTP server: accept loop, per-request dispatch, graceful shutdown.
//!
//! One tokio task per connection, tracked in a `JoinSet`. Ctrl-C (or
//! SIGTERM) stops the accept loop first, then in-flight connections drain
//! before [`Server::serve`] returns — so an interrupted dev session still
//! exits with status 0 and a closed socket.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server. Construct with [`Server::bind`], run with
/// [`Server::serve`].
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind `addr` when [`serve`](Server::serve)
    /// runs. For a dev server that address is loopback; nothing here stops
    /// a wider bind, but the CLI never asks for one.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Accepts connections and dispatches requests through `router` until
    /// an interrupt arrives, then drains and returns.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await.map_err(Error::bind)?;
        let router = Arc::new(router);

        info!(addr = %self.addr, "listening");

        // Every connection task lives in the JoinSet so shutdown can wait
        // for all of them.
        let mut connections = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check the signal before the listener so an interrupt stops
                // new connections even when accepts are queued up.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = connections.len(), "interrupt received, draining");
                    break;
                }

                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let router = Arc::clone(&router);
                            connections.spawn(handle_connection(stream, peer, router));
                        }
                        Err(e) => error!("accept error: {e}"),
                    }
                }

                // Discard finished connection tasks so the set stays small
                // over a long session.
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        while connections.join_next().await.is_some() {}

        info!("server stopped");
        Ok(())
    }
}

/// Runs one connection to completion. hyper calls the service once per
/// request on the connection; HTTP/1.1 and HTTP/2 both work through the
/// auto builder.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, router: Arc<Router>) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| {
        let router = Arc::clone(&router);
        async move { dispatch(router, req).await }
    });

    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
    {
        debug!(peer = %peer, "connection ended with error: {e}");
    }
}

/// Routes one request and produces one response.
///
/// Infallible on purpose: every failure becomes an HTTP status, so hyper
/// never tears a connection down over an application error, and nothing a
/// request does can stop the accept loop.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    // uri.path() excludes the query string, so `/api/achievements?x=1`
    // routes the same as the bare path.
    let path = parts.uri.path().to_owned();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(%path, "failed to read request body: {e}");
            return Ok(Response::status(http::StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let response = match router.lookup(&parts.method, &path) {
        Some((handler, params)) => {
            let request = Request::new(parts.method.clone(), path.clone(), parts.headers, body, params);
            handler.call(request).await
        }
        None => Response::status(http::StatusCode::NOT_FOUND),
    };

    debug!(method = %parts.method, %path, status = %response.status, "handled");
    Ok(response.into_inner())
}

/// Resolves on the first interrupt the process receives: Ctrl-C anywhere,
/// SIGTERM additionally on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}
