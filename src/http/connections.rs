//! Per-connection serving and shutdown tracking.
//!
//! # Responsibilities
//! - Drive each accepted socket as an HTTP/1 or HTTP/2 connection
//! - Attach the peer address for `ConnectInfo`
//! - Drain every connection on shutdown, and abort the stragglers when the
//!   drain deadline passes
//!
//! # Design Decisions
//! - Connections run in a `JoinSet` owned by the serve loop, so a forced
//!   shutdown can close them instead of leaving detached tasks behind
//! - Upgraded connections leave the set once hyper hands the socket over;
//!   session tasks are never drained or aborted here

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::ConnectInfo, http::Request, Router};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tower::ServiceExt;

/// Live HTTP connections of one listener.
pub struct ConnectionSet {
    builder: Builder<TokioExecutor>,
    graceful: GracefulShutdown,
    tasks: JoinSet<()>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(TokioExecutor::new()),
            graceful: GracefulShutdown::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Connections whose tasks have not been reaped yet.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Serve `router` on `stream` until the peer closes, the connection is
    /// upgraded, or shutdown begins.
    pub fn serve(&mut self, stream: TcpStream, peer: SocketAddr, router: Router) {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::trace!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
        }

        let service = router.map_request(move |mut request: Request<Incoming>| {
            request.extensions_mut().insert(ConnectInfo(peer));
            request
        });
        let connection = self
            .builder
            .serve_connection_with_upgrades(TokioIo::new(stream), TowerToHyperService::new(service))
            .into_owned();
        let connection = self.graceful.watch(connection);

        self.tasks.spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(peer = %peer, error = %e, "Connection ended with error");
            }
        });
    }

    /// Drop bookkeeping for connections that already finished.
    pub fn reap(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    /// Signal every connection to finish its in-flight request and close.
    ///
    /// Returns `false` when `timeout` elapsed first; the remaining
    /// connections are then aborted and their sockets closed.
    pub async fn drain(self, timeout: Duration) -> bool {
        let Self {
            graceful,
            mut tasks,
            ..
        } = self;

        let drained = tokio::time::timeout(timeout, graceful.shutdown())
            .await
            .is_ok();
        if !drained {
            tracing::warn!(connections = tasks.len(), "Aborting connections still in flight");
            tasks.abort_all();
        }
        while tasks.join_next().await.is_some() {}
        drained
    }
}

impl Default for ConnectionSet {
    fn default() -> Self {
        Self::new()
    }
}
