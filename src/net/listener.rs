//! TCP listener binding and graceful serving.
//!
//! # Responsibilities
//! - Bind the gateway and worker listeners
//! - Serve an Axum app until shutdown is triggered
//! - Drain in-flight requests within a bounded grace period

use std::future::IntoFuture;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use axum::Router;
use tokio::net::{TcpListener, TcpSocket};

use crate::lifecycle::{Shutdown, ShutdownOutcome};

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind a listener on `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ListenerError::Bind { addr: addr.clone(), source })?;

    tracing::info!(address = %addr, "Listener bound");
    Ok(listener)
}

/// Bind synchronously so callers see bind errors before spawning a task.
///
/// Sets `SO_REUSEADDR` like [`bind`]. Must be called from within a Tokio
/// runtime.
pub fn bind_now(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = format!("{}:{}", host, port);
    let to_err = |source| ListenerError::Bind { addr: addr.clone(), source };

    let socket_addr = (host, port)
        .to_socket_addrs()
        .map_err(to_err)?
        .next()
        .ok_or_else(|| to_err(io::Error::new(io::ErrorKind::AddrNotAvailable, "no address resolved")))?;

    let socket = if socket_addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(to_err)?;

    #[cfg(unix)]
    socket.set_reuseaddr(true).map_err(to_err)?;
    socket.bind(socket_addr).map_err(to_err)?;
    let listener = socket.listen(1024).map_err(to_err)?;

    tracing::info!(address = %addr, "Listener bound");
    Ok(listener)
}

/// Serve `app` on `listener` until `shutdown` fires.
///
/// Once triggered, the listener stops accepting and in-flight requests get
/// `grace` to finish. Returns [`ShutdownOutcome::Forced`] if they don't; the
/// caller is expected to exit the process in that case.
pub async fn serve_with_grace(
    listener: TcpListener,
    app: Router,
    shutdown: &Shutdown,
    grace: Duration,
) -> Result<ShutdownOutcome, ListenerError> {
    let mut stop_accepting = shutdown.subscribe();
    let mut start_deadline = shutdown.subscribe();

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { stop_accepting.recv().await })
    .into_future();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => {
            res.map_err(ListenerError::Serve)?;
            return Ok(ShutdownOutcome::Graceful);
        }
        _ = start_deadline.recv() => {}
    }

    tracing::debug!(grace = ?grace, "Draining in-flight requests");

    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => {
            res.map_err(ListenerError::Serve)?;
            Ok(ShutdownOutcome::Graceful)
        }
        Err(_) => {
            tracing::warn!(grace = ?grace, "Grace period elapsed with requests in flight");
            Ok(ShutdownOutcome::Forced)
        }
    }
}
