//! Connection server: TCP accept loop, stdio mode and per-connection handler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::ipc::codec::{read_frame, write_frame, MSG_ERROR, MSG_RESPONSE};
use crate::ipc::envelope::HelperResponse;
use crate::ipc::router::Router;
use crate::types::IpcConfig;

/// Server feeding host connections into the router.
#[derive(Debug)]
pub struct ConnectionServer {
    router: Arc<Router>,
    cancel: CancellationToken,
    ipc_config: IpcConfig,
}

impl ConnectionServer {
    pub fn new(router: Arc<Router>, ipc_config: IpcConfig) -> Self {
        Self {
            router,
            cancel: CancellationToken::new(),
            ipc_config,
        }
    }

    /// Accept TCP connections on `addr` until cancelled or a fatal error occurs.
    pub async fn serve(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener).await
    }

    /// Accept loop over an already bound listener.
    pub async fn serve_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let conn_semaphore = Arc::new(Semaphore::new(self.ipc_config.max_connections));
        tracing::info!(
            "Helpers server listening on {} (max_connections={})",
            listener.local_addr()?,
            self.ipc_config.max_connections,
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Helpers server shutting down");
                    break;
                }
                accept = listener.accept() => {
                    let (stream, peer) = accept?;

                    // Acquire connection permit (refuse when at capacity).
                    let permit = match conn_semaphore.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::warn!(
                                "Connection from {} rejected: at max_connections ({})",
                                peer,
                                self.ipc_config.max_connections,
                            );
                            drop(stream);
                            continue;
                        }
                    };

                    tracing::debug!("Connection from {} (active={})",
                        peer,
                        self.ipc_config.max_connections - conn_semaphore.available_permits(),
                    );
                    let router = self.router.clone();
                    let cancel = self.cancel.clone();
                    let ipc_config = self.ipc_config.clone();
                    let read_timeout = Some(ipc_config.read_timeout);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, router, cancel, ipc_config, read_timeout, Some(permit)).await {
                            tracing::warn!("Connection from {} error: {}", peer, e);
                        }
                        // permit is dropped here, releasing the connection slot
                    });
                }
            }
        }
        Ok(())
    }

    /// Serve the single connection a host opens when it spawns this process:
    /// requests on stdin, responses on stdout. Returns when stdin closes.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        tracing::info!("Helpers server reading frames from stdin");
        handle_connection(
            tokio::io::stdin(),
            tokio::io::stdout(),
            self.router.clone(),
            self.cancel.clone(),
            self.ipc_config.clone(),
            None,
            None,
        )
        .await
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Handle a single connection: read frames → route → write responses.
///
/// `read_timeout` of `None` waits for the next frame indefinitely.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    router: Arc<Router>,
    cancel: CancellationToken,
    ipc_config: IpcConfig,
    read_timeout: Option<Duration>,
    _permit: Option<OwnedSemaphorePermit>, // held for connection lifetime
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let write_timeout = ipc_config.write_timeout;

    loop {
        let next_frame = async {
            let read = read_frame(&mut reader, ipc_config.max_frame_bytes);
            match read_timeout {
                Some(limit) => tokio::time::timeout(limit, read).await.ok(),
                None => Some(read.await),
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            frame_result = next_frame => {
                let frame = match frame_result {
                    None => {
                        tracing::debug!("Read timeout ({:?}), dropping connection", read_timeout);
                        break;
                    }
                    Some(result) => match result? {
                        Some(f) => f,
                        None => break, // clean EOF
                    },
                };

                if !frame.is_request() {
                    tracing::warn!("Unexpected message type: 0x{:02X}", frame.msg_type);
                    let encoded = HelperResponse::error().to_json();
                    timed_write(&mut writer, MSG_ERROR, encoded.as_bytes(), write_timeout).await?;
                    continue;
                }

                let response = match frame.text() {
                    Ok(raw) => router.handle(raw).await,
                    Err(e) => {
                        tracing::warn!("Rejecting request frame: {}", e);
                        HelperResponse::error()
                    }
                };

                let encoded = response.to_json();
                timed_write(&mut writer, MSG_RESPONSE, encoded.as_bytes(), write_timeout).await?;
            }
        }
    }

    Ok(())
}

/// Write a frame, failing with `TimedOut` once `timeout` elapses.
async fn timed_write<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg_type: u8,
    payload: &[u8],
    timeout: Duration,
) -> std::io::Result<()> {
    tokio::time::timeout(timeout, write_frame(writer, msg_type, payload))
        .await
        .map_err(|_| {
            tracing::warn!("Write timeout ({:?}), dropping connection", timeout);
            std::io::Error::new(std::io::ErrorKind::TimedOut, "write timeout")
        })?
}
