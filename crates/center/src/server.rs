// SPDX-License-Identifier: MIT

//! The TCP/WebSocket accept loop every agent's Event Channel connection
//! lands in at startup.

use crate::center::Center;
use crate::connection::WsServerConnection;
use crate::error::CenterError;
use crate::session;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Binds `center.listen_address` and accepts connections until the
/// process is killed. Each accepted connection gets its own
/// [`session::run`] task, so one slow or misbehaving agent never blocks
/// another.
pub async fn serve(center: Arc<Center>) -> Result<(), CenterError> {
    let address = center.listen_address().to_string();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| CenterError::Bind { address: address.clone(), source })?;
    info!(%address, "event channel listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(error = %err, "failed to accept connection");
                continue;
            }
        };
        let center = center.clone();
        tokio::spawn(async move {
            match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => {
                    let conn = Box::new(WsServerConnection::new(ws));
                    session::run(conn, center).await;
                }
                Err(err) => warn!(%peer, error = %err, "websocket handshake failed"),
            }
        });
    }
}
