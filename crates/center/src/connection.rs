// SPDX-License-Identifier: MIT

//! The center's half of the Event Channel transport: the same
//! send/recv-an-[`Envelope`] shape as `cronmesh_agent::ChannelConnection`,
//! mirrored here because the center is the other end of the same
//! connection. The real implementation ([`WsServerConnection`]) wraps
//! an accepted `tokio-tungstenite` connection; tests supply an
//! in-memory fake.

use crate::error::ConnectionError;
use async_trait::async_trait;
use cronmesh_wire::Envelope;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

#[async_trait]
pub trait CenterConnection: Send {
    async fn send(&mut self, envelope: Envelope) -> Result<(), ConnectionError>;
    /// `Ok(None)` signals a clean close.
    async fn recv(&mut self) -> Result<Option<Envelope>, ConnectionError>;
}

pub struct WsServerConnection {
    stream: WebSocketStream<TcpStream>,
}

impl WsServerConnection {
    pub fn new(stream: WebSocketStream<TcpStream>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl CenterConnection for WsServerConnection {
    async fn send(&mut self, envelope: Envelope) -> Result<(), ConnectionError> {
        let text = serde_json::to_string(&envelope).map_err(|err| ConnectionError::Codec(err.to_string()))?;
        self.stream.send(WsMessage::Text(text)).await.map_err(|err| ConnectionError::Transport(err.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, ConnectionError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let envelope =
                        serde_json::from_str(&text).map_err(|err| ConnectionError::Codec(err.to_string()))?;
                    return Ok(Some(envelope));
                }
                Some(Ok(WsMessage::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/binary -- ignore
                Some(Err(err)) => return Err(ConnectionError::Transport(err.to_string())),
            }
        }
    }
}
