// SPDX-License-Identifier: MIT

//! The real [`ChannelDialer`]: dials the center over a plain TCP
//! WebSocket using `tokio-tungstenite`.

use crate::channel::{ChannelConnection, ChannelDialer};
use crate::error::ChannelError;
use async_trait::async_trait;
use cronmesh_wire::Envelope;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub struct WsDialer;

#[async_trait]
impl ChannelDialer for WsDialer {
    async fn dial(&self, endpoint: &str) -> Result<Box<dyn ChannelConnection>, ChannelError> {
        let (stream, _response) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl ChannelConnection for WsConnection {
    async fn send(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        let text = serde_json::to_string(&envelope).map_err(|err| ChannelError::Codec(err.to_string()))?;
        self.stream.send(WsMessage::Text(text)).await.map_err(|err| ChannelError::Transport(err.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, ChannelError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let envelope = serde_json::from_str(&text).map_err(|err| ChannelError::Codec(err.to_string()))?;
                    return Ok(Some(envelope));
                }
                Some(Ok(WsMessage::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/binary — ignore
                Some(Err(err)) => return Err(ChannelError::Transport(err.to_string())),
            }
        }
    }
}
