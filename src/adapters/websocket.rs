//! WebSocket Watch Transport
//!
//! Production implementation of the watch transport port on top of
//! tokio-tungstenite. One connection per session; pings are answered by the
//! protocol layer, close frames end the stream.

use crate::domain::endpoint::WatchTarget;
use crate::domain::ports::{TransportError, WatchConnection, WatchTransport};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

/// Watch transport that dials `{ws_base}{watch_path}` per target.
pub struct WebSocketTransport {
    ws_base: String,
}

impl WebSocketTransport {
    /// Create a transport against a WebSocket base URL, e.g.
    /// `ws://gateway:8080`.
    pub fn new(ws_base: impl Into<String>) -> Self {
        Self {
            ws_base: ws_base.into(),
        }
    }
}

#[async_trait]
impl WatchTransport for WebSocketTransport {
    async fn connect(
        &self,
        target: &WatchTarget,
    ) -> Result<Box<dyn WatchConnection>, TransportError> {
        let url = Url::parse(&target.watch_url(&self.ws_base))
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(url = %url, "watch websocket opened");
        Ok(Box::new(WebSocketWatchConnection { stream }))
    }
}

struct WebSocketWatchConnection {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

#[async_trait]
impl WatchConnection for WebSocketWatchConnection {
    async fn next_event(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(payload))) => return Ok(Some(payload)),
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(String::from_utf8_lossy(&data).into_owned()))
                }
                // Control frames carry no notification.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Err(e)) => return Err(TransportError::Channel(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };

        match self.stream.close(Some(frame)).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::Channel(e.to_string())),
        }
    }
}
