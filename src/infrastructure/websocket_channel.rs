// WebSocket push channel adapter
use crate::application::channels::{FrameStream, PushChannel};
use crate::application::error::ChannelError;
use async_trait::async_trait;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

#[derive(Debug, Clone)]
pub struct WebSocketChannel {
    url: String,
}

impl WebSocketChannel {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl From<tungstenite::Error> for ChannelError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                ChannelError::Closed
            }
            other => ChannelError::Connection(other.to_string()),
        }
    }
}

/// Text payload of a frame, or `None` for control frames.
///
/// Binary frames must be valid UTF-8; anything else is a `Decode` item, which
/// drops the frame without closing the connection.
fn frame_text(message: Message) -> Option<Result<String, ChannelError>> {
    match message {
        Message::Text(text) => Some(Ok(text)),
        Message::Binary(bytes) => Some(
            String::from_utf8(bytes)
                .map_err(|e| ChannelError::Decode(format!("binary frame: {}", e))),
        ),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

#[async_trait]
impl PushChannel for WebSocketChannel {
    async fn connect(&self) -> Result<FrameStream, ChannelError> {
        let (socket, response) = connect_async(self.url.as_str()).await?;
        tracing::debug!("WebSocket handshake status: {}", response.status());

        let frames = socket.filter_map(|message| async move {
            match message {
                Ok(message) => frame_text(message),
                Err(e) => Some(Err(ChannelError::from(e))),
            }
        });

        Ok(frames.boxed())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
