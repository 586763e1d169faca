// Channel ports for the push subscription and the status poll
use crate::application::error::ChannelError;
use crate::domain::health::ProtocolStatus;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Inbound text frames from an open push connection.
///
/// The stream ending means the connection closed. A `Decode` item is one bad
/// frame; any other `Err` item means the connection failed.
pub type FrameStream = BoxStream<'static, Result<String, ChannelError>>;

#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Open a new connection. Called again after every close or error.
    async fn connect(&self) -> Result<FrameStream, ChannelError>;

    /// Endpoint description for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Issue one status request
    async fn fetch_status(&self) -> Result<ProtocolStatus, ChannelError>;

    fn endpoint(&self) -> &str;
}
