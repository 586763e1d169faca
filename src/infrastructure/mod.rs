
// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod status_client;
pub mod websocket_channel;
