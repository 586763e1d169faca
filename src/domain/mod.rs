// Domain layer - Pure state types, no I/O
pub mod event_log;
pub mod health;
pub mod metrics;
pub mod snapshot;
pub mod window;
