// Presentation layer - Read-only HTTP views
pub mod app_state;
pub mod handlers;
