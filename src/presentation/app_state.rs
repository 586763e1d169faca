// Application state for HTTP handlers
use crate::application::coordinator::DashboardReader;

#[derive(Clone)]
pub struct AppState {
    pub reader: DashboardReader,
}
