// Application layer - Normalization, coordination and channel ports
pub mod channels;
pub mod coordinator;
pub mod error;
pub mod normalizer;
pub mod state;
