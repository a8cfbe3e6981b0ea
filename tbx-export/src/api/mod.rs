//! HTTP API handlers for tbx-export

pub mod export;
pub mod health;

pub use export::export_routes;
pub use health::health_routes;
