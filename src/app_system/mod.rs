//! System orchestration, configuration, startup and shutdown.

pub mod config;
pub mod telemetry;
pub mod wallet_system;

pub use config::*;
pub use telemetry::*;
pub use wallet_system::*;
