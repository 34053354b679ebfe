//! Wallet ledger and payment history, owned by a single actor so every
//! balance mutation is serialized.

mod actions;
pub mod error;
pub mod service;

pub use actions::*;
pub use error::*;
pub use service::WalletService;
