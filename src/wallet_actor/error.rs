use thiserror::Error;

/// Errors that can occur during wallet operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalletError {
    #[error("Insufficient balance: you need ₦{shortfall} more")]
    InsufficientBalance { required: u64, available: u64, shortfall: u64 },
    #[error("Invalid amount: {0}")]
    InvalidAmount(u64),
    #[error("Duplicate payment reference: {0}")]
    DuplicateReference(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
