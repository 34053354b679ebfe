use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::cart_actor::CartError;
use crate::domain::{OrderStatus, QrError};
use crate::wallet_actor::WalletError;

/// Errors that can occur while placing or tracking orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Insufficient balance: you need ₦{shortfall} more to complete this purchase")]
    InsufficientBalance { required: u64, available: u64, shortfall: u64 },
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order already delivered: {0}")]
    AlreadyDelivered(String),
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
    #[error("Cart error: {0}")]
    CartError(String),
    #[error(transparent)]
    InvalidQr(#[from] QrError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(error: FrameworkError<OrderError>) -> Self {
        match error {
            FrameworkError::Rejected(e) => e,
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<WalletError> for OrderError {
    fn from(error: WalletError) -> Self {
        match error {
            WalletError::InsufficientBalance { required, available, shortfall } => {
                OrderError::InsufficientBalance { required, available, shortfall }
            }
            WalletError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
            other => OrderError::PaymentFailed(other.to_string()),
        }
    }
}

impl From<CartError> for OrderError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
            other => OrderError::CartError(other.to_string()),
        }
    }
}
