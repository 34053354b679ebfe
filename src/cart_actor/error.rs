use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart item not found: {0}")]
    NotFound(String),
    #[error("Invalid cart item: {0}")]
    InvalidItem(String),
    #[error("Cart total is too large")]
    TotalOverflow,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
