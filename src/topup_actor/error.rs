use thiserror::Error;

use crate::gateway::GatewayError;
use crate::wallet_actor::WalletError;

/// Every variant leaves the dialog back at `Input`, ready for a retry.
///
/// Failures after the checkout page was opened carry the session reference,
/// so the payment can be reconciled later.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopUpError {
    #[error("Please enter both amount and email address")]
    MissingInformation,
    #[error("Minimum payment amount is ₦{minimum}")]
    BelowMinimum { minimum: u64, requested: u64 },
    #[error("A payment is already in progress")]
    SessionInProgress,
    #[error("Please allow popups for payment processing")]
    PopupBlocked,
    #[error("Payment failed: {0}")]
    Session(GatewayError),
    #[error("Payment verification failed for {reference}: {source}")]
    Verification { reference: String, source: GatewayError },
    #[error("Payment window was not closed in time ({reference})")]
    TimedOut { reference: String },
    #[error("Payment cancelled ({reference})")]
    Cancelled { reference: String },
    #[error("Could not credit verified payment {reference}: {source}")]
    Wallet { reference: String, source: WalletError },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl TopUpError {
    /// Reference of a session that may have been paid, for [`reconcile`].
    ///
    /// [`reconcile`]: crate::clients::TopUpClient::reconcile
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Verification { reference, .. }
            | Self::TimedOut { reference }
            | Self::Cancelled { reference }
            | Self::Wallet { reference, .. } => Some(reference),
            _ => None,
        }
    }
}
