use tokio::sync::oneshot;

use crate::cart_actor::CartError;
use crate::domain::{CartItem, Charge, PaymentHistoryEntry, TopUpCredit};
use crate::topup_actor::{TopUpError, TopUpForm, TopUpOutcome};
use crate::wallet_actor::{CreditOutcome, DebitReceipt, WalletError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses.

#[derive(Debug)]
pub enum WalletRequest {
    /// Re-reads the balance from the store, repairing it if unusable.
    LoadBalance {
        respond_to: ServiceResponse<u64, WalletError>,
    },
    GetBalance {
        respond_to: ServiceResponse<u64, WalletError>,
    },
    Credit {
        credit: TopUpCredit,
        respond_to: ServiceResponse<CreditOutcome, WalletError>,
    },
    Debit {
        charge: Charge,
        respond_to: ServiceResponse<DebitReceipt, WalletError>,
    },
    Reset {
        clear_history: bool,
        respond_to: ServiceResponse<u64, WalletError>,
    },
    History {
        respond_to: ServiceResponse<Vec<PaymentHistoryEntry>, WalletError>,
    },
    FindReference {
        reference: String,
        respond_to: ServiceResponse<Option<PaymentHistoryEntry>, WalletError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CartRequest {
    AddItem {
        item: CartItem,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    UpdateQuantity {
        id: String,
        quantity: u32,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    RemoveItem {
        id: String,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    Clear {
        respond_to: ServiceResponse<(), CartError>,
    },
    Items {
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum TopUpRequest {
    StartTopUp {
        form: TopUpForm,
        respond_to: ServiceResponse<TopUpOutcome, TopUpError>,
    },
    /// Verifies a previously minted reference again and credits it if it
    /// has not been applied yet.
    Reconcile {
        reference: String,
        email: Option<String>,
        respond_to: ServiceResponse<TopUpOutcome, TopUpError>,
    },
    /// Closes the dialog; `true` if a running session was stopped.
    Cancel {
        respond_to: ServiceResponse<bool, TopUpError>,
    },
    Shutdown,
}
