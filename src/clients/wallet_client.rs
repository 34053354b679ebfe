use tokio::sync::mpsc;

use crate::domain::{Charge, PaymentHistoryEntry, TopUpCredit};
use crate::messages::WalletRequest;
use crate::wallet_actor::{CreditOutcome, DebitReceipt, WalletError};

/// Client for the wallet ledger.
#[derive(Clone)]
pub struct WalletClient {
    sender: mpsc::Sender<WalletRequest>,
}

impl WalletClient {
    pub fn new(sender: mpsc::Sender<WalletRequest>) -> Self {
        Self { sender }
    }
}

client_method!(WalletClient => fn load_balance() -> u64 as WalletRequest::LoadBalance, Error = WalletError);
client_method!(WalletClient => fn balance() -> u64 as WalletRequest::GetBalance, Error = WalletError);
client_method!(WalletClient => fn credit(credit: TopUpCredit) -> CreditOutcome as WalletRequest::Credit, Error = WalletError);
client_method!(WalletClient => fn debit(charge: Charge) -> DebitReceipt as WalletRequest::Debit, Error = WalletError);
client_method!(WalletClient => fn reset(clear_history: bool) -> u64 as WalletRequest::Reset, Error = WalletError);
client_method!(WalletClient => fn history() -> Vec<PaymentHistoryEntry> as WalletRequest::History, Error = WalletError);
client_method!(WalletClient => fn find_reference(reference: String) -> Option<PaymentHistoryEntry> as WalletRequest::FindReference, Error = WalletError);
client_shutdown!(WalletClient, WalletRequest, WalletError);
