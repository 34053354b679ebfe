use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::WalletClient;
use crate::domain::{
    now_millis, Charge, PaymentHistoryEntry, PaymentKind, TopUpCredit, DEFAULT_BALANCE,
};
use crate::messages::{ServiceResponse, WalletRequest};
use crate::store::{keys, load_json, save_json, SharedStore};

use super::actions::{CreditOutcome, DebitReceipt};
use super::error::WalletError;

// =============================================================================
// WALLET SERVICE
// =============================================================================

/// Owns the balance and the payment history. Every change is written through
/// to the store before the caller is answered.
pub struct WalletService {
    receiver: mpsc::Receiver<WalletRequest>,
    store: SharedStore,
    balance: u64,
    history: Vec<PaymentHistoryEntry>,
    next_entry: u64,
}

impl WalletService {
    pub fn new(buffer_size: usize, store: SharedStore) -> (Self, WalletClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            store,
            balance: DEFAULT_BALANCE,
            history: Vec::new(),
            next_entry: 1,
        };
        let client = WalletClient::new(sender);
        (service, client)
    }

    #[instrument(name = "wallet_service", skip(self))]
    pub async fn run(mut self) {
        self.load_balance();
        self.history = load_json(self.store.as_ref(), keys::PAYMENT_HISTORY).unwrap_or_default();
        info!(balance = self.balance, entries = self.history.len(), "WalletService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                WalletRequest::LoadBalance { respond_to } => {
                    let _ = respond_to.send(Ok(self.load_balance()));
                }
                WalletRequest::GetBalance { respond_to } => {
                    let _ = respond_to.send(Ok(self.balance));
                }
                WalletRequest::Credit { credit, respond_to } => {
                    self.handle_credit(credit, respond_to);
                }
                WalletRequest::Debit { charge, respond_to } => {
                    self.handle_debit(charge, respond_to);
                }
                WalletRequest::Reset { clear_history, respond_to } => {
                    self.handle_reset(clear_history, respond_to);
                }
                WalletRequest::History { respond_to } => {
                    let _ = respond_to.send(Ok(self.history.clone()));
                }
                WalletRequest::FindReference { reference, respond_to } => {
                    let _ = respond_to.send(Ok(self.find_reference(&reference).cloned()));
                }
                WalletRequest::Shutdown => {
                    info!("WalletService shutting down");
                    break;
                }
            }
        }
        info!("WalletService stopped");
    }

    /// Reads the stored balance. Anything missing or unparsable becomes the
    /// default balance, written back immediately.
    fn load_balance(&mut self) -> u64 {
        let stored = self.store.get(keys::WALLET_BALANCE);
        match stored.as_deref().map(str::trim).map(str::parse::<u64>) {
            Some(Ok(balance)) => {
                self.balance = balance;
            }
            Some(Err(e)) => {
                warn!(error = %e, "Stored balance is unusable, resetting to default");
                self.balance = DEFAULT_BALANCE;
                self.persist_balance();
            }
            None => {
                debug!("No stored balance, starting with default");
                self.balance = DEFAULT_BALANCE;
                self.persist_balance();
            }
        }
        self.balance
    }

    #[instrument(fields(amount = credit.amount, reference = %credit.reference), skip(self, credit, respond_to))]
    fn handle_credit(&mut self, credit: TopUpCredit, respond_to: ServiceResponse<CreditOutcome, WalletError>) {
        debug!("Processing credit request");
        let _ = respond_to.send(self.credit(credit));
    }

    fn credit(&mut self, credit: TopUpCredit) -> Result<CreditOutcome, WalletError> {
        if credit.amount == 0 {
            return Err(WalletError::InvalidAmount(credit.amount));
        }
        if self.find_reference(&credit.reference).is_some() {
            info!("Reference already credited, skipping");
            return Ok(CreditOutcome::AlreadyApplied { balance: self.balance });
        }

        self.balance = self
            .balance
            .checked_add(credit.amount)
            .ok_or(WalletError::InvalidAmount(credit.amount))?;
        self.persist_balance();

        let entry = self.record(PaymentKind::WalletTopup, credit.amount, credit.reference, credit.customer_email);
        info!(balance = self.balance, "Wallet credited");
        Ok(CreditOutcome::Credited { balance: self.balance, entry })
    }

    #[instrument(fields(amount = charge.amount, reference = %charge.reference), skip(self, charge, respond_to))]
    fn handle_debit(&mut self, charge: Charge, respond_to: ServiceResponse<DebitReceipt, WalletError>) {
        debug!("Processing debit request");
        let _ = respond_to.send(self.debit(charge));
    }

    fn debit(&mut self, charge: Charge) -> Result<DebitReceipt, WalletError> {
        if charge.amount == 0 {
            return Err(WalletError::InvalidAmount(charge.amount));
        }
        if self.balance < charge.amount {
            let shortfall = charge.amount - self.balance;
            warn!(balance = self.balance, shortfall, "Insufficient balance");
            return Err(WalletError::InsufficientBalance {
                required: charge.amount,
                available: self.balance,
                shortfall,
            });
        }
        if self.find_reference(&charge.reference).is_some() {
            return Err(WalletError::DuplicateReference(charge.reference));
        }

        self.balance -= charge.amount;
        self.persist_balance();

        let entry = self.record(PaymentKind::FoodOrder, charge.amount, charge.reference, charge.customer_email);
        info!(balance = self.balance, "Wallet debited");
        Ok(DebitReceipt { balance: self.balance, entry })
    }

    #[instrument(skip(self, respond_to))]
    fn handle_reset(&mut self, clear_history: bool, respond_to: ServiceResponse<u64, WalletError>) {
        self.balance = DEFAULT_BALANCE;
        self.persist_balance();
        if clear_history {
            self.history.clear();
            self.persist_history();
        }
        info!(balance = self.balance, "Wallet reset");
        let _ = respond_to.send(Ok(self.balance));
    }

    fn find_reference(&self, reference: &str) -> Option<&PaymentHistoryEntry> {
        self.history.iter().find(|entry| entry.reference == reference)
    }

    /// Prepends a history entry and persists the log.
    fn record(
        &mut self,
        kind: PaymentKind,
        amount: u64,
        reference: String,
        customer_email: Option<String>,
    ) -> PaymentHistoryEntry {
        let timestamp = now_millis();
        let entry = PaymentHistoryEntry {
            id: format!("txn_{}_{}", timestamp, self.next_entry),
            kind,
            amount,
            reference,
            timestamp,
            customer_email,
        };
        self.next_entry += 1;

        self.history.insert(0, entry.clone());
        self.persist_history();
        entry
    }

    fn persist_balance(&self) {
        self.store.set(keys::WALLET_BALANCE, &self.balance.to_string());
    }

    fn persist_history(&self) {
        save_json(self.store.as_ref(), keys::PAYMENT_HISTORY, &self.history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn start(store: SharedStore) -> WalletClient {
        let (service, client) = WalletService::new(10, store);
        tokio::spawn(service.run());
        client
    }

    fn credit(amount: u64, reference: &str) -> TopUpCredit {
        TopUpCredit { amount, reference: reference.to_string(), customer_email: None }
    }

    fn charge(amount: u64, reference: &str) -> Charge {
        Charge { amount, reference: reference.to_string(), customer_email: None }
    }

    #[tokio::test]
    async fn fresh_store_starts_at_default_balance() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store.clone());

        assert_eq!(wallet.load_balance().await.unwrap(), 5000);
        assert_eq!(store.get(keys::WALLET_BALANCE).as_deref(), Some("5000"));
    }

    #[tokio::test]
    async fn unparsable_balance_is_repaired() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(keys::WALLET_BALANCE, "NaN");
        let wallet = start(store.clone());

        assert_eq!(wallet.balance().await.unwrap(), 5000);
        assert_eq!(store.get(keys::WALLET_BALANCE).as_deref(), Some("5000"));

        // Out-of-band edits are picked up on reload.
        store.set(keys::WALLET_BALANCE, "-20");
        assert_eq!(wallet.load_balance().await.unwrap(), 5000);
        store.set(keys::WALLET_BALANCE, "7300");
        assert_eq!(wallet.load_balance().await.unwrap(), 7300);
    }

    #[tokio::test]
    async fn balance_replays_credits_and_successful_debits() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store.clone());

        wallet.credit(credit(1000, "t1")).await.unwrap();
        wallet.debit(charge(2500, "o1")).await.unwrap();
        let failed = wallet.debit(charge(10_000, "o2")).await;
        wallet.credit(credit(700, "t2")).await.unwrap();
        wallet.debit(charge(200, "o3")).await.unwrap();

        assert!(matches!(failed, Err(WalletError::InsufficientBalance { .. })));
        assert_eq!(wallet.balance().await.unwrap(), 5000 + 1000 + 700 - 2500 - 200);
        assert_eq!(store.get(keys::WALLET_BALANCE).as_deref(), Some("4000"));

        let history = wallet.history().await.unwrap();
        let references: Vec<&str> = history.iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(references, ["o3", "t2", "o1", "t1"]);
    }

    #[tokio::test]
    async fn insufficient_debit_is_a_no_op() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store);

        let result = wallet.debit(charge(6000, "o1")).await;
        assert_eq!(
            result,
            Err(WalletError::InsufficientBalance { required: 6000, available: 5000, shortfall: 1000 })
        );
        assert_eq!(wallet.balance().await.unwrap(), 5000);
        assert!(wallet.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn credit_is_idempotent_per_reference() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store);

        let first = wallet.credit(credit(1000, "wallet_topup_1_abc")).await.unwrap();
        let replay = wallet.credit(credit(1000, "wallet_topup_1_abc")).await.unwrap();

        assert!(matches!(first, CreditOutcome::Credited { balance: 6000, .. }));
        assert_eq!(replay, CreditOutcome::AlreadyApplied { balance: 6000 });
        assert_eq!(wallet.history().await.unwrap().len(), 1);
        assert!(wallet.find_reference("wallet_topup_1_abc".to_string()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn zero_amounts_are_rejected() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store);

        assert_eq!(wallet.credit(credit(0, "t")).await, Err(WalletError::InvalidAmount(0)));
        assert_eq!(wallet.debit(charge(0, "o")).await, Err(WalletError::InvalidAmount(0)));
    }

    #[tokio::test]
    async fn reset_restores_default_and_optionally_clears_history() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store.clone());

        wallet.debit(charge(4000, "o1")).await.unwrap();
        assert_eq!(wallet.reset(false).await.unwrap(), 5000);
        assert_eq!(wallet.history().await.unwrap().len(), 1);

        wallet.reset(true).await.unwrap();
        assert!(wallet.history().await.unwrap().is_empty());
        assert_eq!(store.get(keys::PAYMENT_HISTORY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn history_survives_restart() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let wallet = start(store.clone());
        wallet.credit(credit(1500, "t1")).await.unwrap();
        wallet.shutdown().await.unwrap();

        let restarted = start(store);
        assert_eq!(restarted.balance().await.unwrap(), 6500);
        assert_eq!(restarted.history().await.unwrap()[0].reference, "t1");

        // A replayed verification after restart still cannot double-credit.
        let replay = restarted.credit(credit(1500, "t1")).await.unwrap();
        assert_eq!(replay, CreditOutcome::AlreadyApplied { balance: 6500 });
    }
}
