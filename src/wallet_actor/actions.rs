use crate::domain::PaymentHistoryEntry;

/// Result of applying a verified top-up.
#[derive(Debug, Clone, PartialEq)]
pub enum CreditOutcome {
    /// The wallet was credited and one history entry was recorded.
    Credited { balance: u64, entry: PaymentHistoryEntry },
    /// The reference was already in the history; nothing changed.
    AlreadyApplied { balance: u64 },
}

impl CreditOutcome {
    pub fn balance(&self) -> u64 {
        match self {
            Self::Credited { balance, .. } | Self::AlreadyApplied { balance } => *balance,
        }
    }
}

/// Result of a successful debit.
#[derive(Debug, Clone, PartialEq)]
pub struct DebitReceipt {
    pub balance: u64,
    pub entry: PaymentHistoryEntry,
}
