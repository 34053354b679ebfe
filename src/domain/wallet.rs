use rand::Rng;
use serde::{Deserialize, Serialize};

/// Balance every new (or logged-out) user starts with, in whole Naira.
pub const DEFAULT_BALANCE: u64 = 5000;

/// Smallest top-up the checkout accepts, in whole Naira.
pub const MINIMUM_TOP_UP: u64 = 100;

const REFERENCE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const REFERENCE_SUFFIX_LEN: usize = 9;

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    WalletTopup,
    FoodOrder,
}

/// A completed transaction. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub amount: u64,
    pub reference: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// A server-verified top-up to apply to the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct TopUpCredit {
    pub amount: u64,
    pub reference: String,
    pub customer_email: Option<String>,
}

/// A purchase paid from the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    pub amount: u64,
    pub reference: String,
    pub customer_email: Option<String>,
}

impl Charge {
    pub fn new(amount: u64, customer_email: Option<String>) -> Self {
        Self {
            amount,
            reference: mint_reference("food_order"),
            customer_email,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Mints `<prefix>_<epoch ms>_<9 base-36 chars>`.
pub fn mint_reference(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, now_millis(), suffix)
}
