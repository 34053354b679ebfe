//! Wallet top-ups through a hosted checkout session.
//!
//! The dialog moves `Input -> Processing -> Success`, falling back to
//! `Input` on any failure. A top-up credits the wallet only with an amount the
//! payment backend has verified.

pub mod error;
pub mod service;
pub mod session;

pub use error::*;
pub use service::{TopUpService, TopUpSettings};

/// Dialog state observed by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopUpStep {
    Input,
    Processing,
    Success,
}

/// What the user typed into the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct TopUpForm {
    pub amount: u64,
    pub email: String,
}

impl TopUpForm {
    pub fn new(amount: u64, email: impl Into<String>) -> Self {
        Self { amount, email: email.into() }
    }
}

/// How a finished top-up ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TopUpOutcome {
    /// The verified amount was credited.
    Credited {
        reference: String,
        requested: Option<u64>,
        amount: u64,
        balance: u64,
    },
    /// The backend confirmed the payment but the reference had already been
    /// credited; nothing changed.
    AlreadyCredited { reference: String, balance: u64 },
}

impl TopUpOutcome {
    pub fn balance(&self) -> u64 {
        match self {
            Self::Credited { balance, .. } | Self::AlreadyCredited { balance, .. } => *balance,
        }
    }
}
