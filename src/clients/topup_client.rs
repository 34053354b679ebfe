use tokio::sync::{mpsc, watch};

use crate::messages::TopUpRequest;
use crate::topup_actor::{TopUpError, TopUpForm, TopUpOutcome, TopUpStep};

/// Client for the top-up dialog.
///
/// `start_top_up` resolves when the whole session has finished: credited,
/// failed, timed out or cancelled.
#[derive(Clone)]
pub struct TopUpClient {
    sender: mpsc::Sender<TopUpRequest>,
    step: watch::Receiver<TopUpStep>,
}

impl TopUpClient {
    pub fn new(sender: mpsc::Sender<TopUpRequest>, step: watch::Receiver<TopUpStep>) -> Self {
        Self { sender, step }
    }

    /// Current dialog step.
    pub fn step(&self) -> TopUpStep {
        *self.step.borrow()
    }

    /// A receiver that observes every step change.
    pub fn subscribe(&self) -> watch::Receiver<TopUpStep> {
        self.step.clone()
    }
}

client_method!(TopUpClient => fn start_top_up(form: TopUpForm) -> TopUpOutcome as TopUpRequest::StartTopUp, Error = TopUpError);
client_method!(TopUpClient => fn reconcile(reference: String, email: Option<String>) -> TopUpOutcome as TopUpRequest::Reconcile, Error = TopUpError);
client_method!(TopUpClient => fn cancel() -> bool as TopUpRequest::Cancel, Error = TopUpError);
client_shutdown!(TopUpClient, TopUpRequest, TopUpError);
