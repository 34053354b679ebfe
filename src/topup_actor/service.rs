use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::clients::{TopUpClient, WalletClient};
use crate::domain::{mint_reference, TopUpCredit, MINIMUM_TOP_UP};
use crate::gateway::{CheckoutLauncher, CheckoutRequest, PaymentGateway, Verification};
use crate::messages::{ServiceResponse, TopUpRequest};
use crate::wallet_actor::CreditOutcome;

use super::error::TopUpError;
use super::session::{watch_window, SessionEvent};
use super::{TopUpForm, TopUpOutcome, TopUpStep};

/// Timing of the hosted checkout flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopUpSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// How long the success state is shown before the dialog resets.
    pub dismiss_delay: Duration,
}

impl Default for TopUpSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
            dismiss_delay: Duration::from_secs(2),
        }
    }
}

// =============================================================================
// TOP-UP SERVICE
// =============================================================================

/// Root actor for the top-up dialog. One checkout session at a time; the
/// session itself runs as a background task that owns the response channel.
pub struct TopUpService {
    receiver: mpsc::Receiver<TopUpRequest>,
    flow: TopUpFlow,
    active: Option<CancellationToken>,
}

/// Everything a background session needs.
#[derive(Clone)]
struct TopUpFlow {
    wallet: WalletClient,
    gateway: Arc<dyn PaymentGateway>,
    launcher: Arc<dyn CheckoutLauncher>,
    settings: TopUpSettings,
    step: Arc<watch::Sender<TopUpStep>>,
}

impl TopUpService {
    pub fn new(
        buffer_size: usize,
        wallet: WalletClient,
        gateway: Arc<dyn PaymentGateway>,
        launcher: Arc<dyn CheckoutLauncher>,
        settings: TopUpSettings,
    ) -> (Self, TopUpClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (step, step_rx) = watch::channel(TopUpStep::Input);
        let service = Self {
            receiver,
            flow: TopUpFlow {
                wallet,
                gateway,
                launcher,
                settings,
                step: Arc::new(step),
            },
            active: None,
        };
        let client = TopUpClient::new(sender, step_rx);
        (service, client)
    }

    #[instrument(name = "topup_service", skip(self))]
    pub async fn run(mut self) {
        info!("TopUpService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TopUpRequest::StartTopUp { form, respond_to } => {
                    self.handle_start_top_up(form, respond_to);
                }
                TopUpRequest::Reconcile { reference, email, respond_to } => {
                    self.handle_reconcile(reference, email, respond_to);
                }
                TopUpRequest::Cancel { respond_to } => {
                    let _ = respond_to.send(Ok(self.cancel_active()));
                }
                TopUpRequest::Shutdown => {
                    info!("TopUpService shutting down");
                    self.cancel_active();
                    break;
                }
            }
        }
        info!("TopUpService stopped");
    }

    fn session_running(&self) -> bool {
        self.active.as_ref().is_some_and(|token| !token.is_cancelled())
    }

    fn cancel_active(&mut self) -> bool {
        match self.active.take() {
            Some(token) if !token.is_cancelled() => {
                info!("Cancelling running checkout session");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Validates the form, then hands the session to a background task.
    #[instrument(fields(amount = form.amount), skip(self, form, respond_to))]
    fn handle_start_top_up(&mut self, form: TopUpForm, respond_to: ServiceResponse<TopUpOutcome, TopUpError>) {
        debug!("Processing start_top_up request");

        if self.session_running() {
            warn!("Rejecting top-up while another session is running");
            let _ = respond_to.send(Err(TopUpError::SessionInProgress));
            return;
        }
        if let Err(e) = validate(&form) {
            let _ = respond_to.send(Err(e));
            return;
        }

        let token = CancellationToken::new();
        self.active = Some(token.clone());
        let flow = self.flow.clone();
        let reference = mint_reference("wallet_topup");
        let span = tracing::info_span!("top_up_session", reference = %reference);

        tokio::spawn(
            async move {
                let result = flow.run_session(form, reference, token).await;
                let _ = respond_to.send(result);
            }
            .instrument(span),
        );
    }

    #[instrument(skip(self, email, respond_to))]
    fn handle_reconcile(
        &self,
        reference: String,
        email: Option<String>,
        respond_to: ServiceResponse<TopUpOutcome, TopUpError>,
    ) {
        debug!("Processing reconcile request");
        let flow = self.flow.clone();
        tokio::spawn(
            async move {
                let result = flow.verify_and_credit(reference, None, email).await;
                let _ = respond_to.send(result);
            }
            .in_current_span(),
        );
    }
}

fn validate(form: &TopUpForm) -> Result<(), TopUpError> {
    if form.amount == 0 || form.email.trim().is_empty() {
        return Err(TopUpError::MissingInformation);
    }
    if form.amount < MINIMUM_TOP_UP {
        return Err(TopUpError::BelowMinimum { minimum: MINIMUM_TOP_UP, requested: form.amount });
    }
    Ok(())
}

impl TopUpFlow {
    /// Drives one session and keeps the dialog step in sync with it.
    async fn run_session(
        self,
        form: TopUpForm,
        reference: String,
        token: CancellationToken,
    ) -> Result<TopUpOutcome, TopUpError> {
        // Cancels the token on every way out of the session.
        let guard = token.clone().drop_guard();
        self.step.send_replace(TopUpStep::Processing);

        let result = self.checkout(form, reference, &token).await;
        match &result {
            Ok(outcome) => {
                info!(balance = outcome.balance(), "Top-up completed");
                self.step.send_replace(TopUpStep::Success);
            }
            Err(e) => {
                warn!(error = %e, "Top-up did not complete");
                self.step.send_replace(TopUpStep::Input);
            }
        }
        drop(guard);

        if result.is_ok() {
            self.schedule_dismiss();
        }
        result
    }

    async fn checkout(
        &self,
        form: TopUpForm,
        reference: String,
        token: &CancellationToken,
    ) -> Result<TopUpOutcome, TopUpError> {
        info!(amount = form.amount, "Initiating payment");
        let request = CheckoutRequest {
            amount: form.amount,
            email: form.email.clone(),
            reference: reference.clone(),
        };
        let session = tokio::select! {
            _ = token.cancelled() => return Err(TopUpError::Cancelled { reference: reference.clone() }),
            session = self.gateway.create_session(request) => session.map_err(TopUpError::Session)?,
        };

        let window = self
            .launcher
            .open(&session.authorization_url)
            .ok_or(TopUpError::PopupBlocked)?;

        let settings = self.settings;
        match watch_window(window.as_ref(), settings.poll_interval, settings.timeout, token).await {
            SessionEvent::Closed => {}
            SessionEvent::TimedOut => {
                window.close();
                return Err(TopUpError::TimedOut { reference });
            }
            SessionEvent::Cancelled => {
                window.close();
                return Err(TopUpError::Cancelled { reference });
            }
        }

        // Cancellable only until the backend has answered. A confirmed payment
        // is always credited.
        let verification = tokio::select! {
            _ = token.cancelled() => return Err(TopUpError::Cancelled { reference: reference.clone() }),
            verification = self.verify(&reference) => verification?,
        };
        self.credit(reference, Some(form.amount), Some(form.email), verification).await
    }

    /// Verifies `reference` and credits the verified amount. Safe to repeat:
    /// the wallet ignores references it has already credited.
    async fn verify_and_credit(
        &self,
        reference: String,
        requested: Option<u64>,
        email: Option<String>,
    ) -> Result<TopUpOutcome, TopUpError> {
        let verification = self.verify(&reference).await?;
        self.credit(reference, requested, email, verification).await
    }

    async fn verify(&self, reference: &str) -> Result<Verification, TopUpError> {
        self.gateway.verify(reference).await.map_err(|source| {
            error!(error = %source, "Payment verification failed");
            TopUpError::Verification { reference: reference.to_string(), source }
        })
    }

    async fn credit(
        &self,
        reference: String,
        requested: Option<u64>,
        email: Option<String>,
        verification: Verification,
    ) -> Result<TopUpOutcome, TopUpError> {
        if requested.is_some_and(|requested| requested != verification.amount) {
            warn!(?requested, verified = verification.amount, "Verified amount differs from request");
        }

        let credit = TopUpCredit {
            amount: verification.amount,
            reference: reference.clone(),
            customer_email: email,
        };
        let credited = self.wallet.credit(credit).await.map_err(|source| {
            error!(error = %source, "Verified payment could not be credited");
            TopUpError::Wallet { reference: reference.clone(), source }
        })?;
        let outcome = match credited {
            CreditOutcome::Credited { balance, entry } => TopUpOutcome::Credited {
                reference,
                requested,
                amount: entry.amount,
                balance,
            },
            CreditOutcome::AlreadyApplied { balance } => {
                TopUpOutcome::AlreadyCredited { reference, balance }
            }
        };
        Ok(outcome)
    }

    /// Resets the dialog after the success state has been shown, unless a
    /// newer session has taken over in the meantime.
    fn schedule_dismiss(&self) {
        let step = self.step.clone();
        let delay = self.settings.dismiss_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            step.send_if_modified(|current| {
                if *current == TopUpStep::Success {
                    *current = TopUpStep::Input;
                    true
                } else {
                    false
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaymentHistoryEntry, PaymentKind};
    use crate::messages::WalletRequest;
    use crate::mock_framework::{create_mock_wallet, ScriptedGateway, ScriptedLauncher, ScriptedWindow};

    #[test]
    fn form_validation_matches_the_dialog_rules() {
        assert_eq!(validate(&TopUpForm::new(0, "a@b.c")), Err(TopUpError::MissingInformation));
        assert_eq!(validate(&TopUpForm::new(500, "  ")), Err(TopUpError::MissingInformation));
        assert_eq!(
            validate(&TopUpForm::new(99, "a@b.c")),
            Err(TopUpError::BelowMinimum { minimum: 100, requested: 99 })
        );
        assert_eq!(validate(&TopUpForm::new(100, "a@b.c")), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_verification_still_credits() {
        let (wallet, mut wallet_rx) = create_mock_wallet(10);
        let (service, topup) = TopUpService::new(
            10,
            wallet,
            Arc::new(ScriptedGateway::verifying(1000)),
            Arc::new(ScriptedLauncher::with_window(ScriptedWindow::closing_after(1))),
            TopUpSettings::default(),
        );
        tokio::spawn(service.run());

        let client = topup.clone();
        let session = tokio::spawn(async move { client.start_top_up(TopUpForm::new(1000, "a@b.c")).await });

        // The credit is in flight when the dialog is closed.
        let Some(WalletRequest::Credit { credit, respond_to }) = wallet_rx.recv().await else {
            panic!("expected a credit request");
        };
        assert_eq!(topup.cancel().await, Ok(true));
        let entry = PaymentHistoryEntry {
            id: "txn_1".into(),
            kind: PaymentKind::WalletTopup,
            amount: credit.amount,
            reference: credit.reference.clone(),
            timestamp: 1,
            customer_email: credit.customer_email,
        };
        respond_to.send(Ok(CreditOutcome::Credited { balance: 6000, entry })).unwrap();

        let outcome = session.await.unwrap().unwrap();
        assert_eq!(outcome.balance(), 6000);
        assert_eq!(topup.step(), TopUpStep::Success);
    }
}
