//! # Mock Framework
//!
//! Utilities for testing clients and services in isolation.
//!
//! Use [`create_mock_client`] (or the service-specific variants) to get a
//! client and the receiver its requests land on, then answer them with
//! helpers like [`expect_create`]. The payment backend and the checkout
//! window are replaced by scripted doubles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::clients::{CartClient, WalletClient};
use crate::gateway::{
    CheckoutLauncher, CheckoutRequest, CheckoutSession, GatewayError, HostedWindow, PaymentGateway,
    Verification,
};
use crate::messages::{CartRequest, WalletRequest};

type Responder<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

// =============================================================================
// Channel mocks
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls, so the test plays the
/// actor: it inspects each request and decides the response.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

pub fn create_mock_wallet(buffer_size: usize) -> (WalletClient, mpsc::Receiver<WalletRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (WalletClient::new(sender), receiver)
}

pub fn create_mock_cart(buffer_size: usize) -> (CartClient, mpsc::Receiver<CartRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CartClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Responder<T::Id, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Responder<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

// =============================================================================
// Checkout window
// =============================================================================

/// A checkout window that reports itself closed after a fixed number of
/// polls. Clones share state, so a test can keep one while the service owns
/// another.
#[derive(Debug, Clone)]
pub struct ScriptedWindow {
    closes_after: Option<u32>,
    polls: Arc<AtomicU32>,
    closed_by_app: Arc<AtomicBool>,
}

impl ScriptedWindow {
    pub fn closing_after(polls: u32) -> Self {
        Self {
            closes_after: Some(polls),
            polls: Arc::default(),
            closed_by_app: Arc::default(),
        }
    }

    pub fn never_closing() -> Self {
        Self {
            closes_after: None,
            polls: Arc::default(),
            closed_by_app: Arc::default(),
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Whether the application closed the window itself.
    pub fn closed_by_app(&self) -> bool {
        self.closed_by_app.load(Ordering::SeqCst)
    }
}

impl HostedWindow for ScriptedWindow {
    fn is_closed(&self) -> bool {
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        self.closed_by_app() || self.closes_after.is_some_and(|n| polls >= n)
    }

    fn close(&self) {
        self.closed_by_app.store(true, Ordering::SeqCst);
    }
}

/// Hands out a [`ScriptedWindow`], or nothing to simulate a blocked popup.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    window: Option<ScriptedWindow>,
    opened: Mutex<Vec<String>>,
}

impl ScriptedLauncher {
    pub fn with_window(window: ScriptedWindow) -> Self {
        Self { window: Some(window), opened: Mutex::default() }
    }

    pub fn blocked() -> Self {
        Self::default()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().map(|urls| urls.clone()).unwrap_or_default()
    }
}

impl CheckoutLauncher for ScriptedLauncher {
    fn open(&self, url: &str) -> Option<Box<dyn HostedWindow>> {
        if let Ok(mut urls) = self.opened.lock() {
            urls.push(url.to_string());
        }
        let window = self.window.clone()?;
        Some(Box::new(window))
    }
}

// =============================================================================
// Payment backend
// =============================================================================

/// A payment backend with canned answers that records every call.
///
/// Verification answers are consumed in order; the last one repeats.
#[derive(Debug)]
pub struct ScriptedGateway {
    session: Result<(), GatewayError>,
    verifications: Mutex<VecDeque<Result<Verification, GatewayError>>>,
    verify_delay: Option<Duration>,
    sessions: Mutex<Vec<CheckoutRequest>>,
    verified: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    /// Every session opens and every verification reports `amount`.
    pub fn verifying(amount: u64) -> Self {
        Self::with_verification(Ok(Verification { amount, status: Some("success".to_string()) }))
    }

    pub fn with_verification(result: Result<Verification, GatewayError>) -> Self {
        Self {
            session: Ok(()),
            verifications: Mutex::new(VecDeque::from([result])),
            verify_delay: None,
            sessions: Mutex::default(),
            verified: Mutex::default(),
        }
    }

    pub fn rejecting_sessions(error: GatewayError) -> Self {
        Self { session: Err(error), ..Self::verifying(0) }
    }

    pub fn then_verify(self, result: Result<Verification, GatewayError>) -> Self {
        if let Ok(mut queue) = self.verifications.lock() {
            queue.push_back(result);
        }
        self
    }

    pub fn with_verify_delay(mut self, delay: Duration) -> Self {
        self.verify_delay = Some(delay);
        self
    }

    pub fn session_requests(&self) -> Vec<CheckoutRequest> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn verified_references(&self) -> Vec<String> {
        self.verified.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, GatewayError> {
        let reference = request.reference.clone();
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(request);
        }
        self.session.clone()?;
        Ok(CheckoutSession {
            authorization_url: format!("https://checkout.test/{reference}"),
            reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError> {
        if let Some(delay) = self.verify_delay {
            tokio::time::sleep(delay).await;
        }
        if let Ok(mut verified) = self.verified.lock() {
            verified.push(reference.to_string());
        }
        let mut queue = self.verifications.lock().map_err(|e| GatewayError::Transport(e.to_string()))?;
        match queue.len() {
            0 => Err(GatewayError::VerificationFailed("no scripted answer".to_string())),
            1 => queue[0].clone(),
            _ => queue.pop_front().unwrap_or(Err(GatewayError::VerificationFailed("empty".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Order>(10);

        let create_task = tokio::spawn(async move {
            let params = OrderCreate {
                restaurant_name: "Mama Put".to_string(),
                items: vec!["1x Jollof Rice".to_string()],
                total: 1500,
            };
            client.create(params).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.restaurant_name, "Mama Put");
        responder.send(Ok("order_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("order_1".to_string()));
    }

    #[test]
    fn scripted_window_counts_polls() {
        let window = ScriptedWindow::closing_after(2);
        let observer = window.clone();

        assert!(!window.is_closed());
        assert!(window.is_closed());
        assert_eq!(observer.polls(), 2);
    }
}
