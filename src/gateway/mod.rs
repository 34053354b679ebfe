//! The payment backend: hosted checkout session creation and verification.
//!
//! Verification is the only place a third party is the source of truth. A
//! failed or erroring verification must never lead to a credit.

mod http;
mod launcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpGateway;
pub use launcher::{CheckoutLauncher, HostedWindow, TerminalLauncher};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Payment backend unreachable: {0}")]
    Transport(String),
    #[error("Payment initialization failed: {0}")]
    SessionRejected(String),
    #[error("Payment verification failed: {0}")]
    VerificationFailed(String),
    #[error("Malformed payment backend response: {0}")]
    MalformedResponse(String),
    #[error("Payment backend is not configured")]
    NotConfigured,
}

// =============================================================================
// Wire types
// =============================================================================

/// Amount is in major units; the backend converts to the processor's minor unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRequest {
    pub amount: u64,
    pub email: String,
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub success: bool,
    pub authorization_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest<'a> {
    pub reference: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub error: Option<String>,
}

/// A hosted checkout page ready to be opened.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub authorization_url: String,
    pub reference: String,
}

/// A confirmed, successful charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Whole Naira actually charged. Authoritative over the requested amount.
    pub amount: u64,
    pub status: Option<String>,
}

impl CheckoutResponse {
    pub fn into_session(self, reference: &str) -> Result<CheckoutSession, GatewayError> {
        match (self.success, self.authorization_url) {
            (true, Some(url)) if !url.is_empty() => Ok(CheckoutSession {
                authorization_url: url,
                reference: reference.to_string(),
            }),
            (true, _) => Err(GatewayError::MalformedResponse("missing authorization_url".to_string())),
            (false, _) => Err(GatewayError::SessionRejected(
                self.error.unwrap_or_else(|| "Payment initialization failed".to_string()),
            )),
        }
    }
}

impl VerifyResponse {
    /// Fractional Naira (from kobo amounts) are truncated.
    pub fn into_verification(self) -> Result<Verification, GatewayError> {
        if !self.success {
            return Err(GatewayError::VerificationFailed(
                self.error.unwrap_or_else(|| "payment was not successful".to_string()),
            ));
        }
        match self.amount {
            Some(amount) if amount.is_finite() && amount >= 1.0 => Ok(Verification {
                amount: amount.trunc() as u64,
                status: self.status,
            }),
            _ => Err(GatewayError::MalformedResponse("missing or invalid amount".to_string())),
        }
    }
}

// =============================================================================
// The seam
// =============================================================================

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, GatewayError>;

    /// One-shot; callers do not retry.
    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError>;
}

/// Used when no payment backend is configured; every call fails.
#[derive(Debug, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    async fn create_session(&self, _request: CheckoutRequest) -> Result<CheckoutSession, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn verify(&self, _reference: &str) -> Result<Verification, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_response_requires_a_url() {
        let ok: CheckoutResponse =
            serde_json::from_str(r#"{"success":true,"authorization_url":"https://checkout/abc","access_code":"x"}"#)
                .unwrap();
        assert_eq!(
            ok.into_session("r1").unwrap(),
            CheckoutSession { authorization_url: "https://checkout/abc".into(), reference: "r1".into() }
        );

        let rejected: CheckoutResponse =
            serde_json::from_str(r#"{"success":false,"error":"Invalid key"}"#).unwrap();
        assert_eq!(rejected.into_session("r1"), Err(GatewayError::SessionRejected("Invalid key".into())));

        let missing: CheckoutResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(missing.into_session("r1"), Err(GatewayError::MalformedResponse(_))));
    }

    #[test]
    fn verification_uses_the_reported_amount() {
        let ok: VerifyResponse =
            serde_json::from_str(r#"{"success":true,"amount":1500.5,"status":"success","reference":"r"}"#).unwrap();
        assert_eq!(
            ok.into_verification(),
            Ok(Verification { amount: 1500, status: Some("success".into()) })
        );

        let failed: VerifyResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(matches!(failed.into_verification(), Err(GatewayError::VerificationFailed(_))));

        let no_amount: VerifyResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(no_amount.into_verification(), Err(GatewayError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn unconfigured_gateway_never_verifies() {
        let gateway = UnconfiguredGateway;
        assert_eq!(gateway.verify("r").await, Err(GatewayError::NotConfigured));
    }
}
