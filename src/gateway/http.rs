use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

use super::{
    CheckoutRequest, CheckoutResponse, CheckoutSession, GatewayError, PaymentGateway, Verification,
    VerifyRequest, VerifyResponse,
};

const SESSION_FUNCTION: &str = "paystack-payment";
const VERIFY_FUNCTION: &str = "verify-payment";

/// Talks to the two payment server functions over HTTPS.
///
/// Both functions answer with a JSON body even on failure (HTTP 400), so the
/// body is decoded regardless of status.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Uses a preconfigured client (proxy and TLS settings are the caller's).
    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn post(&self, function: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}/{}", self.base_url, function));
        match &self.api_key {
            Some(key) => request.bearer_auth(key).header("apikey", key),
            None => request,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    #[instrument(skip(self, request), fields(reference = %request.reference, amount = request.amount))]
    async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, GatewayError> {
        debug!("Requesting checkout session");
        let response = self
            .post(SESSION_FUNCTION)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let body: CheckoutResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        body.into_session(&request.reference)
    }

    #[instrument(skip(self))]
    async fn verify(&self, reference: &str) -> Result<Verification, GatewayError> {
        debug!("Verifying payment");
        let response = self
            .post(VERIFY_FUNCTION)
            .json(&VerifyRequest { reference })
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        body.into_verification()
    }
}
