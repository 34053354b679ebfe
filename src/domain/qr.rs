//! Payment payloads exchanged through QR codes for in-person vendor payment.
//!
//! Scanned strings are validated here, at the boundary. Anything that is not
//! JSON, carries an unknown `type`, or asks for a zero amount is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::wallet::now_millis;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QrError {
    #[error("Invalid QR code: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QrPayload {
    VendorPayment {
        amount: u64,
        #[serde(rename = "itemName", default, skip_serializing_if = "Option::is_none")]
        item_name: Option<String>,
        timestamp: i64,
    },
    NigerianFoodPayment {
        amount: u64,
        #[serde(rename = "foodName", default, skip_serializing_if = "Option::is_none")]
        food_name: Option<String>,
        timestamp: i64,
    },
}

impl QrPayload {
    /// Payload a vendor displays for a single item.
    pub fn vendor_payment(amount: u64, item_name: impl Into<String>) -> Self {
        Self::VendorPayment {
            amount,
            item_name: Some(item_name.into()),
            timestamp: now_millis(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, QrError> {
        let payload: Self =
            serde_json::from_str(raw.trim()).map_err(|e| QrError::Invalid(e.to_string()))?;
        if payload.amount() == 0 {
            return Err(QrError::Invalid("amount must be positive".to_string()));
        }
        Ok(payload)
    }

    pub fn to_json(&self) -> String {
        // Plain struct of strings and integers; encoding cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::VendorPayment { amount, .. } | Self::NigerianFoodPayment { amount, .. } => *amount,
        }
    }

    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::VendorPayment { item_name, .. } => item_name.as_deref(),
            Self::NigerianFoodPayment { food_name, .. } => food_name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_payment_types() {
        let vendor = QrPayload::parse(
            r#"{"type":"vendor_payment","amount":1500,"itemName":"Amala","timestamp":1}"#,
        )
        .unwrap();
        assert_eq!(vendor.amount(), 1500);
        assert_eq!(vendor.item_name(), Some("Amala"));

        let food = QrPayload::parse(
            r#"{"type":"nigerian_food_payment","amount":800,"foodName":"Puff Puff","timestamp":2}"#,
        )
        .unwrap();
        assert_eq!(food.item_name(), Some("Puff Puff"));

        let bare = QrPayload::parse(r#"{"type":"vendor_payment","amount":200,"timestamp":3}"#).unwrap();
        assert_eq!(bare.item_name(), None);
    }

    #[test]
    fn rejects_unknown_types_and_garbage() {
        for raw in [
            r#"{"type":"payment","merchant":"x","amount":100,"timestamp":1}"#,
            r#"{"amount":100,"timestamp":1}"#,
            r#"{"type":"vendor_payment","amount":0,"timestamp":1}"#,
            "payment://order=1&amount=100",
        ] {
            assert!(matches!(QrPayload::parse(raw), Err(QrError::Invalid(_))), "{raw}");
        }
    }

    #[test]
    fn generated_payloads_scan_back() {
        let payload = QrPayload::vendor_payment(2500, "Pepper Soup");
        assert_eq!(QrPayload::parse(&payload.to_json()), Ok(payload));
    }
}
