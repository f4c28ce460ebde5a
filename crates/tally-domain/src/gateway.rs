//! Payment-gateway instant payment notifications (IPN).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    Completed,
    Pending,
    Failed,
    Refunded,
}

/// Normalised IPN payload as posted by the payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayEvent {
    pub transaction_id: String,
    pub document_number: String,
    pub amount: f64,
    pub currency: String,
    pub status: GatewayStatus,
    pub paid_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_event_parses_snake_case_status() {
        let raw = r#"{
            "transaction_id": "tx-1",
            "document_number": "INV-0001",
            "amount": 12.5,
            "currency": "EUR",
            "status": "completed",
            "paid_on": "2025-03-02"
        }"#;
        let event: GatewayEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.status, GatewayStatus::Completed);
        assert_eq!(event.paid_on, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }
}
