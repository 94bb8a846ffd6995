use super::fields::Amount;
use serde::Serialize;

/// Parameters of a payout registration (`Init`).
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Order identifier in the merchant's namespace.
    pub order_id: String,
    pub card_id: i64,
    pub amount: Amount,
    /// Known to break the bank's signature check when sent; see
    /// [`GatewayClient::create_payment`](crate::application::gateway::GatewayClient::create_payment).
    pub client_id: Option<String>,
    /// Free-form metadata sent as the `DATA` field.
    pub metadata: Option<Vec<(String, String)>>,
}

impl NewPayment {
    pub fn new(order_id: impl Into<String>, card_id: i64, amount: Amount) -> Self {
        Self {
            order_id: order_id.into(),
            card_id,
            amount,
            client_id: None,
            metadata: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Vec<(String, String)>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// The state of a payment as reported by the bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentState {
    pub id: String,
    pub status: String,
    pub status_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
