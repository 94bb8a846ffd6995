use serde::Serialize;

/// Parameters of a card binding request (`AddCard`).
///
/// `comment` and `form_type` are known to break the bank's signature check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCard {
    pub client_id: String,
    /// One of the codes in [`CARD_CHECK_TYPES`](super::catalog::CARD_CHECK_TYPES).
    pub check_type: Option<String>,
    pub comment: Option<String>,
    pub form_type: Option<String>,
}

impl NewCard {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    pub fn with_check_type(mut self, check_type: impl Into<String>) -> Self {
        self.check_type = Some(check_type.into());
        self
    }
}

/// A pending card binding; the customer finishes it in a browser at `url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRequest {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardState {
    pub id: String,
    pub status: String,
    pub status_name: Option<&'static str>,
}

/// A card bound to a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: String,
    #[serde(rename = "type")]
    pub card_type: i64,
    pub type_name: Option<&'static str>,
    /// Masked card number.
    pub pan: String,
    pub status: String,
    pub status_name: Option<&'static str>,
    pub rebill_id: Option<String>,
    pub expires: Option<String>,
    pub is_active: bool,
}
