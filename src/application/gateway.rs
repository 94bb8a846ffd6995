use crate::application::endpoint::Endpoint;
use crate::config::GatewayConfig;
use crate::domain::card::{Card, CardRequest, CardState, NewCard};
use crate::domain::catalog::{
    CARD_CHECK_TYPES, CardCheckType, card_status_name, card_type_name, payment_status_name,
};
use crate::domain::customer::Customer;
use crate::domain::fields::{RequestFields, join_metadata};
use crate::domain::payment::{NewPayment, PaymentState};
use crate::domain::ports::{SignerBox, TransportBox, TransportRequest, TransportResponse};
use crate::domain::signature::{SignatureBundle, to_base64};
use crate::error::{GatewayError, Result, SignerError, TransportError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, error, warn};

pub const TERMINAL_KEY_FIELD: &str = "TerminalKey";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A normalized gateway answer: the JSON object body, a bare list wrapped
/// as `items`, plus `URL` when the answer was a redirect.
pub type GatewayResponse = Map<String, Value>;

/// Client for the bank's E2C payout gateway.
///
/// Every operation is a single signed round trip: the request fields get the
/// terminal key, are signed with the injected [`Signer`](crate::domain::ports::Signer),
/// then sent as a form POST through the injected
/// [`Transport`](crate::domain::ports::Transport). Failures of the toolkit,
/// of the HTTP exchange and rejections by the bank come back as distinct
/// [`GatewayError`] variants.
pub struct GatewayClient {
    config: GatewayConfig,
    signer: SignerBox,
    transport: TransportBox,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, signer: SignerBox, transport: TransportBox) -> Self {
        Self {
            config,
            signer,
            transport,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Registers a payout of `amount` to a bound card.
    ///
    /// Sending a client id along with the payment has been observed to fail
    /// the bank's signature check. The id is still sent as given, with a
    /// warning logged.
    pub async fn create_payment(&self, payment: NewPayment) -> Result<PaymentState> {
        if payment.client_id.is_some() {
            warn!(
                order_id = %payment.order_id,
                "ClientId on payment creation is known to fail the bank's signature check"
            );
        }

        let mut fields = RequestFields::new();
        fields.insert("OrderId", payment.order_id);
        fields.insert("CardId", payment.card_id);
        fields.insert("Amount", payment.amount.minor_units());
        fields.insert_opt("ClientId", payment.client_id);
        fields.insert_opt("DATA", payment.metadata.as_deref().map(join_metadata));

        let response = self.call(Endpoint::Init, fields).await?;
        Ok(PaymentState {
            url: redirect_url(&response),
            ..payment_state(&response)?
        })
    }

    /// Executes a registered payout.
    pub async fn advance_payment(&self, payment_id: &str) -> Result<PaymentState> {
        let fields: RequestFields = [("PaymentId", payment_id)].into_iter().collect();
        let response = self.call(Endpoint::Payment, fields).await?;
        payment_state(&response)
    }

    pub async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentState> {
        let fields: RequestFields = [("PaymentId", payment_id)].into_iter().collect();
        let response = self.call(Endpoint::GetState, fields).await?;
        payment_state(&response)
    }

    pub async fn create_client(
        &self,
        client_id: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Customer> {
        let mut fields = RequestFields::new();
        fields.insert("CustomerKey", client_id);
        fields.insert_opt("Email", email);
        fields.insert_opt("Phone", phone);

        let response = self.call(Endpoint::AddCustomer, fields).await?;
        Ok(Customer {
            id: required(&response, "CustomerKey")?,
            email: None,
            phone: None,
        })
    }

    pub async fn delete_client(&self, client_id: &str) -> Result<Customer> {
        let fields: RequestFields = [("CustomerKey", client_id)].into_iter().collect();
        let response = self.call(Endpoint::RemoveCustomer, fields).await?;
        Ok(Customer {
            id: required(&response, "CustomerKey")?,
            email: None,
            phone: None,
        })
    }

    pub async fn fetch_client(&self, client_id: &str) -> Result<Customer> {
        let fields: RequestFields = [("CustomerKey", client_id)].into_iter().collect();
        let response = self.call(Endpoint::GetCustomer, fields).await?;
        Ok(Customer {
            id: required(&response, "CustomerKey")?,
            email: text(&response, "Email"),
            phone: text(&response, "Phone"),
        })
    }

    /// Starts binding a card; the customer completes it in a browser at the
    /// returned URL.
    ///
    /// A comment or form type has been observed to fail the bank's signature
    /// check. Both are still sent as given, with a warning logged.
    pub async fn create_card(&self, card: NewCard) -> Result<CardRequest> {
        if card.comment.is_some() || card.form_type.is_some() {
            warn!(
                client_id = %card.client_id,
                "Description or PayForm on card creation is known to fail the bank's signature check"
            );
        }

        let mut fields = RequestFields::new();
        fields.insert("CustomerKey", card.client_id);
        fields.insert_opt("CheckType", card.check_type);
        fields.insert_opt("Description", card.comment);
        fields.insert_opt("PayForm", card.form_type);

        let response = self.call(Endpoint::AddCard, fields).await?;
        Ok(CardRequest {
            request_id: required(&response, "RequestKey")?,
            url: redirect_url(&response),
        })
    }

    /// Marks a customer's card as deleted.
    pub async fn delete_card(&self, card_id: i64, client_id: &str) -> Result<CardState> {
        let mut fields = RequestFields::new();
        fields.insert("CardId", card_id);
        fields.insert("CustomerKey", client_id);

        let response = self.call(Endpoint::RemoveCard, fields).await?;
        let status = required(&response, "Status")?;
        Ok(CardState {
            id: required(&response, "CardId")?,
            status_name: card_status_name(&status),
            status,
        })
    }

    pub async fn list_cards(&self, client_id: &str) -> Result<Vec<Card>> {
        let fields: RequestFields = [("CustomerKey", client_id)].into_iter().collect();
        let response = self.call(Endpoint::GetCardList, fields).await?;

        let Some(Value::Array(items)) = response.get("items") else {
            return Err(GatewayError::MalformedResponse(
                "expected a list of cards".to_string(),
            ));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Object(card) => card_from(card),
                other => Err(GatewayError::MalformedResponse(format!(
                    "expected a card object, got {other}"
                ))),
            })
            .collect()
    }

    /// The ways a card can be checked while binding it.
    pub fn card_check_types() -> &'static [CardCheckType] {
        CARD_CHECK_TYPES
    }

    /// Computes the signature bundle over exactly `fields`.
    ///
    /// The digest is taken over the canonical signing content and the
    /// signature over the digest bytes.
    pub async fn sign_fields(&self, fields: &RequestFields) -> Result<SignatureBundle> {
        let content = fields.signing_content();
        debug!(%content, "signing content");

        let digest = self
            .signer
            .hash(content.as_bytes())
            .await
            .inspect_err(|e| error!(code = e.code(), "cannot generate digest: {e}"))?;
        let digest_value = to_base64(&digest);
        debug!(digest = %digest_value, "digest");

        let signature = self
            .signer
            .sign(&digest)
            .await
            .inspect_err(|e| error!(code = e.code(), "cannot generate signature: {e}"))?;
        let signature_value = to_base64(&signature);
        debug!(signature = %signature_value, "signature");

        let certificate_serial = self
            .signer
            .certificate_serial()
            .await
            .inspect_err(|e| error!(code = e.code(), "cannot get certificate serial: {e}"))?
            .ok_or(SignerError::CertificateNotFound)?;
        debug!(serial = %certificate_serial, "certificate serial");

        Ok(SignatureBundle {
            digest_value,
            signature_value,
            certificate_serial,
        })
    }

    async fn call(&self, endpoint: Endpoint, mut fields: RequestFields) -> Result<GatewayResponse> {
        fields.insert(TERMINAL_KEY_FIELD, &self.config.terminal_key);
        let bundle = self.sign_fields(&fields).await?;
        for (key, value) in bundle.into_fields() {
            fields.insert(key, value);
        }

        let url = format!("{}{}", self.config.base_url, endpoint.path());
        debug!(%url, ?fields, "sending request");

        let request = TransportRequest {
            method: "POST".to_string(),
            url,
            form: fields.to_form(),
            headers: HashMap::from([("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())]),
            follow_redirects: endpoint.follows_redirects(),
        };
        let response = self
            .transport
            .send(request)
            .await
            .inspect_err(|e| error!(endpoint = endpoint.path(), "request failed: {e}"))?;

        interpret_response(response)
    }
}

/// Normalizes a raw gateway answer.
///
/// HTTP statuses from 400 up are transport failures. An object body with a
/// false `Success` flag is a rejection carrying the bank's `ErrorCode`. A
/// list body is wrapped as `items`. A 3xx answer gets its `Location`
/// header copied into `URL`.
pub fn interpret_response(response: TransportResponse) -> Result<GatewayResponse> {
    if response.status >= 400 {
        error!(status = response.status, "gateway answered with an error status");
        return Err(TransportError::Status {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
        .into());
    }

    let body: Value = serde_json::from_slice(&response.body)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON body: {e}")))?;
    debug!(%body, "got response");

    let mut result = match body {
        Value::Object(object) => {
            if !matches!(object.get("Success"), Some(Value::Bool(true))) {
                warn!(response = ?object, "gateway rejected the request");
                return Err(rejection(&object));
            }
            object
        }
        Value::Array(items) => Map::from_iter([("items".to_string(), Value::Array(items))]),
        other => {
            return Err(GatewayError::MalformedResponse(format!(
                "unexpected JSON body: {other}"
            )));
        }
    };

    if (300..=399).contains(&response.status) {
        match response.header("Location") {
            Some(location) => {
                result.insert("URL".to_string(), Value::String(location.to_string()));
            }
            None => warn!(status = response.status, "redirect without a Location header"),
        }
    }

    Ok(result)
}

fn rejection(object: &Map<String, Value>) -> GatewayError {
    let code = text(object, "ErrorCode").unwrap_or_else(|| "-1".to_string());
    let message = ["Details", "Message"]
        .iter()
        .filter_map(|key| text(object, key))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    GatewayError::Rejected { code, message }
}

fn payment_state(response: &GatewayResponse) -> Result<PaymentState> {
    let status = required(response, "Status")?;
    Ok(PaymentState {
        id: required(response, "PaymentId")?,
        status_name: payment_status_name(&status),
        status,
        url: None,
    })
}

fn card_from(card: &Map<String, Value>) -> Result<Card> {
    let card_type = integer(card, "CardType").ok_or_else(|| {
        GatewayError::MalformedResponse("missing or non-numeric field CardType".to_string())
    })?;
    let status = required(card, "Status")?;
    Ok(Card {
        id: required(card, "CardId")?,
        card_type,
        type_name: card_type_name(card_type),
        pan: required(card, "Pan")?,
        status_name: card_status_name(&status),
        is_active: status == "A",
        status,
        rebill_id: text(card, "RebillID"),
        expires: text(card, "ExpDate"),
    })
}

/// Prefers the body's `PaymentURL` over a redirect's `Location`.
fn redirect_url(response: &GatewayResponse) -> Option<String> {
    text(response, "PaymentURL").or_else(|| text(response, "URL"))
}

/// A scalar field as text; numbers are rendered, nulls count as absent.
fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
    }
}

fn required(object: &Map<String, Value>, key: &str) -> Result<String> {
    text(object, key).ok_or_else(|| GatewayError::MalformedResponse(format!("missing field {key}")))
}

fn integer(object: &Map<String, Value>, key: &str) -> Option<i64> {
    match object.get(key)? {
        Value::Number(value) => value.as_i64(),
        Value::String(value) => value.parse().ok(),
        _ => None,
    }
}
