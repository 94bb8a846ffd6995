//! Immutable lookup tables for the bank's status and type codes.

use serde::Serialize;

pub static PAYMENT_STATUSES: &[(&str, &str)] = &[
    (
        "NEW",
        "Payment is registered in the gateway but processing has not started",
    ),
    ("CHECKING", "Payment data is being checked"),
    ("CHECKED", "Payment data has been checked"),
    ("COMPLETING", "Crediting of funds has started"),
    ("COMPLETED", "Funds have been credited to the recipient's card"),
    ("REJECTED", "Payment was rejected by the bank"),
    ("PROCESSING", "Payment is being processed"),
    ("UNKNOWN", "Payment status is undetermined"),
];

pub static CARD_STATUSES: &[(&str, &str)] = &[
    ("A", "Active"),
    ("I", "Inactive"),
    ("E", "Expired"),
    ("D", "Deleted"),
];

pub static CARD_TYPES: &[(i64, &str)] = &[
    (0, "Debit card"),
    (1, "Top-up card"),
    (2, "Debit and top-up card"),
];

/// A way the bank can verify a card while binding it to a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardCheckType {
    pub code: &'static str,
    pub name: &'static str,
}

pub static CARD_CHECK_TYPES: &[CardCheckType] = &[
    CardCheckType {
        code: "NO",
        name: "Save the card without any checks",
    },
    CardCheckType {
        code: "HOLD",
        name: "Charge and then refund 1 rouble while saving the card",
    },
    CardCheckType {
        code: "3DS",
        name: "Run a 3DS check, then charge and refund 1 rouble while saving the card",
    },
    CardCheckType {
        code: "3DSHOLD",
        name: "Check whether the card supports 3DS; if it does, charge and refund 1 rouble, \
               otherwise charge and refund a random amount between 100 and 199 kopecks",
    },
];

pub fn payment_status_name(status: &str) -> Option<&'static str> {
    lookup(PAYMENT_STATUSES, status)
}

pub fn card_status_name(status: &str) -> Option<&'static str> {
    lookup(CARD_STATUSES, status)
}

pub fn card_type_name(card_type: i64) -> Option<&'static str> {
    CARD_TYPES
        .iter()
        .find(|(code, _)| *code == card_type)
        .map(|(_, name)| *name)
}

fn lookup(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
}
