use serde::Serialize;
use std::collections::BTreeMap;

/// A key container known to the cryptographic provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    /// Unique name with the reader prefix removed.
    pub id: String,
    /// Fully qualified container name, e.g. `\\.\HDIMAGE\my-key`.
    pub name: String,
}

/// A certificate field value; repeated lines turn it into a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CertificateValue {
    Single(String),
    List(Vec<String>),
}

impl CertificateValue {
    /// Appends a continuation value, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                *self = Self::List(vec![std::mem::take(first), value]);
            }
            Self::List(values) => values.push(value),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::List(_) => None,
        }
    }
}

/// An installed certificate as printed by the certificate manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Certificate {
    fields: BTreeMap<String, CertificateValue>,
}

impl Certificate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(key.into(), CertificateValue::Single(value.into()));
    }

    /// Appends to an existing field; does nothing when the field is absent.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(key) {
            field.push(value.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&CertificateValue> {
        self.fields.get(key)
    }

    pub fn container(&self) -> Option<&str> {
        self.get("Container").and_then(CertificateValue::as_single)
    }

    pub fn serial(&self) -> Option<&str> {
        self.get("Serial").and_then(CertificateValue::as_single)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Normalizes a certificate serial: drops `0x` and lowercases the hex digits.
pub fn normalize_serial(serial: &str) -> String {
    serial.replace("0x", "").to_lowercase()
}
