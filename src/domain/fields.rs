use crate::error::GatewayError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use std::fmt;

/// A scalar request value as the bank expects it in a form body.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Request parameters keyed by the bank's PascalCase field names.
///
/// Keys are kept sorted, so iteration order is the canonical signing order
/// no matter in which order fields were inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFields {
    fields: BTreeMap<String, FieldValue>,
}

impl RequestFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Inserts the field only when a value is present.
    pub fn insert_opt<V: Into<FieldValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Concatenation of every value in ascending key order, no separators.
    pub fn signing_content(&self) -> String {
        self.fields.values().map(ToString::to_string).collect()
    }

    /// Flattens the fields into form pairs, in key order.
    pub fn to_form(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for RequestFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

/// A payment amount in major units (roubles, dollars, ...) that is worth at
/// least one minor unit once truncated.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount {
    value: Decimal,
    minor_units: i64,
}

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, GatewayError> {
        let minor_units = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.trunc().to_i64())
            .ok_or_else(|| GatewayError::Validation(format!("Amount {value} is out of range")))?;
        if minor_units <= 0 {
            return Err(GatewayError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        Ok(Self { value, minor_units })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Integer minor units: multiplied by 100, fraction truncated.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = GatewayError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Amount {
    type Error = GatewayError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(Decimal::from(value))
    }
}

/// Serializes free-form metadata as `key=value` pairs joined by `|`.
pub fn join_metadata<K, V>(metadata: &[(K, V)]) -> String
where
    K: fmt::Display,
    V: fmt::Display,
{
    metadata
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("|")
}
