//! Request body validation.
//!
//! Bodies are parsed as raw JSON objects and checked field by field so each
//! failure carries a precise message. Unknown fields are ignored.

use crate::errors::TmError;
use crate::models::Side;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("'{0}' is a required field")]
    Required(&'static str),

    #[error("'{field}' must be of type {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("'{field}' must be {rule}")]
    Invalid {
        field: &'static str,
        rule: &'static str,
    },
}

impl From<SchemaError> for TmError {
    fn from(err: SchemaError) -> Self {
        TmError::BadRequest(err.to_string())
    }
}

/// Parse a request body into a JSON object.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, SchemaError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(SchemaError::NotAnObject),
    }
}

fn present<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

pub fn required_str(body: &Map<String, Value>, field: &'static str) -> Result<String, SchemaError> {
    match present(body, field) {
        None => Err(SchemaError::Required(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SchemaError::WrongType {
            field,
            expected: "string",
        }),
    }
}

pub fn required_number(body: &Map<String, Value>, field: &'static str) -> Result<f64, SchemaError> {
    optional_number(body, field)?.ok_or(SchemaError::Required(field))
}

pub fn optional_number(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, SchemaError> {
    match present(body, field) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or(SchemaError::WrongType {
            field,
            expected: "number",
        }),
    }
}

/// Text of an optional reference field such as `strategy_uid`.
pub fn optional_str<'a>(
    body: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, SchemaError> {
    match present(body, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(SchemaError::WrongType {
            field,
            expected: "string",
        }),
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Body of broker create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerPayload {
    pub name: String,
}

impl BrokerPayload {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, SchemaError> {
        Ok(Self {
            name: required_str(body, "name")?,
        })
    }
}

/// Body of account create/update, minus the broker reference.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountPayload {
    pub type_account: String,
    pub currency: String,
    pub initial_balance: f64,
}

impl AccountPayload {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, SchemaError> {
        Ok(Self {
            type_account: required_str(body, "type_account")?,
            currency: required_str(body, "currency")?,
            initial_balance: required_number(body, "initial_balance")?,
        })
    }
}

/// Body of strategy create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPayload {
    pub name: String,
}

impl StrategyPayload {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, SchemaError> {
        Ok(Self {
            name: required_str(body, "name")?,
        })
    }
}

/// Body of trade create/update, minus account and strategy references.
#[derive(Debug, Clone, PartialEq)]
pub struct TradePayload {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
}

impl TradePayload {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, SchemaError> {
        let symbol = required_str(body, "symbol")?;

        let side = Side::parse(&required_str(body, "side")?).ok_or(SchemaError::Invalid {
            field: "side",
            rule: "one of: buy, sell",
        })?;

        let quantity = required_number(body, "quantity")?;
        if quantity <= 0.0 {
            return Err(SchemaError::Invalid {
                field: "quantity",
                rule: "greater than 0",
            });
        }

        let entry_price = required_number(body, "entry_price")?;
        if entry_price < 0.0 {
            return Err(SchemaError::Invalid {
                field: "entry_price",
                rule: "greater than or equal to 0",
            });
        }

        let exit_price = optional_number(body, "exit_price")?;
        if exit_price.is_some_and(|p| p < 0.0) {
            return Err(SchemaError::Invalid {
                field: "exit_price",
                rule: "greater than or equal to 0",
            });
        }

        Ok(Self {
            symbol,
            side,
            quantity,
            entry_price,
            exit_price,
        })
    }
}
