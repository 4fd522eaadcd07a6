//! Trades Management models.
//!
//! Database rows and the JSON shapes returned by handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub uid: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub risk: Option<i32>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BrokerRow {
    pub id: i64,
    pub uid: Uuid,
    pub name: String,
}

/// Account joined with the name and uid of its broker, if it still has one.
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: i64,
    pub uid: Uuid,
    pub type_account: String,
    pub currency: String,
    pub initial_balance: f64,
    pub current_balance: f64,
    pub broker_id: Option<i64>,
    pub broker_uid: Option<Uuid>,
    pub broker_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StrategyRow {
    pub id: i64,
    pub uid: Uuid,
    pub name: String,
}

/// Trade joined with the public uids of its account and strategy.
#[derive(Debug, Clone)]
pub struct TradeRow {
    pub id: i64,
    pub uid: Uuid,
    pub account_uid: Uuid,
    pub strategy_uid: Option<Uuid>,
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Responses
// ============================================================================

/// Body of every 201 response.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub uid: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub uid: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub risk: Option<i32>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            name: row.name,
            email: row.email,
            risk: row.risk,
            confirmed_at: row.confirmed_at,
            created_at: row.created_at,
        }
    }
}

/// Account as nested inside a broker.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerAccount {
    pub uid: Uuid,
    pub type_account: String,
    pub currency: String,
    pub initial_balance: f64,
    pub current_balance: f64,
}

impl From<AccountRow> for BrokerAccount {
    fn from(row: AccountRow) -> Self {
        Self {
            uid: row.uid,
            type_account: row.type_account,
            currency: row.currency,
            initial_balance: row.initial_balance,
            current_balance: row.current_balance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokerResponse {
    pub uid: Uuid,
    pub name: String,
    pub accounts: Vec<BrokerAccount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokerListResponse {
    pub brokers: Vec<BrokerResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokerName {
    pub name: String,
}

/// Account as listed by `GET /v1/accounts`.
#[derive(Debug, Clone, Serialize)]
pub struct AccountListItem {
    pub uid: Uuid,
    pub type_account: String,
    pub currency: String,
    pub initial_balance: f64,
    pub current_balance: f64,
    pub broker: Option<BrokerName>,
}

impl From<AccountRow> for AccountListItem {
    fn from(row: AccountRow) -> Self {
        Self {
            uid: row.uid,
            type_account: row.type_account,
            currency: row.currency,
            initial_balance: row.initial_balance,
            current_balance: row.current_balance,
            broker: row.broker_name.map(|name| BrokerName { name }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub uid: Uuid,
    pub broker_uid: Option<Uuid>,
    pub type_account: String,
    pub currency: String,
    pub initial_balance: f64,
    pub current_balance: f64,
}

impl From<AccountRow> for AccountResponse {
    fn from(row: AccountRow) -> Self {
        Self {
            uid: row.uid,
            broker_uid: row.broker_uid,
            type_account: row.type_account,
            currency: row.currency,
            initial_balance: row.initial_balance,
            current_balance: row.current_balance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyResponse {
    pub uid: Uuid,
    pub name: String,
}

impl From<StrategyRow> for StrategyResponse {
    fn from(row: StrategyRow) -> Self {
        Self {
            uid: row.uid,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyListResponse {
    pub strategies: Vec<StrategyResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeResponse {
    pub uid: Uuid,
    pub account_uid: Uuid,
    pub strategy_uid: Option<Uuid>,
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<TradeRow> for TradeResponse {
    fn from(row: TradeRow) -> Self {
        Self {
            uid: row.uid,
            account_uid: row.account_uid,
            strategy_uid: row.strategy_uid,
            symbol: row.symbol,
            side: row.side,
            quantity: row.quantity,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeListResponse {
    pub trades: Vec<TradeResponse>,
}

/// Readiness check response returned by `/ready`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// "ready" or "not_ready".
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Generic error, no infrastructure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn account_row(broker_name: Option<&str>) -> AccountRow {
        AccountRow {
            id: 1,
            uid: Uuid::nil(),
            type_account: "stocks".to_string(),
            currency: "BRL".to_string(),
            initial_balance: 1000.0,
            current_balance: 1250.5,
            broker_id: broker_name.map(|_| 7),
            broker_uid: broker_name.map(|_| Uuid::nil()),
            broker_name: broker_name.map(str::to_string),
        }
    }

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("buy"), Some(Side::Buy));
        assert_eq!(Side::parse("sell"), Some(Side::Sell));
        assert_eq!(Side::parse("BUY"), None);
        assert_eq!(Side::Sell.to_string(), "sell");
    }

    #[test]
    fn test_account_list_item_with_broker() {
        let json = serde_json::to_value(AccountListItem::from(account_row(Some("XP")))).unwrap();
        assert_eq!(json["broker"]["name"], "XP");
        assert_eq!(json["current_balance"], 1250.5);
    }

    #[test]
    fn test_account_list_item_without_broker_is_null() {
        let json = serde_json::to_value(AccountListItem::from(account_row(None))).unwrap();
        assert!(json["broker"].is_null());
        assert!(json.as_object().unwrap().contains_key("broker"));
    }

    #[test]
    fn test_account_response_shape() {
        let json = serde_json::to_value(AccountResponse::from(account_row(Some("XP")))).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 6);
        assert!(json.get("broker_uid").is_some());
        assert!(json.get("broker").is_none());
    }

    #[test]
    fn test_readiness_response_omits_empty_fields() {
        let json = serde_json::to_string(&ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            error: None,
        })
        .unwrap();
        assert!(json.contains("\"status\":\"ready\""));
        assert!(!json.contains("error"));
    }
}
