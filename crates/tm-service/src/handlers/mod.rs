//! HTTP request handlers for the Trades Management service.

pub mod accounts;
pub mod authorize;
pub mod brokers;
pub mod health;
pub mod metrics;
pub mod strategies;
pub mod trades;
pub mod users;

pub use accounts::{create_account, delete_account, get_account, list_accounts, update_account};
pub use authorize::authorize_request;
pub use brokers::{create_broker, delete_broker, get_broker, list_brokers, update_broker};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use strategies::{
    create_strategy, delete_strategy, get_strategy, list_strategies, update_strategy,
};
pub use trades::{create_trade, delete_trade, get_trade, list_trades, update_trade};
pub use users::get_me;

use crate::errors::TmError;
use std::collections::HashMap;

pub(crate) fn invalid_query_parameter() -> TmError {
    TmError::BadRequest("Invalid query parameter".to_string())
}

/// Reject any query parameter not in `allowed`.
pub(crate) fn check_query_params(
    params: &HashMap<String, String>,
    allowed: &[&str],
) -> Result<(), TmError> {
    if params.keys().all(|key| allowed.contains(&key.as_str())) {
        Ok(())
    } else {
        Err(invalid_query_parameter())
    }
}

/// Value of a list filter. An empty value means no filter.
pub(crate) fn filter_param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_check_query_params() {
        let allowed = &["broker_uid", "type_account"];

        assert!(check_query_params(&params(&[]), allowed).is_ok());
        assert!(check_query_params(&params(&[("type_account", "stocks")]), allowed).is_ok());
        assert!(matches!(
            check_query_params(&params(&[("page", "2")]), allowed),
            Err(TmError::BadRequest(msg)) if msg == "Invalid query parameter"
        ));
    }

    #[test]
    fn test_filter_param_ignores_empty_values() {
        let params = params(&[("broker_uid", ""), ("type_account", "stocks")]);

        assert_eq!(filter_param(&params, "broker_uid"), None);
        assert_eq!(filter_param(&params, "type_account"), Some("stocks"));
        assert_eq!(filter_param(&params, "strategy_uid"), None);
    }
}
