//! Repository layer for the Trades Management service.
//!
//! Every query runs directly on the pool and, apart from user lookup, is
//! scoped by the owning user's internal id.

pub mod accounts;
pub mod brokers;
pub mod strategies;
pub mod trades;
pub mod users;

pub use accounts::AccountsRepository;
pub use brokers::BrokersRepository;
pub use strategies::StrategiesRepository;
pub use trades::TradesRepository;
pub use users::UsersRepository;

use crate::errors::TmError;
use crate::observability::metrics;
use std::future::Future;
use std::time::Instant;

/// Run a query, recording its duration and outcome under `operation`.
pub(crate) async fn timed<T, F>(operation: &'static str, query: F) -> Result<T, TmError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    let start = Instant::now();
    let result = query.await;
    let duration = start.elapsed();

    match result {
        Ok(value) => {
            metrics::record_db_query(operation, "success", duration);
            Ok(value)
        }
        Err(e) => {
            metrics::record_db_query(operation, "error", duration);
            Err(TmError::Database(e.to_string()))
        }
    }
}
