use rust_decimal::Decimal;
use thiserror::Error;

/// Integrity errors raised before a compliance replay starts.
#[derive(Error, Debug, PartialEq)]
pub enum ComplianceError {
    #[error("{name} must be a positive amount, got {value}")]
    InvalidThreshold { name: String, value: Decimal },

    #[error("Trade {trade_id} belongs to account {found}, the audited plan to {expected}")]
    ForeignTrade {
        trade_id: String,
        expected: String,
        found: String,
    },

    #[error("Trades {first} and {second} share close time and sequence {sequence}")]
    DuplicateTradeKey {
        first: String,
        second: String,
        sequence: i64,
    },

    #[error("Scope balance overflows at trade {0}")]
    BalanceOverflow(String),
}
