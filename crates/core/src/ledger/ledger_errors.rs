use rust_decimal::Decimal;
use thiserror::Error;

/// Integrity and validation failures raised by the ledger.
///
/// Every variant is raised before a balance is computed or a movement is
/// appended; nothing is folded or written when one of these is returned.
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("Malformed movement {movement_id}: {reason}")]
    MalformedMovement { movement_id: String, reason: String },

    #[error("Unknown movement type '{0}'")]
    UnknownMovementType(String),

    #[error("Movement {movement_id} belongs to account {found}, expected {expected}")]
    ForeignAccount {
        movement_id: String,
        expected: String,
        found: String,
    },

    #[error("Account {account_id} has more than one movement with insertion sequence {sequence}")]
    DuplicateSequence { account_id: String, sequence: i64 },

    #[error("Balance of account {account_id} overflows at movement {movement_id}")]
    BalanceOverflow {
        account_id: String,
        movement_id: String,
    },

    #[error("Invalid {movement_type} amount {amount}: {reason}")]
    InvalidAmount {
        movement_type: String,
        amount: Decimal,
        reason: String,
    },

    #[error("Withdrawal of {requested} from account {account_id} would leave a balance of {resulting}")]
    InsufficientBalance {
        account_id: String,
        requested: Decimal,
        resulting: Decimal,
    },

    #[error("Trade {0} already has a booked result")]
    DuplicateTradeResult(String),

    #[error("Account {0} is inactive")]
    AccountInactive(String),
}
