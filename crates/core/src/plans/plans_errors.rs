use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration errors around plans.
///
/// These are surfaced to the trader for correction; the engine never picks a
/// plan or trims an allocation on its own.
#[derive(Error, Debug, PartialEq)]
pub enum PlanError {
    #[error("Plan needs {requested} but account {account_id} only has {available} available")]
    InsufficientCapital {
        account_id: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Period stop {period}% exceeds cycle stop {cycle}%")]
    PeriodStopExceedsCycleStop { period: Decimal, cycle: Decimal },

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Account {account_id} has several active plans ({}), tag the trade with one", candidates.join(", "))]
    AmbiguousPlan {
        account_id: String,
        candidates: Vec<String>,
    },

    #[error("No plan applies to account {0}")]
    NoPlanForAccount(String),
}
