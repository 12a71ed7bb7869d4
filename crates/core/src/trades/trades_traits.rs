//! Trade repository trait.

use crate::errors::Result;

use super::trades_model::TradeResult;

/// Read access to finalized trades. The trade store is owned by the journal;
/// this crate never writes to it.
pub trait TradeRepositoryTrait: Send + Sync {
    /// All finalized trades of one account, in any order.
    fn list_by_account(&self, account_id: &str) -> Result<Vec<TradeResult>>;
}
