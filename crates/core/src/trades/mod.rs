//! Trades module - finalized trade results consumed by the ledger and the compliance audit.

mod trades_model;
mod trades_traits;

pub use trades_model::TradeResult;
pub use trades_traits::TradeRepositoryTrait;
