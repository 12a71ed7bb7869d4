//! Movement repository and ledger service traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::movements_model::{Movement, NewMovement};
use super::projector::BalanceSeries;
use crate::accounts::Account;
use crate::errors::Result;
use crate::trades::TradeResult;

/// Contract for the append-only movement store.
///
/// No update or delete: corrections are appended as new movements.
#[async_trait]
pub trait MovementRepositoryTrait: Send + Sync {
    /// Appends a movement, assigning the next insertion sequence for its
    /// account (and an id when the input has none).
    async fn append(&self, new_movement: NewMovement) -> Result<Movement>;

    /// All movements of one account, in any order.
    fn list_by_account(&self, account_id: &str) -> Result<Vec<Movement>>;

    /// All movements that book or compensate the given trade.
    fn list_by_trade(&self, trade_id: &str) -> Result<Vec<Movement>>;
}

/// Ledger operations: appending movements and reading projected balances.
///
/// Every write is "append one movement, then re-project"; there is no
/// separate arithmetic path for deposits, withdrawals or trade results.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Books the INITIAL_BALANCE movement of a freshly created account.
    async fn open_account_ledger(
        &self,
        account: &Account,
        opened_at: DateTime<Utc>,
    ) -> Result<Movement>;

    /// Books a deposit. `amount` is a positive magnitude.
    async fn deposit(
        &self,
        account_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Movement>;

    /// Books a withdrawal. `amount` is a positive magnitude.
    async fn withdraw(
        &self,
        account_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Movement>;

    /// Books a signed correction.
    async fn adjust(
        &self,
        account_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        reason: String,
    ) -> Result<Movement>;

    /// Books the net result of a finalized trade. A trade is booked once.
    async fn record_trade_result(&self, trade: &TradeResult) -> Result<Movement>;

    /// Cancels whatever is booked for a trade with one offsetting adjustment.
    ///
    /// Returns `None` when the trade's booked net is already zero.
    async fn compensate_trade(
        &self,
        account_id: &str,
        trade_id: &str,
        effective_date: DateTime<Utc>,
        reason: String,
    ) -> Result<Option<Movement>>;

    fn get_movements(&self, account_id: &str) -> Result<Vec<Movement>>;

    fn has_movements(&self, account_id: &str) -> Result<bool>;

    /// Projected ledger, served from the balance cache.
    fn get_balance_series(&self, account_id: &str) -> Result<Arc<BalanceSeries>>;

    fn get_current_balance(&self, account_id: &str) -> Result<Decimal>;

    fn get_balance_at(&self, account_id: &str, at: DateTime<Utc>) -> Result<Decimal>;

    /// Sum of trade results effective in `[from, to)`.
    fn get_period_pnl(
        &self,
        account_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal>;

    /// Current balance minus capital promised to other active plans.
    ///
    /// `editing_plan_id` names a plan whose own allocation is left out.
    fn get_available_capital(&self, account_id: &str, editing_plan_id: Option<&str>)
        -> Result<Decimal>;
}
