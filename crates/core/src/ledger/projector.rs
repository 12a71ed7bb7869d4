//! Balance projection.
//!
//! Turns an unordered set of movements for one account into a chronological
//! running balance. Every balance figure in the engine (current balance,
//! available capital, period P&L) is read from this fold.

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ledger_errors::LedgerError;
use super::movements_model::{Movement, MovementKind, MovementRecord};
use crate::accounts::Account;
use crate::errors::Result;
use crate::plans::Plan;
use crate::utils::sort_chronologically;

/// A movement annotated with the running balance after applying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedMovement {
    #[serde(flatten)]
    pub movement: Movement,
    pub balance_after: Decimal,
}

/// The projected ledger of one account, ascending by `(effective_date, sequence)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSeries {
    pub account_id: String,
    pub rows: Vec<ProjectedMovement>,
}

impl BalanceSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Running balance after the last movement, `None` for an empty ledger.
    pub fn closing_balance(&self) -> Option<Decimal> {
        self.rows.last().map(|row| row.balance_after)
    }

    /// Running balance after the last movement effective at or before `at`.
    pub fn balance_at(&self, at: DateTime<Utc>) -> Option<Decimal> {
        let idx = self
            .rows
            .partition_point(|row| row.movement.effective_date <= at);
        idx.checked_sub(1).map(|i| self.rows[i].balance_after)
    }

    /// Sum of TRADE_RESULT amounts effective in `[from, to)`.
    pub fn trade_pnl_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
        self.rows
            .iter()
            .filter(|row| {
                let date = row.movement.effective_date;
                date >= from && date < to
            })
            .filter(|row| matches!(row.movement.kind, MovementKind::TradeResult { .. }))
            .map(|row| row.movement.amount())
            .sum()
    }

    /// Persisted shape of every row with its derived `balanceAfter` filled in.
    pub fn to_records(&self) -> Vec<MovementRecord> {
        self.rows
            .iter()
            .map(|row| row.movement.to_record(Some(row.balance_after)))
            .collect()
    }
}

/// Projects the movements of `account_id` into a running balance series.
///
/// The input may be in any order. The result depends only on the set of
/// movements: they are sorted by `(effective_date, sequence)` before the
/// fold. Movements of another account, movements violating the sign
/// convention, and repeated sequences are rejected before anything is folded.
pub fn project(account_id: &str, movements: &[Movement]) -> Result<BalanceSeries> {
    let mut seen_sequences = HashSet::with_capacity(movements.len());
    for movement in movements {
        if movement.account_id != account_id {
            return Err(LedgerError::ForeignAccount {
                movement_id: movement.id.clone(),
                expected: account_id.to_string(),
                found: movement.account_id.clone(),
            }
            .into());
        }
        movement.kind.check_sign()?;
        if !seen_sequences.insert(movement.sequence) {
            return Err(LedgerError::DuplicateSequence {
                account_id: account_id.to_string(),
                sequence: movement.sequence,
            }
            .into());
        }
    }

    let mut ordered = movements.to_vec();
    sort_chronologically(&mut ordered);

    let mut balance = Decimal::ZERO;
    let mut rows = Vec::with_capacity(ordered.len());
    for movement in ordered {
        balance = balance
            .checked_add(signed_effect(&movement.kind))
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account_id: account_id.to_string(),
                movement_id: movement.id.clone(),
            })?;
        rows.push(ProjectedMovement {
            movement,
            balance_after: balance,
        });
    }

    debug!(
        "Projected {} movements for account {}, closing balance {}",
        rows.len(),
        account_id,
        balance
    );

    Ok(BalanceSeries {
        account_id: account_id.to_string(),
        rows,
    })
}

/// Validates raw store records, then projects them.
///
/// A single malformed record fails the whole projection.
pub fn project_records(account_id: &str, records: Vec<MovementRecord>) -> Result<BalanceSeries> {
    let movements = records
        .into_iter()
        .map(Movement::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    project(account_id, &movements)
}

fn signed_effect(kind: &MovementKind) -> Decimal {
    match kind {
        MovementKind::InitialBalance { amount }
        | MovementKind::Deposit { amount }
        | MovementKind::Withdrawal { amount }
        | MovementKind::TradeResult { amount, .. }
        | MovementKind::Adjustment { amount, .. } => *amount,
    }
}

/// What the account is worth after its last movement.
///
/// An account without movements is worth its recorded initial balance.
pub fn current_balance(account: &Account, movements: &[Movement]) -> Result<Decimal> {
    let series = project(&account.id, movements)?;
    Ok(series.closing_balance().unwrap_or(account.initial_balance))
}

/// Balance snapshot at instant `at`; the recorded initial balance when no
/// movement is effective yet.
pub fn balance_at(account: &Account, movements: &[Movement], at: DateTime<Utc>) -> Result<Decimal> {
    let series = project(&account.id, movements)?;
    Ok(series.balance_at(at).unwrap_or(account.initial_balance))
}

/// Sum of TRADE_RESULT amounts effective in `[from, to)`.
pub fn period_pnl(
    account_id: &str,
    movements: &[Movement],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Decimal> {
    let series = project(account_id, movements)?;
    Ok(series.trade_pnl_between(from, to))
}

/// Capital promised to active plans on `account_id`, leaving out `editing_plan_id`.
pub fn allocated_capital(account_id: &str, plans: &[Plan], editing_plan_id: Option<&str>) -> Decimal {
    plans
        .iter()
        .filter(|plan| plan.account_id == account_id && plan.is_active)
        .filter(|plan| Some(plan.id.as_str()) != editing_plan_id)
        .map(|plan| plan.allocated_pl)
        .sum()
}

/// Current balance of `account` minus capital promised to its other active plans.
///
/// `all_movements` may span several accounts; only this account's are used.
/// The plan being edited is excluded so its owner sees the room available to
/// resize it.
pub fn available_capital(
    account: &Account,
    all_movements: &[Movement],
    active_plans: &[Plan],
    editing_plan_id: Option<&str>,
) -> Result<Decimal> {
    let own: Vec<Movement> = all_movements
        .iter()
        .filter(|m| m.account_id == account.id)
        .cloned()
        .collect();
    let balance = current_balance(account, &own)?;
    Ok(balance - allocated_capital(&account.id, active_plans, editing_plan_id))
}
