use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::balance_cache::BalanceCache;
use super::integrity::trade_net_booked;
use super::ledger_errors::LedgerError;
use super::ledger_traits::{LedgerServiceTrait, MovementRepositoryTrait};
use super::movements_model::{Movement, MovementType, NewMovement};
use super::projector::{allocated_capital, project, BalanceSeries};
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::plans::PlanRepositoryTrait;
use crate::settings::{read_settings, SharedSettings};
use crate::trades::TradeResult;

/// Appends movements and serves projected balances.
pub struct LedgerService {
    movement_repository: Arc<dyn MovementRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    plan_repository: Arc<dyn PlanRepositoryTrait>,
    settings: SharedSettings,
    cache: BalanceCache,
    event_sink: Arc<dyn DomainEventSink>,
}

impl LedgerService {
    pub fn new(
        movement_repository: Arc<dyn MovementRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        plan_repository: Arc<dyn PlanRepositoryTrait>,
        settings: SharedSettings,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            movement_repository,
            account_repository,
            plan_repository,
            settings,
            cache: BalanceCache::new(),
            event_sink,
        }
    }

    /// Drops every cached projection, e.g. after the record store was restored.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn writable_account(&self, account_id: &str) -> Result<Account> {
        let account = self.account_repository.get_by_id(account_id)?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(account_id.to_string()).into());
        }
        Ok(account)
    }

    /// The single write path: validate, append, invalidate, announce.
    async fn append(&self, mut new_movement: NewMovement) -> Result<Movement> {
        new_movement.validate()?;
        if new_movement.id.is_none() {
            new_movement.id = Some(Uuid::new_v4().to_string());
        }

        let movement = self.movement_repository.append(new_movement).await?;
        self.cache.invalidate(&movement.account_id);

        debug!(
            "Appended {} movement {} of {} to account {} (seq {})",
            movement.movement_type(),
            movement.id,
            movement.amount(),
            movement.account_id,
            movement.sequence
        );
        self.event_sink.emit(DomainEvent::movements_appended(
            movement.account_id.clone(),
            vec![movement.id.clone()],
        ));
        Ok(movement)
    }

    /// Lowest running balance from `candidate` onward once it is projected
    /// into the account's ledger.
    ///
    /// The candidate takes the next insertion sequence, so a backdated
    /// movement is checked against every later balance it shifts.
    fn lowest_balance_with(&self, account: &Account, candidate: &NewMovement) -> Result<Decimal> {
        let mut movements = self.movement_repository.list_by_account(&account.id)?;
        // An unopened ledger still starts from the recorded initial balance
        let base = if movements.is_empty() {
            account.initial_balance
        } else {
            Decimal::ZERO
        };
        let sequence = movements.iter().map(|m| m.sequence).max().unwrap_or(0) + 1;
        let provisional_id = format!("pending-{}", sequence);
        movements.push(Movement {
            id: provisional_id.clone(),
            account_id: account.id.clone(),
            sequence,
            effective_date: candidate.effective_date,
            description: None,
            kind: candidate.kind.clone(),
        });

        let series = project(&account.id, &movements)?;
        let lowest = series
            .rows
            .iter()
            .skip_while(|row| row.movement.id != provisional_id)
            .map(|row| row.balance_after)
            .min()
            .unwrap_or(Decimal::ZERO);
        Ok(base + lowest)
    }

    fn closing_or_initial(&self, account: &Account) -> Result<Decimal> {
        let series = self.get_balance_series(&account.id)?;
        Ok(series.closing_balance().unwrap_or(account.initial_balance))
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn open_account_ledger(
        &self,
        account: &Account,
        opened_at: DateTime<Utc>,
    ) -> Result<Movement> {
        if self.has_movements(&account.id)? {
            return Err(Error::ConstraintViolation(format!(
                "Ledger of account {} is already open",
                account.id
            )));
        }
        let opening = NewMovement::initial_balance(&account.id, account.initial_balance, opened_at)
            .with_description("Opening balance");
        self.append(opening).await
    }

    async fn deposit(
        &self,
        account_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Movement> {
        self.writable_account(account_id)?;
        let mut movement = NewMovement::deposit(account_id, amount, effective_date);
        movement.description = description;
        self.append(movement).await
    }

    /// Rejects the withdrawal without appending anything when the projected
    /// balance would drop below zero at its date or at any later movement,
    /// unless negative balances are allowed.
    async fn withdraw(
        &self,
        account_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Movement> {
        let account = self.writable_account(account_id)?;
        let mut movement = NewMovement::withdrawal(account_id, amount, effective_date);
        movement.description = description;
        movement.validate()?;

        let settings = read_settings(&self.settings)?;
        let resulting = self.lowest_balance_with(&account, &movement)?;
        if resulting < Decimal::ZERO && !settings.allow_negative_balance {
            warn!(
                "Rejected withdrawal of {} from account {}: balance would be {}",
                amount, account_id, resulting
            );
            return Err(LedgerError::InsufficientBalance {
                account_id: account_id.to_string(),
                requested: amount,
                resulting,
            }
            .into());
        }

        self.append(movement).await
    }

    async fn adjust(
        &self,
        account_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
        reason: String,
    ) -> Result<Movement> {
        self.writable_account(account_id)?;
        let movement =
            NewMovement::adjustment(account_id, amount, None, effective_date).with_description(reason);
        self.append(movement).await
    }

    async fn record_trade_result(&self, trade: &TradeResult) -> Result<Movement> {
        trade.validate()?;
        self.writable_account(&trade.account_id)?;

        let already_booked = self
            .movement_repository
            .list_by_trade(&trade.id)?
            .iter()
            .any(|m| m.movement_type() == MovementType::TradeResult);
        if already_booked {
            return Err(LedgerError::DuplicateTradeResult(trade.id.clone()).into());
        }

        let movement = NewMovement::trade_result(
            &trade.account_id,
            &trade.id,
            trade.net_result,
            trade.closed_at,
        );
        self.append(movement).await
    }

    async fn compensate_trade(
        &self,
        account_id: &str,
        trade_id: &str,
        effective_date: DateTime<Utc>,
        reason: String,
    ) -> Result<Option<Movement>> {
        self.writable_account(account_id)?;

        let booked: Vec<Movement> = self
            .movement_repository
            .list_by_trade(trade_id)?
            .into_iter()
            .filter(|m| m.account_id == account_id)
            .collect();
        let net = trade_net_booked(&booked, trade_id);
        if net.is_zero() {
            debug!(
                "Trade {} has nothing booked on account {}, no compensation needed",
                trade_id, account_id
            );
            return Ok(None);
        }

        let movement = NewMovement::adjustment(account_id, -net, Some(trade_id), effective_date)
            .with_description(reason);
        self.append(movement).await.map(Some)
    }

    fn get_movements(&self, account_id: &str) -> Result<Vec<Movement>> {
        self.movement_repository.list_by_account(account_id)
    }

    fn has_movements(&self, account_id: &str) -> Result<bool> {
        Ok(!self.movement_repository.list_by_account(account_id)?.is_empty())
    }

    fn get_balance_series(&self, account_id: &str) -> Result<Arc<BalanceSeries>> {
        self.cache.get_or_load(account_id, || {
            let movements = self.movement_repository.list_by_account(account_id)?;
            project(account_id, &movements)
        })
    }

    fn get_current_balance(&self, account_id: &str) -> Result<Decimal> {
        let account = self.account_repository.get_by_id(account_id)?;
        self.closing_or_initial(&account)
    }

    fn get_balance_at(&self, account_id: &str, at: DateTime<Utc>) -> Result<Decimal> {
        let account = self.account_repository.get_by_id(account_id)?;
        let series = self.get_balance_series(account_id)?;
        Ok(series.balance_at(at).unwrap_or(account.initial_balance))
    }

    fn get_period_pnl(
        &self,
        account_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal> {
        let series = self.get_balance_series(account_id)?;
        Ok(series.trade_pnl_between(from, to))
    }

    fn get_available_capital(
        &self,
        account_id: &str,
        editing_plan_id: Option<&str>,
    ) -> Result<Decimal> {
        let account = self.account_repository.get_by_id(account_id)?;
        let balance = self.closing_or_initial(&account)?;
        let plans = self.plan_repository.list_by_account(account_id, true)?;
        Ok(balance - allocated_capital(account_id, &plans, editing_plan_id))
    }
}
