use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::plans_errors::PlanError;
use super::plans_model::{NewPlan, Plan, PlanUpdate};
use super::plans_traits::{PlanRepositoryTrait, PlanServiceTrait};
use super::resolution::resolve_plan;
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::ledger::LedgerServiceTrait;
use crate::settings::{read_settings, SharedSettings};
use crate::trades::TradeResult;

/// Service for managing trading plans
pub struct PlanService {
    repository: Arc<dyn PlanRepositoryTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
    settings: SharedSettings,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PlanService {
    pub fn new(
        repository: Arc<dyn PlanRepositoryTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
        settings: SharedSettings,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            ledger_service,
            settings,
            event_sink,
        }
    }

    /// Reads available capital right before a write and rejects over-allocation.
    fn ensure_capital(
        &self,
        account_id: &str,
        requested: Decimal,
        editing_plan_id: Option<&str>,
    ) -> Result<()> {
        let available = self
            .ledger_service
            .get_available_capital(account_id, editing_plan_id)?;
        if requested > available {
            warn!(
                "Plan allocation of {} rejected on account {}: {} available",
                requested, account_id, available
            );
            return Err(PlanError::InsufficientCapital {
                account_id: account_id.to_string(),
                requested,
                available,
            }
            .into());
        }
        Ok(())
    }

    fn resolve(&self, account_id: &str, explicit_plan_id: Option<&str>) -> Result<Option<Plan>> {
        let settings = read_settings(&self.settings)?;
        let plans = self.repository.list_by_account(account_id, false)?;
        let resolved = resolve_plan(
            &settings.plan_resolution,
            account_id,
            explicit_plan_id,
            &plans,
        )?;
        Ok(resolved.cloned())
    }
}

#[async_trait]
impl PlanServiceTrait for PlanService {
    async fn create_plan(&self, new_plan: NewPlan) -> Result<Plan> {
        new_plan.validate()?;
        if new_plan.is_active {
            self.ensure_capital(&new_plan.account_id, new_plan.allocated_pl, None)?;
        }

        let plan = self.repository.create(new_plan).await?;
        debug!(
            "Created plan {} on account {} with {} allocated",
            plan.id, plan.account_id, plan.allocated_pl
        );
        self.event_sink.emit(DomainEvent::plans_changed(
            plan.account_id.clone(),
            vec![plan.id.clone()],
        ));
        Ok(plan)
    }

    async fn update_plan(&self, plan_update: PlanUpdate) -> Result<Plan> {
        plan_update.validate()?;
        let existing = self.repository.get_by_id(&plan_update.id)?;
        if plan_update.is_active {
            self.ensure_capital(
                &existing.account_id,
                plan_update.allocated_pl,
                Some(&existing.id),
            )?;
        }

        let plan = self.repository.update(plan_update).await?;
        self.event_sink.emit(DomainEvent::plans_changed(
            plan.account_id.clone(),
            vec![plan.id.clone()],
        ));
        Ok(plan)
    }

    async fn deactivate_plan(&self, plan_id: &str) -> Result<Plan> {
        let existing = self.repository.get_by_id(plan_id)?;
        if !existing.is_active {
            return Ok(existing);
        }

        let mut update = PlanUpdate::from(&existing);
        update.is_active = false;
        let plan = self.repository.update(update).await?;
        debug!("Deactivated plan {} on account {}", plan.id, plan.account_id);
        self.event_sink.emit(DomainEvent::plans_changed(
            plan.account_id.clone(),
            vec![plan.id.clone()],
        ));
        Ok(plan)
    }

    fn get_plan(&self, plan_id: &str) -> Result<Plan> {
        self.repository.get_by_id(plan_id)
    }

    fn list_plans(&self, account_id: &str) -> Result<Vec<Plan>> {
        self.repository.list_by_account(account_id, false)
    }

    fn list_active_plans(&self, account_id: &str) -> Result<Vec<Plan>> {
        self.repository.list_by_account(account_id, true)
    }

    fn resolve_plan_for_trade(&self, trade: &TradeResult) -> Result<Option<Plan>> {
        self.resolve(&trade.account_id, trade.plan_id.as_deref())
    }

    fn resolve_plan_for_account(&self, account_id: &str) -> Result<Option<Plan>> {
        self.resolve(account_id, None)
    }
}
