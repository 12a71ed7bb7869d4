use chrono::{DateTime, Utc};
use log::debug;
use std::sync::Arc;

use super::analyzer::analyze_with_limits;
use super::compliance_errors::ComplianceError;
use super::compliance_model::PlanAudit;
use crate::errors::Result;
use crate::plans::{resolve_plan, AuditScope, Plan, PlanError, PlanRepositoryTrait};
use crate::settings::{read_settings, LedgerSettings, SharedSettings};
use crate::trades::{TradeRepositoryTrait, TradeResult};
use crate::utils::{local_date, scope_window};

/// Trait defining the contract for compliance audits.
pub trait ComplianceServiceTrait: Send + Sync {
    /// Audits one plan over the `scope` window that contains `as_of`.
    ///
    /// Trades closed after `as_of` are left out, so an audit taken mid-window
    /// shows the state at that instant.
    fn audit_plan(&self, plan_id: &str, scope: AuditScope, as_of: DateTime<Utc>)
        -> Result<PlanAudit>;

    /// Resolves the account's plan with the configured strategy, then audits it.
    fn audit_account(
        &self,
        account_id: &str,
        scope: AuditScope,
        as_of: DateTime<Utc>,
    ) -> Result<PlanAudit>;
}

pub struct ComplianceService {
    plan_repository: Arc<dyn PlanRepositoryTrait>,
    trade_repository: Arc<dyn TradeRepositoryTrait>,
    settings: SharedSettings,
}

impl ComplianceService {
    pub fn new(
        plan_repository: Arc<dyn PlanRepositoryTrait>,
        trade_repository: Arc<dyn TradeRepositoryTrait>,
        settings: SharedSettings,
    ) -> Self {
        Self {
            plan_repository,
            trade_repository,
            settings,
        }
    }

    fn audit(
        &self,
        settings: &LedgerSettings,
        plan: &Plan,
        scope: AuditScope,
        as_of: DateTime<Utc>,
    ) -> Result<PlanAudit> {
        let tz = settings.tz()?;
        let window = scope_window(plan.scope_unit(scope), local_date(as_of, tz))?;
        let account_plans = self.plan_repository.list_by_account(&plan.account_id, false)?;

        let mut scoped: Vec<TradeResult> = Vec::new();
        for trade in self.trade_repository.list_by_account(&plan.account_id)? {
            trade.validate()?;
            if trade.account_id != plan.account_id {
                return Err(ComplianceError::ForeignTrade {
                    trade_id: trade.id,
                    expected: plan.account_id.clone(),
                    found: trade.account_id,
                }
                .into());
            }
            if trade.closed_at > as_of || !window.contains(local_date(trade.closed_at, tz)) {
                continue;
            }
            let owner = resolve_plan(
                &settings.plan_resolution,
                &plan.account_id,
                trade.plan_id.as_deref(),
                &account_plans,
            )?;
            if owner.is_some_and(|p| p.id == plan.id) {
                scoped.push(trade);
            }
        }

        let thresholds = plan.thresholds(scope, settings.money_scale);
        debug!(
            "Auditing plan {} {} window {}..{} with {} trades (goal {}, stop {})",
            plan.id,
            scope.as_str(),
            window.start,
            window.end,
            scoped.len(),
            thresholds.goal_value,
            thresholds.stop_value
        );
        let result = analyze_with_limits(&scoped, &thresholds)?;

        Ok(PlanAudit {
            plan_id: plan.id.clone(),
            account_id: plan.account_id.clone(),
            scope,
            window,
            timezone: settings.timezone.clone(),
            result,
        })
    }
}

impl ComplianceServiceTrait for ComplianceService {
    fn audit_plan(
        &self,
        plan_id: &str,
        scope: AuditScope,
        as_of: DateTime<Utc>,
    ) -> Result<PlanAudit> {
        let settings = read_settings(&self.settings)?;
        let plan = self.plan_repository.get_by_id(plan_id)?;
        self.audit(&settings, &plan, scope, as_of)
    }

    fn audit_account(
        &self,
        account_id: &str,
        scope: AuditScope,
        as_of: DateTime<Utc>,
    ) -> Result<PlanAudit> {
        let settings = read_settings(&self.settings)?;
        let plans = self.plan_repository.list_by_account(account_id, false)?;
        let plan = resolve_plan(&settings.plan_resolution, account_id, None, &plans)?
            .ok_or_else(|| PlanError::NoPlanForAccount(account_id.to_string()))?;
        self.audit(&settings, plan, scope, as_of)
    }
}
