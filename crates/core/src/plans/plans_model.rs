//! Plan domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plans_errors::PlanError;
use crate::compliance::AuditThresholds;
use crate::utils::{percent_of, ScopeUnit};
use crate::Result;

/// Which of a plan's two horizons an audit covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditScope {
    /// The short horizon, a month by default
    Period,
    /// The long horizon, a quarter by default
    Cycle,
}

impl AuditScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditScope::Period => "PERIOD",
            AuditScope::Cycle => "CYCLE",
        }
    }
}

fn default_period_unit() -> ScopeUnit {
    ScopeUnit::Month
}

fn default_cycle_unit() -> ScopeUnit {
    ScopeUnit::Quarter
}

fn default_active() -> bool {
    true
}

/// Capital allocated from one account together with its risk limits.
///
/// All percentages are of `allocated_pl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub allocated_pl: Decimal,
    pub cycle_goal_percent: Decimal,
    pub cycle_stop_percent: Decimal,
    pub period_goal_percent: Decimal,
    pub period_stop_percent: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_per_trade_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reward_ratio: Option<Decimal>,
    #[serde(default = "default_period_unit")]
    pub period_unit: ScopeUnit,
    #[serde(default = "default_cycle_unit")]
    pub cycle_unit: ScopeUnit,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Plan {
    pub fn goal_percent(&self, scope: AuditScope) -> Decimal {
        match scope {
            AuditScope::Period => self.period_goal_percent,
            AuditScope::Cycle => self.cycle_goal_percent,
        }
    }

    pub fn stop_percent(&self, scope: AuditScope) -> Decimal {
        match scope {
            AuditScope::Period => self.period_stop_percent,
            AuditScope::Cycle => self.cycle_stop_percent,
        }
    }

    pub fn scope_unit(&self, scope: AuditScope) -> ScopeUnit {
        match scope {
            AuditScope::Period => self.period_unit,
            AuditScope::Cycle => self.cycle_unit,
        }
    }

    /// Goal, stop and per-trade risk in money, rounded to `money_scale`.
    pub fn thresholds(&self, scope: AuditScope, money_scale: u32) -> AuditThresholds {
        AuditThresholds {
            goal_value: percent_of(self.allocated_pl, self.goal_percent(scope), money_scale),
            stop_value: percent_of(self.allocated_pl, self.stop_percent(scope), money_scale),
            trade_risk: self
                .risk_per_trade_percent
                .map(|percent| percent_of(self.allocated_pl, percent, money_scale)),
        }
    }
}

/// Input model for creating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub allocated_pl: Decimal,
    pub cycle_goal_percent: Decimal,
    pub cycle_stop_percent: Decimal,
    pub period_goal_percent: Decimal,
    pub period_stop_percent: Decimal,
    #[serde(default)]
    pub risk_per_trade_percent: Option<Decimal>,
    #[serde(default)]
    pub target_reward_ratio: Option<Decimal>,
    #[serde(default = "default_period_unit")]
    pub period_unit: ScopeUnit,
    #[serde(default = "default_cycle_unit")]
    pub cycle_unit: ScopeUnit,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewPlan {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(PlanError::InvalidPlan("account id is required".to_string()).into());
        }
        validate_limits(&PlanLimits {
            allocated_pl: self.allocated_pl,
            cycle_goal_percent: self.cycle_goal_percent,
            cycle_stop_percent: self.cycle_stop_percent,
            period_goal_percent: self.period_goal_percent,
            period_stop_percent: self.period_stop_percent,
            risk_per_trade_percent: self.risk_per_trade_percent,
            target_reward_ratio: self.target_reward_ratio,
        })
    }
}

/// Input model for replacing a plan's terms. The account cannot change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUpdate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub allocated_pl: Decimal,
    pub cycle_goal_percent: Decimal,
    pub cycle_stop_percent: Decimal,
    pub period_goal_percent: Decimal,
    pub period_stop_percent: Decimal,
    #[serde(default)]
    pub risk_per_trade_percent: Option<Decimal>,
    #[serde(default)]
    pub target_reward_ratio: Option<Decimal>,
    #[serde(default = "default_period_unit")]
    pub period_unit: ScopeUnit,
    #[serde(default = "default_cycle_unit")]
    pub cycle_unit: ScopeUnit,
    pub is_active: bool,
}

impl PlanUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PlanError::InvalidPlan("plan id is required for updates".to_string()).into());
        }
        validate_limits(&PlanLimits {
            allocated_pl: self.allocated_pl,
            cycle_goal_percent: self.cycle_goal_percent,
            cycle_stop_percent: self.cycle_stop_percent,
            period_goal_percent: self.period_goal_percent,
            period_stop_percent: self.period_stop_percent,
            risk_per_trade_percent: self.risk_per_trade_percent,
            target_reward_ratio: self.target_reward_ratio,
        })
    }
}

impl From<&Plan> for PlanUpdate {
    fn from(plan: &Plan) -> Self {
        PlanUpdate {
            id: plan.id.clone(),
            name: plan.name.clone(),
            allocated_pl: plan.allocated_pl,
            cycle_goal_percent: plan.cycle_goal_percent,
            cycle_stop_percent: plan.cycle_stop_percent,
            period_goal_percent: plan.period_goal_percent,
            period_stop_percent: plan.period_stop_percent,
            risk_per_trade_percent: plan.risk_per_trade_percent,
            target_reward_ratio: plan.target_reward_ratio,
            period_unit: plan.period_unit,
            cycle_unit: plan.cycle_unit,
            is_active: plan.is_active,
        }
    }
}

struct PlanLimits {
    allocated_pl: Decimal,
    cycle_goal_percent: Decimal,
    cycle_stop_percent: Decimal,
    period_goal_percent: Decimal,
    period_stop_percent: Decimal,
    risk_per_trade_percent: Option<Decimal>,
    target_reward_ratio: Option<Decimal>,
}

fn validate_limits(limits: &PlanLimits) -> Result<()> {
    let positive = |label: &str, value: Decimal| -> Result<()> {
        if value <= Decimal::ZERO {
            return Err(PlanError::InvalidPlan(format!(
                "{} must be positive, got {}",
                label, value
            ))
            .into());
        }
        Ok(())
    };

    positive("allocatedPl", limits.allocated_pl)?;
    positive("cycleGoalPercent", limits.cycle_goal_percent)?;
    positive("cycleStopPercent", limits.cycle_stop_percent)?;
    positive("periodGoalPercent", limits.period_goal_percent)?;
    positive("periodStopPercent", limits.period_stop_percent)?;
    if let Some(risk) = limits.risk_per_trade_percent {
        positive("riskPerTradePercent", risk)?;
    }
    if let Some(ratio) = limits.target_reward_ratio {
        positive("targetRewardRatio", ratio)?;
    }

    if limits.period_stop_percent > limits.cycle_stop_percent {
        return Err(PlanError::PeriodStopExceedsCycleStop {
            period: limits.period_stop_percent,
            cycle: limits.cycle_stop_percent,
        }
        .into());
    }
    Ok(())
}
