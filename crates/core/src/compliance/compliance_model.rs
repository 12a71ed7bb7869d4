//! Compliance audit view models.
//!
//! Everything here is derived on demand from trades and thresholds and is
//! never persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::compliance_errors::ComplianceError;
use crate::plans::AuditScope;
use crate::utils::ScopeWindow;

/// The primary threshold crossing of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    GoalHit,
    StopHit,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::GoalHit => "GOAL_HIT",
            AuditEvent::StopHit => "STOP_HIT",
        }
    }
}

/// How the trader behaved relative to goal and stop over a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    /// Neither threshold crossed yet
    InProgress,
    /// Goal reached and kept
    GoalDisciplined,
    /// Goal reached, then part of it handed back
    GoalGaveBack,
    /// Goal reached, then lost past the stop
    GoalToStop,
    /// Stop reached and no further damage
    StopDisciplined,
    /// Stop reached and losses kept growing
    StopWorsened,
    /// Stop reached, then traded back into profit
    StopRecovered,
    /// Scope opened with a loss and still closed at or above the goal
    LossToGoal,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::InProgress => "IN_PROGRESS",
            AuditOutcome::GoalDisciplined => "GOAL_DISCIPLINED",
            AuditOutcome::GoalGaveBack => "GOAL_GAVE_BACK",
            AuditOutcome::GoalToStop => "GOAL_TO_STOP",
            AuditOutcome::StopDisciplined => "STOP_DISCIPLINED",
            AuditOutcome::StopWorsened => "STOP_WORSENED",
            AuditOutcome::StopRecovered => "STOP_RECOVERED",
            AuditOutcome::LossToGoal => "LOSS_TO_GOAL",
        }
    }
}

/// Money thresholds a replay is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditThresholds {
    pub goal_value: Decimal,
    pub stop_value: Decimal,
    /// Largest acceptable loss on a single trade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_risk: Option<Decimal>,
}

impl AuditThresholds {
    pub fn new(goal_value: Decimal, stop_value: Decimal) -> Self {
        Self {
            goal_value,
            stop_value,
            trade_risk: None,
        }
    }

    pub fn with_trade_risk(mut self, trade_risk: Decimal) -> Self {
        self.trade_risk = Some(trade_risk);
        self
    }

    /// All thresholds are positive magnitudes.
    pub fn validate(&self) -> Result<(), ComplianceError> {
        let checks = [
            ("goalValue", Some(self.goal_value)),
            ("stopValue", Some(self.stop_value)),
            ("tradeRisk", self.trade_risk),
        ];
        for (name, value) in checks {
            if let Some(value) = value {
                if value <= Decimal::ZERO {
                    return Err(ComplianceError::InvalidThreshold {
                        name: name.to_string(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// One replayed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRow {
    pub trade_id: String,
    pub closed_at: DateTime<Utc>,
    pub result: Decimal,
    /// Scope P&L after this trade
    pub balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<AuditEvent>,
    pub after_goal: bool,
    pub after_stop: bool,
    pub exceeds_trade_risk: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub trades_after_goal: usize,
    pub trades_after_stop: usize,
    pub risk_breaches: usize,
}

/// Outcome of replaying one scope's trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub goal_value: Decimal,
    pub stop_value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_risk: Option<Decimal>,
    pub history: Vec<AuditRow>,
    pub final_balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_event: Option<AuditEvent>,
    /// Scope P&L on the row that fired the primary event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_at_event: Option<Decimal>,
    pub outcome: AuditOutcome,
    pub remaining_to_goal: Decimal,
    pub remaining_to_stop: Decimal,
    pub summary: AuditSummary,
}

/// A plan's audit over one concrete calendar window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAudit {
    pub plan_id: String,
    pub account_id: String,
    pub scope: AuditScope,
    pub window: ScopeWindow,
    pub timezone: String,
    pub result: AuditResult,
}
