//! Engine settings models.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::constants::{DEFAULT_TIMEZONE, MAX_MONEY_SCALE, MONEY_SCALE};
use crate::errors::{Error, Result};
use crate::plans::PlanResolutionStep;
use crate::utils::parse_timezone;

/// Settings shared by every service that reads them.
pub type SharedSettings = Arc<RwLock<LedgerSettings>>;

/// Runtime configuration of the ledger and compliance services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerSettings {
    /// Decimal places kept for thresholds and displayed balances
    pub money_scale: u32,
    /// IANA timezone used to assign trades to scope windows
    pub timezone: String,
    /// When false, withdrawals that would take the balance below zero are rejected
    pub allow_negative_balance: bool,
    /// Ordered strategy for finding the plan a trade or account answers to
    pub plan_resolution: Vec<PlanResolutionStep>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            money_scale: MONEY_SCALE,
            timezone: DEFAULT_TIMEZONE.to_string(),
            allow_negative_balance: false,
            plan_resolution: vec![
                PlanResolutionStep::ExplicitPlanId,
                PlanResolutionStep::SingleActivePlan,
            ],
        }
    }
}

impl LedgerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.money_scale > MAX_MONEY_SCALE {
            return Err(Error::InvalidConfigValue(format!(
                "moneyScale must be at most {}, got {}",
                MAX_MONEY_SCALE, self.money_scale
            )));
        }
        parse_timezone(&self.timezone)?;
        if self.plan_resolution.is_empty() {
            return Err(Error::InvalidConfigValue(
                "planResolution needs at least one step".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }

    /// Returns a copy with every field present in `update` replaced.
    pub fn merged(&self, update: &SettingsUpdate) -> LedgerSettings {
        let mut next = self.clone();
        if let Some(scale) = update.money_scale {
            next.money_scale = scale;
        }
        if let Some(ref timezone) = update.timezone {
            next.timezone = timezone.clone();
        }
        if let Some(allow) = update.allow_negative_balance {
            next.allow_negative_balance = allow;
        }
        if let Some(ref steps) = update.plan_resolution {
            next.plan_resolution = steps.clone();
        }
        next
    }
}

/// Partial update of [`LedgerSettings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub money_scale: Option<u32>,
    pub timezone: Option<String>,
    pub allow_negative_balance: Option<bool>,
    pub plan_resolution: Option<Vec<PlanResolutionStep>>,
}

/// Clones the current value out of a shared settings handle.
pub fn read_settings(shared: &SharedSettings) -> Result<LedgerSettings> {
    shared
        .read()
        .map(|guard| guard.clone())
        .map_err(|_| Error::Unexpected("Settings lock poisoned".to_string()))
}
