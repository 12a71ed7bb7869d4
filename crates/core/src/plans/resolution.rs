//! Plan resolution.
//!
//! Decides which plan a trade, or an account as a whole, answers to. The
//! order of the steps comes from settings; the first step that yields a plan
//! wins.

use log::debug;
use serde::{Deserialize, Serialize};

use super::plans_errors::PlanError;
use super::plans_model::Plan;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanResolutionStep {
    /// The plan the trade was tagged with, active or not
    ExplicitPlanId,
    /// The only active plan on the account; several is an error
    SingleActivePlan,
    /// The most recently created active plan
    LatestActivePlan,
}

/// Resolves a plan among `plans`, which should be every plan of `account_id`.
///
/// Returns `Ok(None)` when no step yields a plan. Plans of other accounts are
/// never returned, even when named explicitly.
pub fn resolve_plan<'a>(
    steps: &[PlanResolutionStep],
    account_id: &str,
    explicit_plan_id: Option<&str>,
    plans: &'a [Plan],
) -> Result<Option<&'a Plan>> {
    let own = || plans.iter().filter(move |p| p.account_id == account_id);

    for step in steps {
        let found = match step {
            PlanResolutionStep::ExplicitPlanId => {
                explicit_plan_id.and_then(|wanted| own().find(|p| p.id == wanted))
            }
            PlanResolutionStep::SingleActivePlan => {
                let active: Vec<&Plan> = own().filter(|p| p.is_active).collect();
                if active.len() > 1 {
                    return Err(PlanError::AmbiguousPlan {
                        account_id: account_id.to_string(),
                        candidates: active.iter().map(|p| p.id.clone()).collect(),
                    }
                    .into());
                }
                active.into_iter().next()
            }
            PlanResolutionStep::LatestActivePlan => own()
                .filter(|p| p.is_active)
                .max_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id))),
        };

        if let Some(plan) = found {
            debug!(
                "Resolved plan {} for account {} via {:?}",
                plan.id, account_id, step
            );
            return Ok(Some(plan));
        }
    }
    Ok(None)
}
