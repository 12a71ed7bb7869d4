//! Plan repository and service traits.

use async_trait::async_trait;

use super::plans_model::{NewPlan, Plan, PlanUpdate};
use crate::errors::Result;
use crate::trades::TradeResult;

/// Trait defining the contract for Plan repository operations.
#[async_trait]
pub trait PlanRepositoryTrait: Send + Sync {
    async fn create(&self, new_plan: NewPlan) -> Result<Plan>;

    async fn update(&self, plan_update: PlanUpdate) -> Result<Plan>;

    fn get_by_id(&self, plan_id: &str) -> Result<Plan>;

    /// Plans of one account; only active ones when `active_only` is set.
    fn list_by_account(&self, account_id: &str, active_only: bool) -> Result<Vec<Plan>>;
}

/// Trait defining the contract for Plan service operations.
#[async_trait]
pub trait PlanServiceTrait: Send + Sync {
    /// Creates a plan after checking its limits and the account's available capital.
    async fn create_plan(&self, new_plan: NewPlan) -> Result<Plan>;

    /// Replaces a plan's terms. The plan's own allocation is not counted
    /// against the capital available to it.
    async fn update_plan(&self, plan_update: PlanUpdate) -> Result<Plan>;

    async fn deactivate_plan(&self, plan_id: &str) -> Result<Plan>;

    fn get_plan(&self, plan_id: &str) -> Result<Plan>;

    fn list_plans(&self, account_id: &str) -> Result<Vec<Plan>>;

    fn list_active_plans(&self, account_id: &str) -> Result<Vec<Plan>>;

    /// The plan a finalized trade answers to under the configured strategy.
    fn resolve_plan_for_trade(&self, trade: &TradeResult) -> Result<Option<Plan>>;

    /// The plan an account answers to when no trade names one.
    fn resolve_plan_for_account(&self, account_id: &str) -> Result<Option<Plan>>;
}
