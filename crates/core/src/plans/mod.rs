//! Plans module - capital allocations, their risk limits, and plan resolution.

mod plans_errors;
mod plans_model;
mod plans_service;
mod plans_traits;
mod resolution;


pub use plans_errors::PlanError;
pub use plans_model::{AuditScope, NewPlan, Plan, PlanUpdate};
pub use plans_service::PlanService;
pub use plans_traits::{PlanRepositoryTrait, PlanServiceTrait};
pub use resolution::{resolve_plan, PlanResolutionStep};
