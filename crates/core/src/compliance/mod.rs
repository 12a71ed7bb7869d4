//! Compliance module - replays a plan's trades against its goal and stop.

mod analyzer;
mod compliance_errors;
mod compliance_model;
mod compliance_service;


pub use analyzer::{analyze, analyze_with_limits};
pub use compliance_errors::ComplianceError;
pub use compliance_model::{
    AuditEvent, AuditOutcome, AuditResult, AuditRow, AuditSummary, AuditThresholds, PlanAudit,
};
pub use compliance_service::{ComplianceService, ComplianceServiceTrait};
