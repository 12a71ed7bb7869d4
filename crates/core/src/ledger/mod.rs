//! Ledger module - movements, balance projection, and the ledger service.

mod balance_cache;
mod integrity;
mod ledger_errors;
mod ledger_service;
mod ledger_traits;
mod movements_model;
mod projector;

#[cfg(test)]
mod ledger_service_tests;

pub use balance_cache::BalanceCache;
pub use integrity::{find_orphaned_movements, trade_net_booked, OrphanedMovement};
pub use ledger_errors::LedgerError;
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerServiceTrait, MovementRepositoryTrait};
pub use movements_model::{
    Movement, MovementKind, MovementRecord, MovementType, NewMovement,
    MOVEMENT_TYPE_ADJUSTMENT, MOVEMENT_TYPE_DEPOSIT, MOVEMENT_TYPE_INITIAL_BALANCE,
    MOVEMENT_TYPE_TRADE_RESULT, MOVEMENT_TYPE_WITHDRAWAL,
};
pub use projector::{
    allocated_capital, available_capital, balance_at, current_balance, period_pnl, project,
    project_records, BalanceSeries, ProjectedMovement,
};
