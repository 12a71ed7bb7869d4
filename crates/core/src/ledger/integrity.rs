//! Referential checks over a ledger.
//!
//! The engine does not repair orphaned movements. It reports them so an
//! external policy can decide whether to compensate the trade or restore it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::movements_model::{Movement, MovementType};

/// A movement whose linked trade no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedMovement {
    pub movement_id: String,
    pub account_id: String,
    pub trade_id: String,
    pub movement_type: MovementType,
    pub amount: Decimal,
}

/// Lists movements that reference a trade id absent from `known_trade_ids`.
pub fn find_orphaned_movements(
    movements: &[Movement],
    known_trade_ids: &HashSet<String>,
) -> Vec<OrphanedMovement> {
    movements
        .iter()
        .filter_map(|movement| {
            let trade_id = movement.trade_id()?;
            if known_trade_ids.contains(trade_id) {
                return None;
            }
            Some(OrphanedMovement {
                movement_id: movement.id.clone(),
                account_id: movement.account_id.clone(),
                trade_id: trade_id.to_string(),
                movement_type: movement.movement_type(),
                amount: movement.amount(),
            })
        })
        .collect()
}

/// Net amount still booked against a trade once compensations are counted.
pub fn trade_net_booked(movements: &[Movement], trade_id: &str) -> Decimal {
    movements
        .iter()
        .filter(|m| m.trade_id() == Some(trade_id))
        .map(|m| m.amount())
        .sum()
}
