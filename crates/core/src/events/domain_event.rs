//! Domain event types.

use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about ledger changes. Runtime adapters
/// translate them into platform-specific actions (refreshing balance views,
/// re-running audits, notifying a mentor, etc.).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Accounts were created, updated, or deleted.
    AccountsChanged { account_ids: Vec<String> },

    /// Movements were appended to an account's ledger.
    MovementsAppended {
        account_id: String,
        movement_ids: Vec<String>,
    },

    /// Plans were created, updated, or deactivated.
    PlansChanged {
        account_id: String,
        plan_ids: Vec<String>,
    },
}

impl DomainEvent {
    /// Creates an AccountsChanged event.
    pub fn accounts_changed(account_ids: Vec<String>) -> Self {
        Self::AccountsChanged { account_ids }
    }

    /// Creates a MovementsAppended event.
    pub fn movements_appended(account_id: String, movement_ids: Vec<String>) -> Self {
        Self::MovementsAppended {
            account_id,
            movement_ids,
        }
    }

    /// Creates a PlansChanged event.
    pub fn plans_changed(account_id: String, plan_ids: Vec<String>) -> Self {
        Self::PlansChanged {
            account_id,
            plan_ids,
        }
    }
}
