//! Trade Ledger Core - Domain entities, services, and traits.
//!
//! This crate holds the money ledger of trading accounts and the plan
//! compliance audit. Balances are always projected from an append-only list
//! of movements; audits replay a scope's trades against a plan's goal and
//! stop. The crate is storage-agnostic: record stores implement the
//! repository traits.

pub mod accounts;
pub mod compliance;
pub mod constants;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod plans;
pub mod settings;
pub mod trades;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
