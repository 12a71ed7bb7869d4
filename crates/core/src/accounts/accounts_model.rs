//! Account domain models.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// What kind of capital an account holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    /// Real money at a broker
    #[default]
    Live,
    /// Paper trading
    Simulated,
    /// Capital provided by a funded-trader program
    Funded,
}

/// A capital container owned by one trader.
///
/// The account never stores a live balance. `initial_balance` is the
/// reference figure entered at creation; the running balance is always
/// projected from the account's movements.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub currency: String,
    pub kind: AccountKind,
    pub initial_balance: Decimal,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub kind: AccountKind,
    pub initial_balance: Decimal,
    pub is_active: bool,
    /// Effective date of the opening movement; defaults to the creation instant
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
}

impl NewAccount {
    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "ownerId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Currency cannot be empty".to_string(),
            )));
        }
        if self.initial_balance.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Initial balance cannot be negative, got {}",
                self.initial_balance
            ))));
        }
        Ok(())
    }
}

/// Input model for updating an existing account.
///
/// Currency and initial balance are fixed at creation: changing them would
/// make the account disagree with its own ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: Option<String>,
    pub name: String,
    pub kind: AccountKind,
    pub is_active: bool,
}

impl AccountUpdate {
    /// Validates the account update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account ID is required for updates".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}
