//! Trade result model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};
use crate::utils::Chronological;
use crate::Result;

/// A finalized trade as the trading journal hands it over.
///
/// Fees and partial fills are already netted into `net_result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    pub id: String,
    pub account_id: String,
    /// Plan the trader tagged the trade with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub closed_at: DateTime<Utc>,
    pub net_result: Decimal,
    /// Insertion counter of the trade store; breaks ties on `closed_at`
    pub sequence: i64,
}

impl TradeResult {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        Ok(())
    }

    pub fn is_loss(&self) -> bool {
        self.net_result < Decimal::ZERO
    }
}

impl Chronological for TradeResult {
    fn instant(&self) -> DateTime<Utc> {
        self.closed_at
    }

    fn sequence(&self) -> i64 {
        self.sequence
    }
}
