//! Movement domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ledger_errors::LedgerError;
use crate::utils::Chronological;

/// Opening balance booked when an account is created.
pub const MOVEMENT_TYPE_INITIAL_BALANCE: &str = "INITIAL_BALANCE";

/// Money added by the owner. Stored positive.
pub const MOVEMENT_TYPE_DEPOSIT: &str = "DEPOSIT";

/// Money taken out by the owner. Stored negative.
pub const MOVEMENT_TYPE_WITHDRAWAL: &str = "WITHDRAWAL";

/// Net result of a finalized trade. Either sign; zero is a break-even.
pub const MOVEMENT_TYPE_TRADE_RESULT: &str = "TRADE_RESULT";

/// Correction appended instead of editing history. Either sign, never zero.
pub const MOVEMENT_TYPE_ADJUSTMENT: &str = "ADJUSTMENT";

/// The closed set of movement types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    InitialBalance,
    Deposit,
    Withdrawal,
    TradeResult,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::InitialBalance => MOVEMENT_TYPE_INITIAL_BALANCE,
            MovementType::Deposit => MOVEMENT_TYPE_DEPOSIT,
            MovementType::Withdrawal => MOVEMENT_TYPE_WITHDRAWAL,
            MovementType::TradeResult => MOVEMENT_TYPE_TRADE_RESULT,
            MovementType::Adjustment => MOVEMENT_TYPE_ADJUSTMENT,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MOVEMENT_TYPE_INITIAL_BALANCE => Ok(MovementType::InitialBalance),
            MOVEMENT_TYPE_DEPOSIT => Ok(MovementType::Deposit),
            MOVEMENT_TYPE_WITHDRAWAL => Ok(MovementType::Withdrawal),
            MOVEMENT_TYPE_TRADE_RESULT => Ok(MovementType::TradeResult),
            MOVEMENT_TYPE_ADJUSTMENT => Ok(MovementType::Adjustment),
            other => Err(LedgerError::UnknownMovementType(other.to_string())),
        }
    }
}

/// Type-specific payload of a movement.
///
/// Amounts are stored signed: the sign is the effect on the balance.
/// [`MovementKind::check_sign`] enforces the per-type rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum MovementKind {
    InitialBalance {
        amount: Decimal,
    },
    Deposit {
        amount: Decimal,
    },
    Withdrawal {
        amount: Decimal,
    },
    TradeResult {
        trade_id: String,
        amount: Decimal,
    },
    Adjustment {
        amount: Decimal,
        /// Set when the adjustment compensates a trade's booked result
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trade_id: Option<String>,
    },
}

impl MovementKind {
    /// Signed effect on the balance.
    pub fn amount(&self) -> Decimal {
        match self {
            MovementKind::InitialBalance { amount }
            | MovementKind::Deposit { amount }
            | MovementKind::Withdrawal { amount }
            | MovementKind::TradeResult { amount, .. }
            | MovementKind::Adjustment { amount, .. } => *amount,
        }
    }

    pub fn movement_type(&self) -> MovementType {
        match self {
            MovementKind::InitialBalance { .. } => MovementType::InitialBalance,
            MovementKind::Deposit { .. } => MovementType::Deposit,
            MovementKind::Withdrawal { .. } => MovementType::Withdrawal,
            MovementKind::TradeResult { .. } => MovementType::TradeResult,
            MovementKind::Adjustment { .. } => MovementType::Adjustment,
        }
    }

    /// The trade this movement books or compensates, if any.
    pub fn trade_id(&self) -> Option<&str> {
        match self {
            MovementKind::TradeResult { trade_id, .. } => Some(trade_id.as_str()),
            MovementKind::Adjustment { trade_id, .. } => trade_id.as_deref(),
            _ => None,
        }
    }

    /// Checks the amount against the sign convention of its type.
    pub fn check_sign(&self) -> Result<(), LedgerError> {
        let amount = self.amount();
        let violation = match self {
            MovementKind::InitialBalance { .. } if amount < Decimal::ZERO => {
                Some("opening balance cannot be negative")
            }
            MovementKind::Deposit { .. } if amount <= Decimal::ZERO => {
                Some("deposits are stored as positive amounts")
            }
            MovementKind::Withdrawal { .. } if amount >= Decimal::ZERO => {
                Some("withdrawals are stored as negative amounts")
            }
            MovementKind::Adjustment { .. } if amount.is_zero() => {
                Some("an adjustment must change the balance")
            }
            MovementKind::TradeResult { trade_id, .. } if trade_id.trim().is_empty() => {
                Some("a trade result must reference its trade")
            }
            _ => None,
        };

        match violation {
            Some(reason) => Err(LedgerError::InvalidAmount {
                movement_type: self.movement_type().to_string(),
                amount,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// An immutable, validated money event on one account's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub account_id: String,
    /// Monotonic insertion counter assigned by the record store
    pub sequence: i64,
    pub effective_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: MovementKind,
}

impl Movement {
    pub fn amount(&self) -> Decimal {
        self.kind.amount()
    }

    pub fn movement_type(&self) -> MovementType {
        self.kind.movement_type()
    }

    pub fn trade_id(&self) -> Option<&str> {
        self.kind.trade_id()
    }

    /// Flattens back into the persisted shape, attaching a derived balance if given.
    pub fn to_record(&self, balance_after: Option<Decimal>) -> MovementRecord {
        MovementRecord {
            id: self.id.clone(),
            account_id: self.account_id.clone(),
            movement_type: self.movement_type().to_string(),
            amount: Some(self.amount()),
            effective_date: Some(self.effective_date),
            trade_id: self.trade_id().map(str::to_string),
            description: self.description.clone(),
            insertion_sequence: self.sequence,
            balance_after,
        }
    }
}

impl Chronological for Movement {
    fn instant(&self) -> DateTime<Utc> {
        self.effective_date
    }

    fn sequence(&self) -> i64 {
        self.sequence
    }
}

/// Flat shape of a movement as kept by the external record store.
///
/// Fields are optional here because the store may hand back incomplete
/// records; converting to [`Movement`] rejects them instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    pub id: String,
    pub account_id: String,
    #[serde(rename = "type")]
    pub movement_type: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub effective_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub insertion_sequence: i64,
    /// Derived cache of the running balance; ignored when reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<Decimal>,
}

impl TryFrom<MovementRecord> for Movement {
    type Error = LedgerError;

    fn try_from(record: MovementRecord) -> Result<Self, Self::Error> {
        let malformed = |reason: &str| LedgerError::MalformedMovement {
            movement_id: record.id.clone(),
            reason: reason.to_string(),
        };

        if record.account_id.trim().is_empty() {
            return Err(malformed("missing account id"));
        }
        let movement_type = MovementType::from_str(&record.movement_type)?;
        let amount = record.amount.ok_or_else(|| malformed("missing amount"))?;
        let effective_date = record
            .effective_date
            .ok_or_else(|| malformed("missing effective date"))?;

        let kind = match movement_type {
            MovementType::InitialBalance => MovementKind::InitialBalance { amount },
            MovementType::Deposit => MovementKind::Deposit { amount },
            MovementType::Withdrawal => MovementKind::Withdrawal { amount },
            MovementType::TradeResult => MovementKind::TradeResult {
                trade_id: record
                    .trade_id
                    .clone()
                    .ok_or_else(|| malformed("trade result without trade id"))?,
                amount,
            },
            MovementType::Adjustment => MovementKind::Adjustment {
                amount,
                trade_id: record.trade_id.clone(),
            },
        };
        kind.check_sign()?;

        Ok(Movement {
            id: record.id,
            account_id: record.account_id,
            sequence: record.insertion_sequence,
            effective_date,
            description: record.description,
            kind,
        })
    }
}

/// Input for appending one movement.
///
/// Build it with the constructors: callers pass deposit and withdrawal
/// amounts as positive magnitudes and the constructor applies the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    pub effective_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: MovementKind,
}

impl NewMovement {
    fn with_kind(account_id: &str, effective_date: DateTime<Utc>, kind: MovementKind) -> Self {
        Self {
            id: None,
            account_id: account_id.to_string(),
            effective_date,
            description: None,
            kind,
        }
    }

    pub fn initial_balance(account_id: &str, amount: Decimal, effective_date: DateTime<Utc>) -> Self {
        Self::with_kind(account_id, effective_date, MovementKind::InitialBalance { amount })
    }

    pub fn deposit(account_id: &str, magnitude: Decimal, effective_date: DateTime<Utc>) -> Self {
        Self::with_kind(account_id, effective_date, MovementKind::Deposit { amount: magnitude })
    }

    pub fn withdrawal(account_id: &str, magnitude: Decimal, effective_date: DateTime<Utc>) -> Self {
        Self::with_kind(
            account_id,
            effective_date,
            MovementKind::Withdrawal { amount: -magnitude },
        )
    }

    pub fn trade_result(
        account_id: &str,
        trade_id: &str,
        amount: Decimal,
        effective_date: DateTime<Utc>,
    ) -> Self {
        Self::with_kind(
            account_id,
            effective_date,
            MovementKind::TradeResult {
                trade_id: trade_id.to_string(),
                amount,
            },
        )
    }

    pub fn adjustment(
        account_id: &str,
        amount: Decimal,
        trade_id: Option<&str>,
        effective_date: DateTime<Utc>,
    ) -> Self {
        Self::with_kind(
            account_id,
            effective_date,
            MovementKind::Adjustment {
                amount,
                trade_id: trade_id.map(str::to_string),
            },
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(&self) -> Decimal {
        self.kind.amount()
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.account_id.trim().is_empty() {
            return Err(LedgerError::MalformedMovement {
                movement_id: self.id.clone().unwrap_or_default(),
                reason: "missing account id".to_string(),
            });
        }
        self.kind.check_sign()
    }
}
