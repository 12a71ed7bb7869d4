//! Plan compliance replay.
//!
//! Replays a scope's trades in chronological order against a goal and a stop,
//! marks the first threshold crossing, and classifies what the trader did
//! afterwards. The running balance starts at zero: it is the scope's P&L, not
//! the account balance.

use log::debug;
use rust_decimal::Decimal;

use super::compliance_errors::ComplianceError;
use super::compliance_model::{
    AuditEvent, AuditOutcome, AuditResult, AuditRow, AuditSummary, AuditThresholds,
};
use crate::trades::TradeResult;
use crate::utils::{non_negative, sort_chronologically, Chronological};
use crate::Result;

/// Replays `scoped_trades` against a stop and a goal, both positive magnitudes.
///
/// The trades must already be limited to the audited scope. An empty list
/// is valid and comes back `IN_PROGRESS`.
pub fn analyze(
    scoped_trades: &[TradeResult],
    stop_value: Decimal,
    goal_value: Decimal,
) -> Result<AuditResult> {
    analyze_with_limits(scoped_trades, &AuditThresholds::new(goal_value, stop_value))
}

/// Same replay as [`analyze`], also flagging losses larger than
/// `thresholds.trade_risk` when it is set.
pub fn analyze_with_limits(
    scoped_trades: &[TradeResult],
    thresholds: &AuditThresholds,
) -> Result<AuditResult> {
    thresholds.validate()?;

    let mut ordered = scoped_trades.to_vec();
    sort_chronologically(&mut ordered);
    // Equal keys would replay in caller order
    if let Some(pair) = ordered
        .windows(2)
        .find(|pair| pair[0].chronological_key() == pair[1].chronological_key())
    {
        return Err(ComplianceError::DuplicateTradeKey {
            first: pair[0].id.clone(),
            second: pair[1].id.clone(),
            sequence: pair[0].sequence,
        }
        .into());
    }

    let goal = thresholds.goal_value;
    let stop = thresholds.stop_value;

    let mut balance = Decimal::ZERO;
    let mut primary_event: Option<AuditEvent> = None;
    let mut balance_at_event: Option<Decimal> = None;
    let mut history = Vec::with_capacity(ordered.len());

    for trade in ordered {
        // Flags look at the event state before this row
        let after_goal = primary_event == Some(AuditEvent::GoalHit);
        let after_stop = primary_event == Some(AuditEvent::StopHit);

        balance = balance
            .checked_add(trade.net_result)
            .ok_or_else(|| ComplianceError::BalanceOverflow(trade.id.clone()))?;

        let event = match primary_event {
            Some(_) => None,
            None if balance >= goal => Some(AuditEvent::GoalHit),
            None if balance <= -stop => Some(AuditEvent::StopHit),
            None => None,
        };
        if event.is_some() {
            primary_event = event;
            balance_at_event = Some(balance);
        }

        let exceeds_trade_risk = thresholds
            .trade_risk
            .is_some_and(|limit| trade.is_loss() && -trade.net_result > limit);

        history.push(AuditRow {
            trade_id: trade.id,
            closed_at: trade.closed_at,
            result: trade.net_result,
            balance,
            event,
            after_goal,
            after_stop,
            exceeds_trade_risk,
        });
    }

    let opening_balance = history.first().map(|row| row.balance);
    let outcome = classify(
        primary_event,
        balance,
        balance_at_event,
        opening_balance,
        goal,
        stop,
    );
    let summary = summarize(&history);

    debug!(
        "Compliance replay of {} trades: final {}, event {:?}, outcome {}",
        history.len(),
        balance,
        primary_event,
        outcome.as_str()
    );

    Ok(AuditResult {
        goal_value: goal,
        stop_value: stop,
        trade_risk: thresholds.trade_risk,
        history,
        final_balance: balance,
        primary_event,
        balance_at_event,
        outcome,
        remaining_to_goal: non_negative(goal - balance),
        remaining_to_stop: non_negative(stop - balance.min(Decimal::ZERO).abs()),
        summary,
    })
}

fn classify(
    primary_event: Option<AuditEvent>,
    final_balance: Decimal,
    balance_at_event: Option<Decimal>,
    opening_balance: Option<Decimal>,
    goal: Decimal,
    stop: Decimal,
) -> AuditOutcome {
    match primary_event {
        None => AuditOutcome::InProgress,
        Some(AuditEvent::GoalHit) => {
            if final_balance <= -stop {
                AuditOutcome::GoalToStop
            } else if final_balance >= goal {
                if opening_balance.is_some_and(|b| b < Decimal::ZERO) {
                    AuditOutcome::LossToGoal
                } else {
                    AuditOutcome::GoalDisciplined
                }
            } else {
                AuditOutcome::GoalGaveBack
            }
        }
        Some(AuditEvent::StopHit) => {
            let at_stop = balance_at_event.unwrap_or(final_balance);
            if final_balance > Decimal::ZERO {
                AuditOutcome::StopRecovered
            } else if final_balance < at_stop {
                AuditOutcome::StopWorsened
            } else {
                AuditOutcome::StopDisciplined
            }
        }
    }
}

fn summarize(history: &[AuditRow]) -> AuditSummary {
    history.iter().fold(
        AuditSummary {
            trade_count: history.len(),
            ..Default::default()
        },
        |mut summary, row| {
            if row.result > Decimal::ZERO {
                summary.wins += 1;
            } else if row.result < Decimal::ZERO {
                summary.losses += 1;
            }
            if row.after_goal {
                summary.trades_after_goal += 1;
            }
            if row.after_stop {
                summary.trades_after_stop += 1;
            }
            if row.exceeds_trade_risk {
                summary.risk_breaches += 1;
            }
            summary
        },
    )
}
