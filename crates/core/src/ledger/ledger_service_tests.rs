#[cfg(test)]
mod tests {
    use crate::accounts::AccountRepositoryTrait;
    use crate::errors::Error;
    use crate::events::DomainEvent;
    use crate::ledger::{LedgerError, LedgerServiceTrait, MovementKind, MovementType};
    use crate::settings::LedgerSettings;
    use crate::test_support::{account, instant, plan, LedgerFixture};
    use crate::trades::TradeResult;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn opened(initial: Decimal) -> LedgerFixture {
        opened_with(LedgerSettings::default(), initial).await
    }

    async fn opened_with(settings: LedgerSettings, initial: Decimal) -> LedgerFixture {
        let fx = LedgerFixture::new(settings);
        let acct = account("acc-1", initial);
        fx.accounts.add(acct.clone());
        fx.ledger
            .open_account_ledger(&acct, instant(2025, 1, 1, 9))
            .await
            .unwrap();
        fx
    }

    fn trade(id: &str, net: Decimal, day: u32) -> TradeResult {
        TradeResult {
            id: id.to_string(),
            account_id: "acc-1".to_string(),
            plan_id: None,
            closed_at: instant(2025, 1, day, 16),
            net_result: net,
            sequence: day as i64,
        }
    }

    #[tokio::test]
    async fn test_open_books_initial_balance_once() {
        let fx = opened(dec!(10000)).await;
        let movements = fx.ledger.get_movements("acc-1").unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type(), MovementType::InitialBalance);
        assert_eq!(movements[0].amount(), dec!(10000));
        assert_eq!(movements[0].sequence, 1);

        let acct = fx.accounts.get_by_id("acc-1").unwrap();
        let again = fx
            .ledger
            .open_account_ledger(&acct, instant(2025, 1, 2, 9))
            .await;
        assert!(matches!(again, Err(Error::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_deposit_then_losing_trade() {
        let fx = opened(dec!(10000)).await;
        fx.ledger
            .deposit("acc-1", dec!(2000), instant(2025, 1, 6, 10), None)
            .await
            .unwrap();
        fx.ledger
            .record_trade_result(&trade("t1", dec!(-500), 7))
            .await
            .unwrap();

        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(11500));
        let series = fx.ledger.get_balance_series("acc-1").unwrap();
        let balances: Vec<Decimal> = series.rows.iter().map(|r| r.balance_after).collect();
        assert_eq!(balances, vec![dec!(10000), dec!(12000), dec!(11500)]);
    }

    #[tokio::test]
    async fn test_every_append_emits_an_event() {
        let fx = opened(dec!(1000)).await;
        let deposit = fx
            .ledger
            .deposit("acc-1", dec!(50), instant(2025, 1, 2, 10), Some("top up".to_string()))
            .await
            .unwrap();
        assert_eq!(deposit.description.as_deref(), Some("top up"));

        let events = fx.events.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            DomainEvent::movements_appended("acc-1".to_string(), vec![deposit.id.clone()])
        );
    }

    #[tokio::test]
    async fn test_overdrawing_withdrawal_appends_nothing() {
        let fx = opened(dec!(1000)).await;
        let err = fx
            .ledger
            .withdraw("acc-1", dec!(1500), instant(2025, 1, 3, 10), None)
            .await
            .unwrap_err();
        match err {
            Error::Ledger(LedgerError::InsufficientBalance { resulting, .. }) => {
                assert_eq!(resulting, dec!(-500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fx.movements.all().len(), 1);
        assert_eq!(fx.events.len(), 1);

        fx.ledger
            .withdraw("acc-1", dec!(1000), instant(2025, 1, 3, 11), None)
            .await
            .unwrap();
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_backdated_withdrawal_cannot_overdraw_before_later_deposits() {
        let fx = opened(dec!(100)).await;
        fx.ledger
            .deposit("acc-1", dec!(1000), instant(2025, 1, 10, 10), None)
            .await
            .unwrap();

        let err = fx
            .ledger
            .withdraw("acc-1", dec!(500), instant(2025, 1, 2, 10), None)
            .await
            .unwrap_err();
        match err {
            Error::Ledger(LedgerError::InsufficientBalance { resulting, .. }) => {
                assert_eq!(resulting, dec!(-400));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fx.movements.all().len(), 2);

        // Dated after the deposit it fits
        fx.ledger
            .withdraw("acc-1", dec!(500), instant(2025, 1, 11, 10), None)
            .await
            .unwrap();
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(600));
    }

    #[tokio::test]
    async fn test_backdated_withdrawal_checks_every_later_balance() {
        let fx = opened(dec!(1000)).await;
        fx.ledger
            .withdraw("acc-1", dec!(800), instant(2025, 1, 10, 10), None)
            .await
            .unwrap();

        // Fine on its own date, but the later withdrawal would then overdraw
        let result = fx
            .ledger
            .withdraw("acc-1", dec!(300), instant(2025, 1, 5, 10), None)
            .await;
        assert!(matches!(
            result,
            Err(Error::Ledger(LedgerError::InsufficientBalance { resulting, .. })) if resulting == dec!(-100)
        ));
    }

    #[tokio::test]
    async fn test_negative_balance_allowed_by_settings() {
        let settings = LedgerSettings {
            allow_negative_balance: true,
            ..Default::default()
        };
        let fx = opened_with(settings, dec!(100)).await;
        let withdrawal = fx
            .ledger
            .withdraw("acc-1", dec!(250), instant(2025, 1, 3, 10), None)
            .await
            .unwrap();
        assert_eq!(withdrawal.amount(), dec!(-250));
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(-150));
    }

    #[tokio::test]
    async fn test_non_positive_magnitudes_are_rejected() {
        let fx = opened(dec!(1000)).await;
        let zero_deposit = fx
            .ledger
            .deposit("acc-1", Decimal::ZERO, instant(2025, 1, 2, 10), None)
            .await;
        assert!(matches!(
            zero_deposit,
            Err(Error::Ledger(LedgerError::InvalidAmount { .. }))
        ));
        let negative_withdrawal = fx
            .ledger
            .withdraw("acc-1", dec!(-10), instant(2025, 1, 2, 10), None)
            .await;
        assert!(negative_withdrawal.is_err());
        let zero_adjustment = fx
            .ledger
            .adjust("acc-1", Decimal::ZERO, instant(2025, 1, 2, 10), "noop".to_string())
            .await;
        assert!(zero_adjustment.is_err());
        assert_eq!(fx.movements.all().len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_account_rejects_writes() {
        let fx = opened(dec!(1000)).await;
        let mut acct = fx.accounts.get_by_id("acc-1").unwrap();
        acct.is_active = false;
        fx.accounts.replace(acct);

        let result = fx
            .ledger
            .deposit("acc-1", dec!(10), instant(2025, 1, 2, 10), None)
            .await;
        assert!(matches!(
            result,
            Err(Error::Ledger(LedgerError::AccountInactive(ref id))) if id == "acc-1"
        ));
        // reads still work
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(1000));
    }

    #[tokio::test]
    async fn test_trade_result_is_booked_once() {
        let fx = opened(dec!(1000)).await;
        let t = trade("t1", dec!(120), 4);
        fx.ledger.record_trade_result(&t).await.unwrap();
        let second = fx.ledger.record_trade_result(&t).await;
        assert!(matches!(
            second,
            Err(Error::Ledger(LedgerError::DuplicateTradeResult(ref id))) if id == "t1"
        ));
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(1120));
    }

    #[tokio::test]
    async fn test_trade_without_id_is_not_booked() {
        let fx = opened(dec!(1000)).await;
        let result = fx.ledger.record_trade_result(&trade(" ", dec!(10), 4)).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(fx.movements.all().len(), 1);
    }

    #[tokio::test]
    async fn test_break_even_trade_is_booked() {
        let fx = opened(dec!(1000)).await;
        let movement = fx
            .ledger
            .record_trade_result(&trade("t0", Decimal::ZERO, 4))
            .await
            .unwrap();
        assert_eq!(movement.trade_id(), Some("t0"));
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(1000));
    }

    #[tokio::test]
    async fn test_compensating_a_deleted_trade() {
        let fx = opened(dec!(1000)).await;
        fx.ledger
            .record_trade_result(&trade("t1", dec!(-300), 4))
            .await
            .unwrap();

        let compensation = fx
            .ledger
            .compensate_trade("acc-1", "t1", instant(2025, 1, 9, 9), "trade deleted".to_string())
            .await
            .unwrap()
            .expect("compensation appended");
        assert_eq!(
            compensation.kind,
            MovementKind::Adjustment {
                amount: dec!(300),
                trade_id: Some("t1".to_string()),
            }
        );
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(1000));

        let again = fx
            .ledger
            .compensate_trade("acc-1", "t1", instant(2025, 1, 9, 10), "again".to_string())
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(fx.movements.all().len(), 3);
    }

    #[tokio::test]
    async fn test_balance_reads_go_through_the_cache() {
        let fx = opened(dec!(1000)).await;
        let calls_before = fx.movements.list_calls();
        fx.ledger.get_current_balance("acc-1").unwrap();
        fx.ledger.get_current_balance("acc-1").unwrap();
        fx.ledger.get_balance_series("acc-1").unwrap();
        assert_eq!(fx.movements.list_calls(), calls_before + 1);

        fx.ledger
            .deposit("acc-1", dec!(5), instant(2025, 1, 2, 10), None)
            .await
            .unwrap();
        assert_eq!(fx.ledger.get_current_balance("acc-1").unwrap(), dec!(1005));
    }

    #[tokio::test]
    async fn test_balance_at_and_period_pnl() {
        let fx = opened(dec!(1000)).await;
        fx.ledger
            .record_trade_result(&trade("t1", dec!(200), 5))
            .await
            .unwrap();
        fx.ledger
            .deposit("acc-1", dec!(500), instant(2025, 1, 6, 10), None)
            .await
            .unwrap();
        fx.ledger
            .record_trade_result(&trade("t2", dec!(-50), 8))
            .await
            .unwrap();

        assert_eq!(
            fx.ledger.get_balance_at("acc-1", instant(2025, 1, 7, 0)).unwrap(),
            dec!(1700)
        );
        assert_eq!(
            fx.ledger
                .get_period_pnl("acc-1", instant(2025, 1, 1, 0), instant(2025, 2, 1, 0))
                .unwrap(),
            dec!(150)
        );
    }

    #[tokio::test]
    async fn test_period_pnl_reads_through_the_cache() {
        let fx = opened(dec!(1000)).await;
        fx.ledger
            .record_trade_result(&trade("t1", dec!(75), 5))
            .await
            .unwrap();
        let calls_before = fx.movements.list_calls();
        let from = instant(2025, 1, 1, 0);
        let to = instant(2025, 2, 1, 0);
        assert_eq!(fx.ledger.get_period_pnl("acc-1", from, to).unwrap(), dec!(75));
        assert_eq!(fx.ledger.get_period_pnl("acc-1", from, to).unwrap(), dec!(75));
        fx.ledger.get_current_balance("acc-1").unwrap();
        assert_eq!(fx.movements.list_calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn test_available_capital_excludes_edited_plan() {
        let fx = opened(dec!(10000)).await;
        fx.plans.add(plan("p1", "acc-1", dec!(6000)));
        fx.plans.add(plan("p2", "acc-1", dec!(1000)));
        let mut inactive = plan("p3", "acc-1", dec!(5000));
        inactive.is_active = false;
        fx.plans.add(inactive);

        assert_eq!(
            fx.ledger.get_available_capital("acc-1", None).unwrap(),
            dec!(3000)
        );
        assert_eq!(
            fx.ledger.get_available_capital("acc-1", Some("p1")).unwrap(),
            dec!(9000)
        );
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let fx = LedgerFixture::new(LedgerSettings::default());
        assert!(matches!(
            fx.ledger.get_current_balance("missing"),
            Err(Error::Database(_))
        ));
    }
}
