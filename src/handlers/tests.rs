//! Transfer scenarios against in-memory stores.

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use uuid::Uuid;

    use crate::conversion::{CurrencyConverter, PassThroughConverter};
    use crate::domain::{
        Account, CurrencyCode, OperationContext, TransactionStatus, TransferError,
    };
    use crate::handlers::{TransferCommand, TransferHandler};
    use crate::store::{AccountRegistry, TransactionLedger};

    struct Fixture {
        handler: TransferHandler,
        registry: Arc<AccountRegistry>,
        ledger: Arc<TransactionLedger>,
        a: Uuid,
        b: Uuid,
    }

    impl Fixture {
        fn new(a_balance: Decimal, b_balance: Decimal) -> Self {
            Self::with_converter(
                (a_balance, "GBP"),
                (b_balance, "GBP"),
                Arc::new(PassThroughConverter),
            )
        }

        fn with_converter(
            a: (Decimal, &str),
            b: (Decimal, &str),
            converter: Arc<dyn CurrencyConverter>,
        ) -> Self {
            let account_a = Account::open(Uuid::new_v4(), a.0, a.1).unwrap();
            let account_b = Account::open(Uuid::new_v4(), b.0, b.1).unwrap();
            let (a, b) = (account_a.id(), account_b.id());

            let registry = Arc::new(AccountRegistry::with_accounts([account_a, account_b]).unwrap());
            let ledger = Arc::new(TransactionLedger::new());
            let handler = TransferHandler::new(registry.clone(), ledger.clone(), converter);

            Self {
                handler,
                registry,
                ledger,
                a,
                b,
            }
        }

        fn transfer(
            &self,
            source: Uuid,
            target: Uuid,
            amount: Decimal,
            currency: &str,
        ) -> Result<crate::handlers::TransferResult, TransferError> {
            self.handler.execute(
                TransferCommand::new(source, target, amount, currency),
                &OperationContext::new(),
            )
        }

        fn balance(&self, id: Uuid) -> Decimal {
            self.registry.snapshot(id).unwrap().unwrap().balance()
        }

        fn successes(&self) -> usize {
            self.ledger.find_all().iter().filter(|t| t.is_successful()).count()
        }
    }

    /// Multiplies by a per-target-currency rate so source and target sides
    /// differ.
    struct RateTable;

    impl CurrencyConverter for RateTable {
        fn convert(&self, amount: Decimal, _from: CurrencyCode, to: CurrencyCode) -> Decimal {
            match to.as_str() {
                "USD" => amount * dec!(2),
                "EUR" => amount * dec!(3),
                _ => amount,
            }
        }
    }

    /// GBP to whole yen at 190, the way a rounding rate service answers.
    struct JpyRounding;

    impl CurrencyConverter for JpyRounding {
        fn convert(&self, amount: Decimal, _from: CurrencyCode, to: CurrencyCode) -> Decimal {
            if to.as_str() == "JPY" {
                (amount * dec!(190)).round_dp(0)
            } else {
                amount
            }
        }
    }

    /// Panics on its first call only.
    struct PanicsOnce(AtomicBool);

    impl CurrencyConverter for PanicsOnce {
        fn convert(&self, amount: Decimal, _from: CurrencyCode, _to: CurrencyCode) -> Decimal {
            if !self.0.swap(true, Ordering::SeqCst) {
                panic!("rate service unavailable");
            }
            amount
        }
    }

    // =========================================================================
    // Successful transfers
    // =========================================================================

    #[test]
    fn test_transfer_succeeds() {
        let f = Fixture::new(dec!(100), dec!(200));

        let result = f.transfer(f.a, f.b, dec!(50), "GBP").unwrap();

        assert_eq!(f.balance(f.a), dec!(50));
        assert_eq!(f.balance(f.b), dec!(250));
        assert_eq!(result.debited, dec!(50));
        assert_eq!(result.credited, dec!(50));

        let records = f.handler.find_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), result.transaction_id);
        assert_eq!(records[0].status(), TransactionStatus::Success);
        assert_eq!(records[0].currency().as_str(), "GBP");
    }

    #[test]
    fn test_transfer_of_entire_balance() {
        let f = Fixture::new(dec!(100), dec!(0));

        f.transfer(f.a, f.b, dec!(100), "GBP").unwrap();

        assert_eq!(f.balance(f.a), Decimal::ZERO);
        assert_eq!(f.balance(f.b), dec!(100));
    }

    #[test]
    fn test_lowercase_currency_is_recorded_canonical() {
        let f = Fixture::new(dec!(100), dec!(200));

        let result = f.transfer(f.a, f.b, dec!(10), "gbp").unwrap();

        let record = f.handler.find_by_id(result.transaction_id).unwrap();
        assert_eq!(record.currency().as_str(), "GBP");
    }

    #[test]
    fn test_each_side_converted_independently() {
        let f = Fixture::with_converter(
            (dec!(100), "USD"),
            (dec!(0), "EUR"),
            Arc::new(RateTable),
        );

        let result = f.transfer(f.a, f.b, dec!(10), "GBP").unwrap();

        assert_eq!(result.debited, dec!(20));
        assert_eq!(result.credited, dec!(30));
        assert_eq!(f.balance(f.a), dec!(80));
        assert_eq!(f.balance(f.b), dec!(30));
    }

    #[test]
    fn test_solvency_checked_against_converted_amount() {
        // 40 GBP converts to 80 USD, which the 50 USD balance cannot cover.
        let f = Fixture::with_converter(
            (dec!(50), "USD"),
            (dec!(0), "GBP"),
            Arc::new(RateTable),
        );

        let err = f.transfer(f.a, f.b, dec!(40), "GBP").unwrap_err();

        assert_eq!(err, TransferError::insufficient_balance());
        assert_eq!(f.balance(f.a), dec!(50));
        assert_eq!(f.balance(f.b), dec!(0));
    }

    // =========================================================================
    // Validation failures (no ledger record)
    // =========================================================================

    #[test]
    fn test_zero_amount_rejected_without_record() {
        let f = Fixture::new(dec!(100), dec!(200));

        let err = f.transfer(f.a, f.b, dec!(0), "GBP").unwrap_err();

        assert!(matches!(err, TransferError::InvalidAmount(ref msg) if msg.contains("0")));
        assert!(f.ledger.is_empty());
        assert_eq!(f.balance(f.a), dec!(100));
        assert_eq!(f.balance(f.b), dec!(200));
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let f = Fixture::new(dec!(100), dec!(200));

        for amount in [dec!(-0.01), dec!(-10), dec!(-1000000), Decimal::ZERO] {
            let err = f.transfer(f.a, f.b, amount, "GBP").unwrap_err();
            assert_eq!(err, TransferError::invalid_amount(amount));
        }

        assert!(f.ledger.is_empty());
        assert_eq!(f.successes(), 0);
        assert_eq!(f.balance(f.a), dec!(100));
    }

    #[test]
    fn test_invalid_currency_rejected_without_record() {
        let f = Fixture::new(dec!(100), dec!(200));

        for code in ["EU", "", "GBPP", "XYZ", "123", "g b"] {
            let err = f.transfer(f.a, f.b, dec!(50), code).unwrap_err();
            assert_eq!(err, TransferError::invalid_currency(code));
        }

        let err = f.transfer(f.a, f.b, dec!(50), "EU").unwrap_err();
        assert_eq!(err.to_string(), "Transaction currency (EU) is invalid");
        assert!(f.ledger.is_empty());
    }

    // =========================================================================
    // Lookup and business-rule failures (Fail record kept)
    // =========================================================================

    #[test]
    fn test_unknown_source_account() {
        let f = Fixture::new(dec!(100), dec!(200));

        let err = f.transfer(Uuid::new_v4(), f.b, dec!(50), "GBP").unwrap_err();

        assert_eq!(err, TransferError::AccountNotFound("source account not found".into()));
        let records = f.handler.find_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status(), TransactionStatus::Fail);
        assert_eq!(f.balance(f.b), dec!(200));
    }

    #[test]
    fn test_unknown_target_account() {
        let f = Fixture::new(dec!(100), dec!(200));

        let err = f.transfer(f.a, Uuid::new_v4(), dec!(50), "GBP").unwrap_err();

        assert_eq!(err, TransferError::AccountNotFound("target account not found".into()));
        assert_eq!(f.ledger.len(), 1);
        assert_eq!(f.balance(f.a), dec!(100));
    }

    #[test]
    fn test_both_accounts_unknown_reports_source() {
        let f = Fixture::new(dec!(100), dec!(200));

        let err = f.transfer(Uuid::new_v4(), Uuid::new_v4(), dec!(50), "GBP").unwrap_err();
        assert_eq!(err, TransferError::source_not_found());
    }

    #[test]
    fn test_same_account_rejected() {
        let f = Fixture::new(dec!(100), dec!(200));

        let err = f.transfer(f.a, f.a, dec!(50), "GBP").unwrap_err();

        assert_eq!(
            err,
            TransferError::SameAccount("source and target accounts are same".into())
        );
        assert_eq!(f.balance(f.a), dec!(100));
        assert_eq!(f.ledger.len(), 1);
        assert_eq!(f.successes(), 0);
    }

    #[test]
    fn test_same_unknown_account_reports_not_found() {
        let f = Fixture::new(dec!(100), dec!(200));
        let ghost = Uuid::new_v4();

        let err = f.transfer(ghost, ghost, dec!(50), "GBP").unwrap_err();
        assert_eq!(err, TransferError::source_not_found());
    }

    #[test]
    fn test_insufficient_balance() {
        let f = Fixture::new(dec!(100), dec!(200));

        let err = f.transfer(f.a, f.b, dec!(500), "GBP").unwrap_err();

        assert_eq!(
            err,
            TransferError::InsufficientBalance("insufficient balance in source account".into())
        );
        assert_eq!(f.balance(f.a), dec!(100));
        assert_eq!(f.balance(f.b), dec!(200));
        assert_eq!(f.handler.find_all()[0].status(), TransactionStatus::Fail);
    }

    #[test]
    fn test_every_attempt_leaves_one_record() {
        let f = Fixture::new(dec!(100), dec!(200));

        f.transfer(f.a, f.b, dec!(50), "GBP").unwrap();
        f.transfer(f.a, f.b, dec!(500), "GBP").unwrap_err();
        f.transfer(f.a, f.a, dec!(1), "GBP").unwrap_err();
        f.transfer(f.a, f.b, dec!(0), "GBP").unwrap_err();
        f.transfer(f.a, f.b, dec!(1), "EU").unwrap_err();

        assert_eq!(f.ledger.len(), 3);
        assert_eq!(f.successes(), 1);
    }

    // =========================================================================
    // Internal faults
    // =========================================================================

    #[test]
    fn test_credit_rounded_to_zero_succeeds() {
        let f = Fixture::with_converter(
            (dec!(100), "GBP"),
            (dec!(0), "JPY"),
            Arc::new(JpyRounding),
        );

        let result = f.transfer(f.a, f.b, dec!(0.001), "GBP").unwrap();

        assert_eq!(result.debited, dec!(0.001));
        assert_eq!(result.credited, Decimal::ZERO);
        assert_eq!(f.balance(f.a), dec!(99.999));
        assert_eq!(f.balance(f.b), dec!(0));
        assert_eq!(f.successes(), 1);
    }

    #[test]
    fn test_gateway_panic_leaves_accounts_usable() {
        let f = Fixture::with_converter(
            (dec!(100), "GBP"),
            (dec!(0), "GBP"),
            Arc::new(PanicsOnce(AtomicBool::new(false))),
        );

        let attempt = catch_unwind(AssertUnwindSafe(|| f.transfer(f.a, f.b, dec!(10), "GBP")));
        assert!(attempt.is_err());
        assert_eq!(f.balance(f.a), dec!(100));
        assert_eq!(f.balance(f.b), dec!(0));

        f.transfer(f.a, f.b, dec!(10), "GBP").unwrap();
        assert_eq!(f.balance(f.a), dec!(90));
        assert_eq!(f.balance(f.b), dec!(10));
        assert_eq!(f.successes(), 1);
        assert_eq!(f.ledger.len(), 2);
    }

    #[test]
    fn test_credit_overflow_rolls_back_debit() {
        let f = Fixture::new(dec!(100), Decimal::MAX);

        let err = f.transfer(f.a, f.b, dec!(10), "GBP").unwrap_err();

        assert!(matches!(err, TransferError::Unexpected(_)));
        assert_eq!(f.balance(f.a), dec!(100));
        assert_eq!(f.balance(f.b), Decimal::MAX);
    }

    // =========================================================================
    // Logging
    // =========================================================================

    /// Records the fields of every `transfer` span as `name=value`.
    struct TransferSpanFields(Arc<Mutex<Vec<String>>>);

    struct FieldVisitor<'a>(&'a mut Vec<String>);

    impl Visit for FieldVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.push(format!("{}={:?}", field.name(), value));
        }
    }

    impl<S: Subscriber> Layer<S> for TransferSpanFields {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            if attrs.metadata().name() == "transfer" {
                attrs.record(&mut FieldVisitor(&mut self.0.lock().unwrap()));
            }
        }
    }

    #[test]
    fn test_transfer_span_carries_caller_context() {
        let f = Fixture::new(dec!(100), dec!(0));
        let correlation_id = Uuid::new_v4();
        let context = OperationContext::new()
            .with_correlation_id(correlation_id)
            .with_client_ip("10.0.0.7".parse().unwrap());

        let fields = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(TransferSpanFields(fields.clone()));
        tracing::subscriber::with_default(subscriber, || {
            f.handler
                .execute(TransferCommand::new(f.a, f.b, dec!(10), "GBP"), &context)
                .unwrap();
        });

        let fields = fields.lock().unwrap();
        assert!(fields.contains(&format!("correlation_id=Some({})", correlation_id)));
        assert!(fields.contains(&"client_ip=Some(10.0.0.7)".to_string()));
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[test]
    fn test_concurrent_overdraft_never_succeeds_twice() {
        for _ in 0..20 {
            let fixture = Fixture::new(dec!(100), dec!(0));
            let f = &fixture;

            let outcomes: Vec<_> = std::thread::scope(|s| {
                let handles: Vec<_> = (0..2)
                    .map(|_| s.spawn(move || f.transfer(f.a, f.b, dec!(60), "GBP")))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
            assert_eq!(succeeded, 1);
            assert_eq!(f.balance(f.a), dec!(40));
            assert_eq!(f.balance(f.b), dec!(60));
            assert_eq!(f.ledger.len(), 2);
        }
    }

    #[test]
    fn test_concurrent_opposite_transfers_conserve_money() {
        let f = Fixture::new(dec!(1000), dec!(1000));

        std::thread::scope(|s| {
            for i in 0..8 {
                let f = &f;
                s.spawn(move || {
                    let (from, to) = if i % 2 == 0 { (f.a, f.b) } else { (f.b, f.a) };
                    for _ in 0..100 {
                        let _ = f.transfer(from, to, dec!(3), "GBP");
                    }
                });
            }
        });

        assert!(f.balance(f.a) >= Decimal::ZERO);
        assert!(f.balance(f.b) >= Decimal::ZERO);
        assert_eq!(f.balance(f.a) + f.balance(f.b), dec!(2000));
        assert_eq!(f.ledger.len(), 800);
    }
}
