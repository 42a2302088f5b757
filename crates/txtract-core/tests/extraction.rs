//! End-to-end extraction behaviour.

use std::str::FromStr;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use txtract_core::{
    extract, CachedExtractor, DateOrder, ExtractionConfig, ExtractionError, Extractor, FieldKind,
    Missing, Penalty, SignSource, TransactionExtractor,
};

const STARBUCKS: &str = "Date: 11 Dec 2025\n\
                         Description: STARBUCKS COFFEE MUMBAI\n\
                         Amount: -420.00\n\
                         Balance after transaction: 18420.50";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn starbucks_with_continuous_balance() {
    let record = extract(STARBUCKS, Some(dec("18840.50"))).unwrap();

    assert_eq!(record.date.date, ymd(2025, 12, 11));
    assert_eq!(record.description, "STARBUCKS COFFEE MUMBAI");
    assert_eq!(record.amount.value, dec("-420.00"));
    assert_eq!(record.balance_after, Some(dec("18420.50")));
    assert!(record.confidence >= 0.85);
}

#[test]
fn starbucks_with_broken_balance() {
    let err = extract(STARBUCKS, Some(dec("19000.00"))).unwrap_err();
    assert!(err.is_advisory());

    let ExtractionError::BalanceMismatch { expected, actual, delta, .. } = &err else {
        panic!("expected a balance mismatch, got {err:?}");
    };
    assert_eq!(*expected, dec("18580.00"));
    assert_eq!(*actual, dec("18420.50"));
    assert_eq!(*delta, dec("159.50"));

    // The record is still available and unchanged
    assert_eq!(err.record().map(|r| r.amount.value), Some(dec("-420.00")));
}

#[test]
fn no_prior_balance_skips_continuity() {
    let record = extract(STARBUCKS, None).unwrap();
    assert_eq!(record.confidence, 1.0);
}

#[test]
fn missing_amount() {
    let text = "Date: 11 Dec 2025\n\
                Description: STARBUCKS COFFEE MUMBAI\n\
                Balance after transaction: 18420.50";
    assert_eq!(
        extract(text, None),
        Err(ExtractionError::MissingField(Missing::Field(FieldKind::Amount)))
    );
}

#[test]
fn missing_date_reported_first() {
    assert_eq!(
        extract("Description: TEA", None),
        Err(ExtractionError::MissingField(Missing::Field(FieldKind::Date)))
    );
}

#[test]
fn unparseable_amount() {
    let text = "Date: 11 Dec 2025\nDescription: STARBUCKS COFFEE MUMBAI\nAmount: abc";
    assert_eq!(
        extract(text, None),
        Err(ExtractionError::UnparseableAmount("abc".to_string()))
    );
}

#[test]
fn zero_amount_is_rejected() {
    let text = "Date: 2025-01-05\nDescription: REVERSAL\nAmount: 0.00";
    assert_eq!(
        extract(text, None),
        Err(ExtractionError::UnparseableAmount("0.00".to_string()))
    );
}

#[test]
fn numeric_dates() {
    let record = extract("Date: 03/04/2025\nDescription: RENT\nAmount: -900.00\nBalance: 100.00", None)
        .unwrap();
    assert_eq!(record.date.date, ymd(2025, 4, 3));
    assert!(record.date.ambiguous);
    assert_eq!(record.penalties, vec![Penalty::AmbiguousDate]);

    // The day/month order is unknown even when both read the same
    let record = extract("Date: 05/05/2025\nDescription: RENT\nAmount: -900.00\nBalance: 100.00", None)
        .unwrap();
    assert_eq!(record.date.date, ymd(2025, 5, 5));
    assert_eq!(record.penalties, vec![Penalty::AmbiguousDate]);
    assert_eq!(record.confidence, 0.85);

    assert_eq!(
        extract("Date: 25/13/2025\nDescription: RENT\nAmount: -900.00", None),
        Err(ExtractionError::UnparseableDate("25/13/2025".to_string()))
    );
}

#[test]
fn month_first_configuration() {
    let extractor = Extractor::new(ExtractionConfig::default().with_date_order(DateOrder::MonthFirst));
    let record = extractor
        .extract("Date: 03/04/2025\nDescription: RENT\nAmount: -900.00\nBalance: 100.00", None)
        .unwrap();
    assert_eq!(record.date.date, ymd(2025, 3, 4));
}

#[test]
fn narrative_statement_line() {
    let text = "11 Dec 2025 STARBUCKS COFFEE MUMBAI -420.00 18,420.50";
    let record = extract(text, Some(dec("18840.50"))).unwrap();

    assert_eq!(record.date.date, ymd(2025, 12, 11));
    assert_eq!(record.description, "STARBUCKS COFFEE MUMBAI");
    assert_eq!(record.amount.value, dec("-420.00"));
    assert_eq!(record.balance_after, Some(dec("18420.50")));
}

#[test]
fn marker_and_currency_decorations() {
    let text = "Txn Date: 2025-01-05\nNarration: AMAZON PAY\nAmount: ₹1,299.00 Dr\nClosing Balance: INR 8,701.00";
    let record = extract(text, Some(dec("10000.00"))).unwrap();

    assert_eq!(record.amount.value, dec("-1299.00"));
    assert_eq!(record.amount.sign, SignSource::Marker);
    assert_eq!(record.confidence, 1.0);
}

#[test]
fn markers_attached_to_the_figure() {
    let record = extract("05/01/2025 ATM WDL 500.00Dr 4,500.00", Some(dec("5000.00"))).unwrap();
    assert_eq!(record.description, "ATM WDL");
    assert_eq!(record.amount.value, dec("-500.00"));
    assert_eq!(record.amount.sign, SignSource::Marker);
    assert_eq!(record.balance_after, Some(dec("4500.00")));
    assert_eq!(record.confidence, 0.85);

    let record = extract("Date: 2025-01-05\nDescription: REFUND\nAmount: 1,299.00Cr", None).unwrap();
    assert_eq!(record.amount.value, dec("1299.00"));
    assert_eq!(record.amount.sign, SignSource::Marker);
}

#[test]
fn balance_arithmetic_overflow_is_reported() {
    let text = "Date: 2025-01-05\nDescription: TEA\nAmount: +5.00\nBalance: 95.00";
    let err = extract(text, Some(Decimal::MAX)).unwrap_err();
    assert_eq!(err.kind(), "unparseableAmount");
}

#[test]
fn low_confidence_rejected() {
    // Inferred sign, no balance and an ambiguous date
    let err = extract("05/01/2025 CAFE 4.50", None).unwrap_err();
    assert_eq!(err, ExtractionError::LowConfidence { score: 0.45, threshold: 0.5 });
}

#[test]
fn canonical_round_trip() {
    let inputs = [
        STARBUCKS,
        "05/01/2025 CAFE MOCHA 4.50 95.50",
        "Value Date: 2024-02-29\nParticulars: SALARY FEB\nCredit: 85,000.00",
    ];

    for text in inputs {
        let record = extract(text, None).unwrap();
        let again = extract(&record.to_labeled_text(), None).unwrap();

        assert_eq!(again.date.date, record.date.date);
        assert_eq!(again.description, record.description);
        assert_eq!(again.amount.value, record.amount.value);
        assert_eq!(again.balance_after, record.balance_after);
        assert!(again.confidence >= record.confidence, "{text:?}");
    }
}

#[test]
fn extraction_is_idempotent() {
    let inputs = [STARBUCKS, "05/01/2025 CAFE 4.50", "", "Amount: abc"];
    for text in inputs {
        assert_eq!(extract(text, Some(dec("18840.50"))), extract(text, Some(dec("18840.50"))));
    }
}

#[test]
fn cached_agrees_with_uncached() {
    let plain = Extractor::default();
    let cached = CachedExtractor::new(Extractor::default());
    let inputs = [
        STARBUCKS,
        "11 Dec 2025 STARBUCKS COFFEE MUMBAI -420.00 18,420.50",
        "05/01/2025 ATM 10.00 20.00 30.00",
        "   ",
    ];

    for _ in 0..3 {
        for text in inputs {
            for prior in [
                None,
                Some(dec("18840.50")),
                Some(dec("19000.00")),
                Some(dec("19000.0")),
                Some(dec("19000.000")),
            ] {
                let (hit, fresh) = (cached.extract(text, prior), plain.extract(text, prior));
                assert_eq!(hit, fresh);
                assert_eq!(
                    hit.map_err(|e| e.to_string()),
                    fresh.map_err(|e| e.to_string())
                );
            }
        }
    }
}

#[test]
fn shared_across_threads() {
    let cached = CachedExtractor::new(Extractor::default());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let record = cached.extract(STARBUCKS, Some(dec("18840.50"))).unwrap();
                assert_eq!(record.amount.value, dec("-420.00"));
            });
        }
    });

    assert_eq!(cached.len(), 1);
}
