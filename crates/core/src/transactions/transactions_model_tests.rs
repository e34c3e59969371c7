use super::*;
use crate::errors::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

#[test]
fn test_kind_parsing_is_case_insensitive() {
    assert_eq!(TransactionKind::from_str("BUY").unwrap(), TransactionKind::Buy);
    assert_eq!(
        TransactionKind::from_str(" Transfer_Out ").unwrap(),
        TransactionKind::TransferOut
    );
    assert_eq!(
        TransactionKind::from_str("demerger").unwrap(),
        TransactionKind::Demerger
    );
    assert!(matches!(
        TransactionKind::from_str("merger"),
        Err(ValidationError::UnknownTransactionKind(_))
    ));
}

#[test]
fn test_kind_round_trips_through_as_str() {
    let all = [
        TransactionKind::Buy,
        TransactionKind::Sell,
        TransactionKind::TransferIn,
        TransactionKind::TransferOut,
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::Dividend,
        TransactionKind::Bonus,
        TransactionKind::Split,
        TransactionKind::Demerger,
        TransactionKind::Resulting,
    ];
    for kind in all {
        assert_eq!(TransactionKind::from_str(kind.as_str()).unwrap(), kind);
    }
}

#[test]
fn test_kind_classification() {
    assert!(TransactionKind::Split.is_corporate_action());
    assert!(TransactionKind::Resulting.is_corporate_action());
    assert!(!TransactionKind::Buy.is_corporate_action());
    assert!(TransactionKind::Dividend.is_cash_only());
    assert!(!TransactionKind::TransferIn.is_cash_only());
    assert!(TransactionKind::TransferOut.is_disposal());
    assert!(!TransactionKind::Buy.is_disposal());
}

#[test]
fn test_transaction_deserializes_from_camel_case_json() {
    let json = r#"{
        "id": "t1",
        "accountId": "demat-1",
        "instrument": "ITC",
        "kind": "SPLIT",
        "date": "2025-05-05",
        "ratio": "2:1"
    }"#;
    let txn: Transaction = serde_json::from_str(json).unwrap();
    assert_eq!(txn.kind, TransactionKind::Split);
    assert_eq!(txn.date, NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
    assert_eq!(txn.quantity, Decimal::ZERO);
    assert_eq!(txn.fees, Decimal::ZERO);
    assert_eq!(txn.ratio.as_deref(), Some("2:1"));
    assert_eq!(txn.instrument_ref(), "ITC");
}

#[test]
fn test_unknown_kind_fails_deserialization() {
    let json = r#"{ "id": "t1", "accountId": "a", "kind": "gift", "date": "2025-01-01" }"#;
    assert!(serde_json::from_str::<Transaction>(json).is_err());
}

#[test]
fn test_kind_serializes_snake_case() {
    let value = serde_json::to_value(TransactionKind::TransferIn).unwrap();
    assert_eq!(value, serde_json::json!("transfer_in"));
}

#[test]
fn test_gross_amount_excludes_fees() {
    let txn = Transaction::new(
        "t1",
        "a",
        Some("TCS"),
        TransactionKind::Buy,
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        dec!(10),
        dec!(3500.5),
    )
    .with_fees(dec!(20));
    assert_eq!(txn.gross_amount().unwrap(), dec!(35005));
    assert_eq!(txn.fees, dec!(20));
}
