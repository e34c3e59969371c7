use super::*;
use crate::errors::{CalculatorError, Error};
use crate::portfolio::valuation::NoLivePrices;
use crate::settings::EngineSettings;
use crate::transactions::{Transaction, TransactionKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn txn(
    id: &str,
    account: &str,
    ticker: &str,
    kind: TransactionKind,
    date: NaiveDate,
    qty: Decimal,
    price: Decimal,
) -> Transaction {
    Transaction::new(id, account, Some(ticker), kind, date, qty, price)
}

fn deposit(id: &str, account: &str, date: NaiveDate, amount: Decimal) -> Transaction {
    Transaction::new(id, account, None, TransactionKind::Deposit, date, dec!(1), amount)
}

fn prices(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
    entries.iter().map(|(t, p)| (t.to_string(), *p)).collect()
}

fn account(id: &str) -> HoldingsScope {
    HoldingsScope::Account(id.to_string())
}

fn service() -> HoldingsService {
    HoldingsService::new(EngineSettings::default()).with_instruments(vec![
        Instrument::new("INFY", "Infosys"),
        Instrument::new("TCS", "Tata Consultancy Services"),
    ])
}

fn assert_close(actual: Option<Decimal>, expected: Decimal) {
    let actual = actual.expect("xirr should be computable");
    assert!(
        (actual - expected).abs() < dec!(0.0001),
        "expected ~{}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_single_holding_view_and_summary() {
    let txns = vec![
        deposit("dep", "acc-1", d(2023, 1, 1), dec!(5000)),
        txn("b1", "acc-1", "TCS", TransactionKind::Buy, d(2023, 1, 1), dec!(10), dec!(100)),
    ];
    let view = service()
        .get_holdings(&txns, &prices(&[("TCS", dec!(120))]), &account("acc-1"), d(2024, 1, 1))
        .unwrap();

    assert_eq!(view.holdings.len(), 1);
    let h = &view.holdings[0];
    assert_eq!(h.ticker, "TCS");
    assert_eq!(h.name, "Tata Consultancy Services");
    assert_eq!(h.account_id.as_deref(), Some("acc-1"));
    assert_eq!(h.quantity, dec!(10));
    assert_eq!(h.avg_price, dec!(100));
    assert_eq!(h.live_price, dec!(120));
    assert_eq!(h.current_value, dec!(1200));
    assert_eq!(h.pnl, dec!(200));
    assert_eq!(h.pnl_percent, dec!(20));
    assert!(!h.price_missing);
    assert_close(h.xirr, dec!(0.2));

    let s = &view.summary;
    assert_eq!(s.cash, dec!(4000));
    assert_eq!(s.invested_value, dec!(5000));
    assert_eq!(s.positions_current_value, dec!(1200));
    assert_eq!(s.positions_purchase_cost, dec!(1000));
    assert_eq!(s.current_portfolio_value, dec!(5200));
    assert_eq!(s.total_profit_loss, dec!(200));
    assert_close(s.xirr, dec!(0.2));
    assert_eq!(h.weight, dec!(23.076923));
}

#[test]
fn test_missing_price_is_not_fatal() {
    let txns = vec![txn("b1", "acc-1", "TCS", TransactionKind::Buy, d(2023, 1, 1), dec!(10), dec!(100))];
    let view = service()
        .get_holdings(&txns, &NoLivePrices, &account("acc-1"), d(2024, 1, 1))
        .unwrap();
    let h = &view.holdings[0];
    assert!(h.price_missing);
    assert_eq!(h.current_value, dec!(1000));
    assert_eq!(h.pnl, Decimal::ZERO);
    // Marked at cost, so no gain over the year.
    assert_close(h.xirr, Decimal::ZERO);
}

#[test]
fn test_holdings_sorted_by_name_then_ticker() {
    let day = d(2024, 1, 1);
    let txns = vec![
        txn("b1", "acc-1", "TCS", TransactionKind::Buy, day, dec!(1), dec!(10)),
        txn("b2", "acc-1", "INFY", TransactionKind::Buy, day, dec!(1), dec!(10)),
        txn("b3", "acc-1", "AAA", TransactionKind::Buy, day, dec!(1), dec!(10)),
    ];
    let view = service()
        .get_holdings(&txns, &NoLivePrices, &account("acc-1"), d(2024, 6, 1))
        .unwrap();
    let names: Vec<&str> = view.holdings.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["AAA", "Infosys", "Tata Consultancy Services"]);
}

#[test]
fn test_closed_lot_is_hidden_but_counted_in_summary() {
    let txns = vec![
        txn("b1", "acc-1", "INFY", TransactionKind::Buy, d(2023, 1, 1), dec!(10), dec!(100)),
        txn("s1", "acc-1", "INFY", TransactionKind::Sell, d(2023, 6, 1), dec!(10), dec!(130)),
        txn("div", "acc-1", "INFY", TransactionKind::Dividend, d(2023, 3, 1), dec!(10), dec!(2)),
    ];
    let view = service()
        .get_holdings(&txns, &NoLivePrices, &account("acc-1"), d(2024, 1, 1))
        .unwrap();

    assert!(view.holdings.is_empty());
    assert_eq!(view.summary.realized_profit_loss, dec!(300));
    assert_eq!(view.summary.dividend_income, dec!(20));
    assert_eq!(view.summary.total_profit_loss, dec!(320));
    assert_eq!(view.summary.cash, dec!(-1000) + dec!(1300) + dec!(20));
    assert_eq!(view.realized_gains.len(), 1);
    // Round trip within the year: positive return.
    assert!(view.summary.xirr.unwrap() > Decimal::ZERO);
}

#[test]
fn test_portfolio_scope_consolidates_and_ignores_internal_transfers() {
    let txns = vec![
        txn("b1", "acc-a", "INFY", TransactionKind::Buy, d(2023, 1, 1), dec!(10), dec!(100)),
        txn("b2", "acc-b", "INFY", TransactionKind::Buy, d(2023, 1, 1), dec!(10), dec!(100)),
        txn("out", "acc-a", "INFY", TransactionKind::TransferOut, d(2023, 7, 1), dec!(10), dec!(110)),
        txn("in", "acc-b", "INFY", TransactionKind::TransferIn, d(2023, 7, 1), dec!(10), dec!(110)),
    ];
    let live = prices(&[("INFY", dec!(120))]);
    let svc = service();

    let portfolio = svc
        .get_holdings(&txns, &live, &HoldingsScope::Portfolio, d(2024, 1, 1))
        .unwrap();
    assert_eq!(portfolio.holdings.len(), 1);
    let h = &portfolio.holdings[0];
    assert_eq!(h.account_id, None);
    assert_eq!(h.quantity, dec!(20));
    assert_eq!(h.total_cost, dec!(2000));
    assert_eq!(h.holding_period_years, dec!(0.999316));
    // -2000 on day 0, +2400 one year later; the transfer legs cancel out.
    assert_close(h.xirr, dec!(0.2));
    assert_eq!(portfolio.summary.stock_transfer, Decimal::ZERO);

    let target = svc
        .get_holdings(&txns, &live, &account("acc-b"), d(2024, 1, 1))
        .unwrap();
    let hb = &target.holdings[0];
    assert_eq!(hb.quantity, dec!(20));
    assert_eq!(target.summary.stock_transfer, dec!(1100));
    assert!(hb.xirr.is_some());
    assert!(hb.xirr != h.xirr);

    let origin = svc
        .get_holdings(&txns, &live, &account("acc-a"), d(2024, 1, 1))
        .unwrap();
    assert!(origin.holdings.is_empty());
    assert_eq!(origin.summary.realized_profit_loss, Decimal::ZERO);
}

#[test]
fn test_dividends_enter_xirr_only_when_enabled() {
    let txns = vec![
        txn("b1", "acc-1", "TCS", TransactionKind::Buy, d(2023, 1, 1), dec!(10), dec!(100)),
        txn("div", "acc-1", "TCS", TransactionKind::Dividend, d(2023, 7, 1), dec!(10), dec!(5)),
    ];
    let live = prices(&[("TCS", dec!(110))]);

    let default_view = service()
        .get_holdings(&txns, &live, &account("acc-1"), d(2024, 1, 1))
        .unwrap();
    assert_close(default_view.holdings[0].xirr, dec!(0.1));

    let settings = EngineSettings {
        include_dividends_in_xirr: true,
        ..EngineSettings::default()
    };
    let with_dividends = HoldingsService::new(settings)
        .get_holdings(&txns, &live, &account("acc-1"), d(2024, 1, 1))
        .unwrap();
    let rate = with_dividends.holdings[0].xirr.unwrap();
    assert!(rate > dec!(0.1), "dividend should raise the return, got {}", rate);
}

#[test]
fn test_dividend_without_instrument_counts_as_income() {
    let txns = vec![
        deposit("dep", "acc-1", d(2023, 1, 1), dec!(1000)),
        Transaction::new("div", "acc-1", None, TransactionKind::Dividend, d(2023, 6, 1), dec!(1), dec!(50)),
    ];
    let view = service()
        .get_holdings(&txns, &NoLivePrices, &account("acc-1"), d(2024, 1, 1))
        .unwrap();

    assert!(view.holdings.is_empty());
    assert_eq!(view.summary.cash, dec!(1050));
    assert_eq!(view.summary.dividend_income, dec!(50));
    assert_eq!(view.summary.total_profit_loss, dec!(50));
}

#[test]
fn test_replay_errors_propagate() {
    let txns = vec![txn("s1", "acc-1", "TCS", TransactionKind::Sell, d(2023, 1, 1), dec!(1), dec!(100))];
    let result = service().get_holdings(&txns, &NoLivePrices, &account("acc-1"), d(2024, 1, 1));
    assert!(matches!(
        result,
        Err(Error::Calculation(CalculatorError::InsufficientHolding { .. }))
    ));
}

#[test]
fn test_recomputation_is_identical() {
    let txns = vec![
        deposit("dep", "acc-1", d(2023, 1, 1), dec!(10000)),
        txn("b1", "acc-1", "TCS", TransactionKind::Buy, d(2023, 1, 2), dec!(10), dec!(300)),
        txn("b2", "acc-1", "INFY", TransactionKind::Buy, d(2023, 2, 2), dec!(7), dec!(150)),
        txn("sp", "acc-1", "INFY", TransactionKind::Split, d(2023, 5, 2), dec!(0), dec!(0)).with_ratio("2:1"),
        txn("s1", "acc-1", "INFY", TransactionKind::Sell, d(2023, 8, 2), dec!(4), dec!(90)),
    ];
    let live = prices(&[("TCS", dec!(320)), ("INFY", dec!(85))]);
    let svc = service();
    let first = svc
        .get_holdings(&txns, &live, &HoldingsScope::Portfolio, d(2024, 1, 1))
        .unwrap();
    let second = svc
        .get_holdings(&txns, &live, &HoldingsScope::Portfolio, d(2024, 1, 1))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
