//! Flow classification for money-weighted returns.
//!
//! Only flows that cross the boundary of the chosen scope enter the XIRR
//! cashflow series.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::performance_model::{CashflowEvent, FlowKind, HoldingFlow};

/// Flow type for performance calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Capital crossing the scope boundary
    External,

    /// Capital moving inside the scope
    Internal,
}

/// Scope for performance calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceScope {
    /// Consolidated across accounts: transfers paired with a counter-leg are internal
    Portfolio,

    /// Single account: every transfer is external
    Account,
}

/// Classify a replayed flow for a scope.
///
/// Trades, dividends and demerger cost releases are always external to the
/// holding. Transfers are external at account level; at portfolio level only
/// an unpaired leg (units arriving from or leaving to an untracked account)
/// is external.
pub fn classify_flow_for_scope(flow: &HoldingFlow, scope: PerformanceScope) -> FlowType {
    match flow.kind {
        FlowKind::Acquisition
        | FlowKind::Disposal
        | FlowKind::Dividend
        | FlowKind::CostReleased => FlowType::External,
        FlowKind::TransferIn { paired } | FlowKind::TransferOut { paired } => match scope {
            PerformanceScope::Account => FlowType::External,
            PerformanceScope::Portfolio if paired => FlowType::Internal,
            PerformanceScope::Portfolio => FlowType::External,
        },
    }
}

/// Whether a flow belongs in the XIRR cashflow series.
pub fn include_in_xirr(
    flow: &HoldingFlow,
    scope: PerformanceScope,
    include_dividends: bool,
) -> bool {
    if flow.kind == FlowKind::Dividend && !include_dividends {
        return false;
    }
    classify_flow_for_scope(flow, scope) == FlowType::External
}

/// Builds the XIRR series for `flows` within `scope`, closed by a terminal
/// market value when one is given and non-zero.
pub fn xirr_cashflows<'a>(
    flows: impl IntoIterator<Item = &'a HoldingFlow>,
    scope: PerformanceScope,
    include_dividends: bool,
    terminal: Option<(NaiveDate, Decimal)>,
) -> Vec<CashflowEvent> {
    let mut series: Vec<CashflowEvent> = flows
        .into_iter()
        .filter(|flow| include_in_xirr(flow, scope, include_dividends))
        .map(|flow| CashflowEvent::new(flow.date, flow.amount))
        .collect();
    if let Some((date, value)) = terminal.filter(|(_, value)| !value.is_zero()) {
        series.push(CashflowEvent::new(date, value));
    }
    series
}
