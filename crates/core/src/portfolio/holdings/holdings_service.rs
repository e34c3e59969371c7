use crate::constants::{DECIMAL_PRECISION, PORTFOLIO_TOTAL_ACCOUNT_ID};
use crate::errors::Result;
use crate::portfolio::holdings::holdings_model::{
    HoldingView, HoldingsScope, Instrument, PortfolioSummary, PortfolioView,
};
use crate::portfolio::performance::{
    calculate_xirr, xirr_cashflows, HoldingFlow, PerformanceScope,
};
use crate::portfolio::snapshot::{
    CashLedger, HoldingsCalculator, LotState, PositionKey, RealizedGain, ReplayResult,
};
use crate::portfolio::valuation::{value_lot, weight_percent, LivePriceSource};
use crate::settings::EngineSettings;
use crate::transactions::Transaction;

use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Lots, flows and cash of one scope, regrouped from a replay.
struct ScopedReplay {
    lots: BTreeMap<PositionKey, LotState>,
    flows: HashMap<PositionKey, Vec<HoldingFlow>>,
    cash: CashLedger,
    realized_gains: Vec<RealizedGain>,
    performance_scope: PerformanceScope,
}

impl ScopedReplay {
    fn from_replay(replay: ReplayResult, scope: &HoldingsScope) -> Self {
        match scope {
            HoldingsScope::Account(account_id) => {
                let cash = replay.cash_for(account_id);
                let lots = replay
                    .positions
                    .into_iter()
                    .filter(|(key, _)| &key.account_id == account_id)
                    .collect();
                let mut flows: HashMap<PositionKey, Vec<HoldingFlow>> = HashMap::new();
                for flow in replay
                    .flows
                    .into_iter()
                    .filter(|f| &f.key.account_id == account_id)
                {
                    flows.entry(flow.key.clone()).or_default().push(flow);
                }
                let realized_gains = replay
                    .realized_gains
                    .into_iter()
                    .filter(|g| &g.account_id == account_id)
                    .collect();
                ScopedReplay {
                    lots,
                    flows,
                    cash,
                    realized_gains,
                    performance_scope: PerformanceScope::Account,
                }
            }
            HoldingsScope::Portfolio => {
                let cash = replay.total_cash();
                let mut lots: BTreeMap<PositionKey, LotState> = BTreeMap::new();
                for lot in replay.positions.values() {
                    let key = PositionKey::new(PORTFOLIO_TOTAL_ACCOUNT_ID, lot.instrument.clone());
                    lots.entry(key)
                        .or_insert_with_key(|k| {
                            LotState::new(k.account_id.clone(), k.instrument.clone())
                        })
                        .merge(lot);
                }
                let mut flows: HashMap<PositionKey, Vec<HoldingFlow>> = HashMap::new();
                for flow in replay.flows {
                    let key = PositionKey::new(PORTFOLIO_TOTAL_ACCOUNT_ID, flow.key.instrument.clone());
                    flows.entry(key).or_default().push(flow);
                }
                ScopedReplay {
                    lots,
                    flows,
                    cash,
                    realized_gains: replay.realized_gains,
                    performance_scope: PerformanceScope::Portfolio,
                }
            }
        }
    }
}

/// Builds holdings views from a transaction stream and a live price source.
///
/// Every call replays from scratch; identical inputs give identical output.
#[derive(Debug, Clone, Default)]
pub struct HoldingsService {
    calculator: HoldingsCalculator,
    instruments: HashMap<String, Instrument>,
}

impl HoldingsService {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            calculator: HoldingsCalculator::new(settings),
            instruments: HashMap::new(),
        }
    }

    /// Display names keyed by ticker. Unknown tickers display as the ticker.
    pub fn with_instruments(mut self, instruments: impl IntoIterator<Item = Instrument>) -> Self {
        self.instruments
            .extend(instruments.into_iter().map(|i| (i.ticker.clone(), i)));
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        self.calculator.settings()
    }

    fn display_name(&self, ticker: &str) -> String {
        self.instruments
            .get(ticker)
            .and_then(|i| i.name.clone())
            .unwrap_or_else(|| ticker.to_string())
    }

    /// Holdings, summary and realized gains for `scope` as of `valuation_date`.
    ///
    /// Lots at or below the quantity threshold are left out of `holdings` but
    /// their realized P&L, dividends and cashflows still count in the summary.
    pub fn get_holdings(
        &self,
        transactions: &[Transaction],
        prices: &dyn LivePriceSource,
        scope: &HoldingsScope,
        valuation_date: NaiveDate,
    ) -> Result<PortfolioView> {
        let settings = self.settings();
        let replay = self.calculator.replay(transactions, valuation_date)?;
        let scoped = ScopedReplay::from_replay(replay, scope);
        let account_id = match scope {
            HoldingsScope::Account(id) => Some(id.clone()),
            HoldingsScope::Portfolio => None,
        };

        let open_lots: Vec<&LotState> = scoped
            .lots
            .values()
            .filter(|lot| lot.quantity > settings.quantity_threshold)
            .collect();
        debug!(
            "Valuing {} open holding(s) of {} lot(s) as of {}",
            open_lots.len(),
            scoped.lots.len(),
            valuation_date
        );

        let no_flows: Vec<HoldingFlow> = Vec::new();
        let mut holdings: Vec<HoldingView> = open_lots
            .par_iter()
            .map(|lot| {
                let valuation = value_lot(
                    lot,
                    prices.latest_price(&lot.instrument),
                    valuation_date,
                    settings.holding_period_day_basis,
                );
                let flows = scoped.flows.get(&lot.key()).unwrap_or(&no_flows);
                let series = xirr_cashflows(
                    flows,
                    scoped.performance_scope,
                    settings.include_dividends_in_xirr,
                    Some((valuation_date, valuation.current_value)),
                );
                let xirr = calculate_xirr(&series, settings.xirr_day_basis, &settings.xirr)
                    .rate_decimal(DECIMAL_PRECISION);

                HoldingView {
                    id: lot.id.clone(),
                    account_id: account_id.clone(),
                    ticker: lot.instrument.clone(),
                    name: self.display_name(&lot.instrument),
                    quantity: valuation.quantity,
                    avg_price: valuation.avg_price,
                    live_price: valuation.live_price,
                    price_missing: valuation.price_missing,
                    total_cost: valuation.total_cost,
                    current_value: valuation.current_value,
                    pnl: valuation.pnl,
                    pnl_percent: valuation.pnl_percent,
                    holding_period_years: valuation.holding_period_years,
                    xirr,
                    realized_pnl: lot.realized_pnl,
                    dividend_income: lot.dividend_income,
                    weight: Decimal::ZERO,
                }
            })
            .collect();

        let summary = self.summarize(&scoped, &holdings, valuation_date);
        for holding in &mut holdings {
            holding.weight = weight_percent(holding.current_value, summary.current_portfolio_value);
        }
        holdings.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.ticker.cmp(&b.ticker))
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        Ok(PortfolioView {
            valuation_date,
            holdings,
            summary,
            realized_gains: scoped.realized_gains,
        })
    }

    fn summarize(
        &self,
        scoped: &ScopedReplay,
        holdings: &[HoldingView],
        valuation_date: NaiveDate,
    ) -> PortfolioSummary {
        let settings = self.settings();
        let positions_current_value: Decimal = holdings.iter().map(|h| h.current_value).sum();
        let positions_purchase_cost: Decimal = holdings.iter().map(|h| h.total_cost).sum();
        let unrealized: Decimal = holdings.iter().map(|h| h.pnl).sum();
        let realized: Decimal = scoped.lots.values().map(|l| l.realized_pnl).sum();
        // Cash-side total also covers dividends that name no instrument.
        let dividends = scoped.cash.dividend_income;

        // Sorted keys keep the aggregate series identical across calls.
        let mut grouped: Vec<(&PositionKey, &Vec<HoldingFlow>)> = scoped.flows.iter().collect();
        grouped.sort_by(|a, b| a.0.cmp(b.0));
        let series = xirr_cashflows(
            grouped.into_iter().flat_map(|(_, flows)| flows.iter()),
            scoped.performance_scope,
            settings.include_dividends_in_xirr,
            Some((valuation_date, positions_current_value)),
        );
        let xirr = calculate_xirr(&series, settings.xirr_day_basis, &settings.xirr)
            .rate_decimal(DECIMAL_PRECISION);

        PortfolioSummary {
            total_profit_loss: unrealized + realized + dividends,
            realized_profit_loss: realized,
            dividend_income: dividends,
            current_portfolio_value: positions_current_value + scoped.cash.balance,
            positions_current_value,
            invested_value: scoped.cash.net_invested(),
            positions_purchase_cost,
            stock_transfer: scoped.cash.net_stock_transfer(),
            cash: scoped.cash.balance,
            xirr,
        }
    }
}
