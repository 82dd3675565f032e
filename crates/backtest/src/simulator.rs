//! Order replay simulator.
//!
//! Walks the trading calendar from the first to the last order date, executes
//! each day's orders at that day's close, marks every open position to market
//! and records one equity snapshot per session.

use crate::order_book::OrderBook;
use crate::portfolio::Portfolio;
use crate::position::PositionLedger;
use chrono::NaiveDate;
use marketsim_core::config::SimulationConfig;
use marketsim_core::{Error, Order, PriceTable, Result, Side, TradingCalendar, ValuationPoint};
use tracing::{debug, info, warn};

/// Portfolio policies checked on every execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// Allow a buy to take cash below zero.
    pub allow_negative_cash: bool,
    /// Allow a sell to leave a negative share count.
    pub allow_short_positions: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            allow_negative_cash: true,
            allow_short_positions: true,
        }
    }
}

impl From<&SimulationConfig> for ExecutionPolicy {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            allow_negative_cash: config.allow_negative_cash,
            allow_short_positions: config.allow_short_positions,
        }
    }
}

/// Execute one order at `price`.
///
/// Buys debit `shares x price`; sells credit it, whether or not the symbol
/// was held. The symbol's holding is revalued at the same price right away
/// so later orders on the same day see the updated position.
pub fn execute_order<'p>(
    order: &Order,
    price: f64,
    ledger: &mut PositionLedger,
    portfolio: &'p mut Portfolio,
    policy: ExecutionPolicy,
) -> Result<&'p mut Portfolio> {
    let notional = order.shares() as f64 * price;
    let cash_before = portfolio.cash();
    let shares_before = ledger.shares(order.symbol());

    match order.side() {
        Side::Buy => {
            let cash_after = cash_before - notional;
            if cash_after < 0.0 && !policy.allow_negative_cash {
                return Err(Error::policy_violation(format!(
                    "buying {} {} on {} needs {notional:.2} with {cash_before:.2} cash",
                    order.shares(),
                    order.symbol(),
                    order.date(),
                )));
            }
        }
        Side::Sell => {
            let shares_after = shares_before - i64::from(order.shares());
            if shares_after < 0 && !policy.allow_short_positions {
                return Err(Error::policy_violation(format!(
                    "selling {} {} on {} with {shares_before} held would open a short",
                    order.shares(),
                    order.symbol(),
                    order.date(),
                )));
            }
        }
    }

    let shares = ledger.apply(order);
    let cash_delta = match order.side() {
        Side::Buy => -notional,
        Side::Sell => notional,
    };
    portfolio.adjust_cash(cash_delta);
    portfolio.mark(order.symbol(), shares, price);

    if ledger.is_short(order.symbol()) && shares_before >= 0 {
        warn!(symbol = order.symbol(), date = %order.date(), shares, "short position opened");
    }
    if portfolio.cash() < 0.0 && cash_before >= 0.0 {
        warn!(date = %order.date(), cash = portfolio.cash(), "cash balance negative");
    }
    debug!(
        at = %order.timestamp(),
        symbol = order.symbol(),
        side = %order.side(),
        qty = order.shares(),
        price,
        shares,
        cash = portfolio.cash(),
        "order executed"
    );

    Ok(portfolio)
}

/// Final state of one replay.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// One equity snapshot per session, ascending.
    pub series: Vec<ValuationPoint>,
    /// Positions after the last session.
    pub ledger: PositionLedger,
    /// Cash and holdings after the last session.
    pub portfolio: Portfolio,
}

impl SimulationResult {
    /// Equity at the last session.
    pub fn final_equity(&self) -> f64 {
        self.portfolio.equity()
    }
}

/// Order replay simulator.
///
/// Every [`run`](MarketSimulator::run) starts from a fresh ledger and
/// portfolio, so one simulator can replay many independent order sets.
pub struct MarketSimulator<'a, P: ?Sized, C: ?Sized> {
    initial_cash: f64,
    policy: ExecutionPolicy,
    prices: &'a P,
    calendar: &'a C,
}

impl<'a, P, C> MarketSimulator<'a, P, C>
where
    P: PriceTable + ?Sized,
    C: TradingCalendar + ?Sized,
{
    /// Create a simulator over a price table and calendar.
    pub fn new(config: &SimulationConfig, prices: &'a P, calendar: &'a C) -> Self {
        Self {
            initial_cash: config.initial_cash,
            policy: ExecutionPolicy::from(config),
            prices,
            calendar,
        }
    }

    /// Replay `orders` and return the valuation series.
    ///
    /// Fails before any replay on an empty or off-calendar order set, and
    /// aborts without a partial series on the first missing price or policy
    /// violation.
    pub fn run(&self, orders: impl IntoIterator<Item = Order>) -> Result<SimulationResult> {
        let book = OrderBook::from_orders(orders);
        let (first, last) = book.validate(self.calendar)?;
        let sessions = self.calendar.sessions(first, last);

        info!(
            orders = book.len(),
            symbols = book.symbols().len(),
            sessions = sessions.len(),
            %first,
            %last,
            initial_cash = self.initial_cash,
            "starting order replay"
        );

        let mut ledger = PositionLedger::new();
        let mut portfolio = Portfolio::new(self.initial_cash);
        let mut series = Vec::with_capacity(sessions.len());

        for date in sessions {
            self.replay_day(date, book.orders_on(date), &mut ledger, &mut portfolio)?;
            let equity = portfolio.equity();
            debug!(%date, equity, cash = portfolio.cash(), "session closed");
            series.push(ValuationPoint { date, equity });
        }

        info!(
            sessions = series.len(),
            final_equity = portfolio.equity(),
            open_positions = ledger.len(),
            flat = ledger.is_flat(),
            "order replay complete"
        );

        Ok(SimulationResult {
            series,
            ledger,
            portfolio,
        })
    }

    /// Execute the day's orders in input order, then mark every open
    /// position at the day's close.
    fn replay_day(
        &self,
        date: NaiveDate,
        orders: &[Order],
        ledger: &mut PositionLedger,
        portfolio: &mut Portfolio,
    ) -> Result<()> {
        for order in orders {
            let price = self.prices.require_close(order.symbol(), date)?;
            execute_order(order, price, ledger, portfolio, self.policy)?;
        }

        for (symbol, shares) in ledger.open_positions() {
            let price = self.prices.require_close(symbol, date)?;
            portfolio.mark(symbol, shares, price);
        }

        Ok(())
    }
}
