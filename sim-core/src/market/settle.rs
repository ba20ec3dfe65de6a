use crate::agents::Trader;
use crate::types::Price;

use super::orders::{Order, Side};

// === SETTLEMENT ===

/// Aggregate outcome of settling one tick's order set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettleSummary {
    /// Raw Σ quantity × price over executed orders. Each trade appears once
    /// on each side, so reported volume is half of this.
    pub notional: f64,
    /// Number of orders that were marketable at the clearing price.
    pub participants: u32,
}

/// Execute every order marketable at `price` against the trader array.
///
/// Fully batch: an order executes for its whole quantity or not at all, and
/// unmarketable orders are dropped rather than carried forward. Cash and
/// asset balances are adjusted with no solvency or short-sale check —
/// negative holdings are an accepted property of the model.
pub fn settle_orders(orders: &[Order], price: Price, traders: &mut [Trader]) -> SettleSummary {
    let mut summary = SettleSummary::default();

    for order in orders {
        if !order.is_marketable_at(price) {
            continue;
        }
        execute_order(order, price, &mut traders[order.agent.index()]);
        summary.notional += order.quantity as f64 * price;
        summary.participants += 1;
    }

    summary
}

fn execute_order(order: &Order, price: Price, trader: &mut Trader) {
    let notional = order.quantity as f64 * price;
    match order.side {
        Side::Buy => {
            trader.cash -= notional;
            trader.assets += order.quantity as i64;
        }
        Side::Sell => {
            trader.cash += notional;
            trader.assets -= order.quantity as i64;
        }
    }
}
