//! One tick of the batch auction: generate orders, clear, settle, record.

use rand::Rng;
use thiserror::Error;

use crate::agents::Trader;
use crate::market::{self, MIN_CLEARING_PRICE, Order};
use crate::state::TickRecord;
use crate::types::{AgentId, Price};

// === CONSTANTS ===

/// Bracket heuristic: the clearing search spans zero to three times the
/// previous tick's price.
pub const BRACKET_FACTOR: f64 = 3.0;

// === ERRORS ===

/// Fatal numerical failure. Continuing would silently corrupt every
/// downstream metric, so the run aborts naming the offending tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("clearing price is not finite at tick {tick}")]
    NonFinitePrice { tick: u64 },
}

// === FULL TICK ===

/*
Tick phases, strictly ordered:
- every trader submits exactly one order (reads state, no writes)
- uniform price resolved by bisection over the complete order set
- all marketable orders settle at that price (the only writes)
- metrics recorded
The barrier between generation and clearing is what keeps settlement free
of ordering-dependent bugs.
*/

/// Run one market tick and return the record to append to the series.
pub fn run_market_tick<R: Rng>(
    tick: u64,
    traders: &mut [Trader],
    rng: &mut R,
    avg_drift: f64,
    std_dev: f64,
    current_price: Price,
) -> Result<TickRecord, SimError> {
    // 1. ORDER GENERATION
    let orders: Vec<Order> = traders
        .iter()
        .enumerate()
        .map(|(i, trader)| {
            trader.generate_order(AgentId(i as u32), rng, avg_drift, std_dev, current_price)
        })
        .collect();

    #[cfg(feature = "instrument")]
    for order in &orders {
        let side_str = match order.side {
            market::Side::Buy => "buy",
            market::Side::Sell => "sell",
        };
        tracing::info!(
            target: "order",
            tick = tick,
            agent_id = order.agent.0,
            side = side_str,
            quantity = order.quantity,
            limit_price = order.limit_price,
        );
    }

    // 2. PRICE DISCOVERY
    let raw = market::clearing_price(&orders, 0.0, BRACKET_FACTOR * current_price);
    if !raw.is_finite() {
        return Err(SimError::NonFinitePrice { tick });
    }
    let price = raw.max(MIN_CLEARING_PRICE);

    // 3. SETTLEMENT
    let summary = market::settle_orders(&orders, price, traders);

    #[cfg(feature = "instrument")]
    for order in orders.iter().filter(|o| o.is_marketable_at(price)) {
        let side_str = match order.side {
            market::Side::Buy => "buy",
            market::Side::Sell => "sell",
        };
        tracing::info!(
            target: "fill",
            tick = tick,
            agent_id = order.agent.0,
            side = side_str,
            quantity = order.quantity,
            price = price,
        );
    }

    // 4. METRICS
    let record = TickRecord {
        tick,
        price,
        volume: summary.notional / 2.0,
        participants: summary.participants,
    };

    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "tick",
        tick = record.tick,
        price = record.price,
        volume = record.volume,
        participants = record.participants,
    );

    Ok(record)
}
