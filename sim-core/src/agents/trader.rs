use rand::Rng;

use crate::market::{Order, Side};
use crate::rng::GaussianRng;
use crate::types::{AgentId, Price, Quantity};

// === TRADER ===

/// One trading agent: cash and asset holdings plus a fixed appetite for
/// buying. Holdings are mutated only by settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct Trader {
    pub cash: f64,
    /// Signed, because the no-short-guard settlement rule can take it
    /// below zero.
    pub assets: i64,
    /// Probability in `[0, 1)` of bidding rather than asking on a given
    /// tick. Drawn once at creation, never mutated.
    pub buy_propensity: f64,
}

impl Trader {
    pub fn new(cash: f64, assets: i64, buy_propensity: f64) -> Self {
        Self {
            cash,
            assets,
            buy_propensity,
        }
    }

    /// Produce this trader's single order for the tick.
    ///
    /// Buy: limit drifts up from the current price by `N(avg_drift, std_dev)`
    /// and quantity is everything cash affords at that limit. Sell: a uniform
    /// fraction of holdings at a limit drifting down by the same amount.
    /// Degenerate inputs (non-positive limit, exhausted cash, short assets)
    /// degrade to a zero-quantity order instead of letting a division or
    /// sign error through. Reads agent state, never writes it.
    pub fn generate_order<R: Rng>(
        &self,
        id: AgentId,
        rng: &mut R,
        avg_drift: f64,
        std_dev: f64,
        current_price: Price,
    ) -> Order {
        let r: f64 = rng.random();
        let side_roll: f64 = rng.random();

        if side_roll < self.buy_propensity {
            let limit_price = current_price + rng.gaussian(avg_drift, std_dev);
            Order {
                agent: id,
                side: Side::Buy,
                quantity: buy_quantity(self.cash, limit_price),
                limit_price,
            }
        } else {
            let quantity = sell_quantity(self.assets, r);
            let limit_price = current_price + rng.gaussian(-avg_drift, std_dev);
            Order {
                agent: id,
                side: Side::Sell,
                quantity,
                limit_price,
            }
        }
    }
}

/// Whole units affordable at the limit. Zero when the limit is non-positive
/// (the division would be meaningless) or the cash is already gone.
fn buy_quantity(cash: f64, limit_price: Price) -> Quantity {
    if limit_price <= 0.0 || cash <= 0.0 {
        return 0;
    }
    (cash / limit_price).floor() as Quantity
}

/// `floor(assets · r)`; zero for short positions.
fn sell_quantity(assets: i64, r: f64) -> Quantity {
    if assets <= 0 {
        return 0;
    }
    (assets as f64 * r).floor() as Quantity
}
