use crate::types::{AgentId, Price, Quantity};

// === ORDERS ===

/// One trader's trade intent for a single tick.
///
/// Built fresh every tick, consumed once by settlement, never retained —
/// there is no persistent order book in this model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub agent: AgentId,
    pub side: Side,
    pub quantity: Quantity,
    pub limit_price: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Order {
    /// Limit condition at a uniform price, boundary inclusive on both sides:
    /// a buy executes at or below its limit, a sell at or above.
    pub fn is_marketable_at(&self, price: Price) -> bool {
        match self.side {
            Side::Buy => price <= self.limit_price,
            Side::Sell => price >= self.limit_price,
        }
    }
}
