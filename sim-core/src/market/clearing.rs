use crate::types::{Price, Quantity};

use super::orders::{Order, Side};

// === UNIFORM-PRICE CLEARING ===

/// Fixed bisection depth. The midpoint after this many halvings is accepted
/// as the tick's price whether or not demand and supply cross exactly there.
pub const BISECTION_ITERATIONS: u32 = 30;

/// Floor applied by callers to the resolved price so the next tick's
/// `3 × price` bracket cannot collapse to a non-positive interval.
pub const MIN_CLEARING_PRICE: Price = 0.001;

/// Units bid for at `price`: sum over buys whose limit is at or above it.
/// Non-increasing in `price`.
pub fn aggregate_demand(orders: &[Order], price: Price) -> Quantity {
    orders
        .iter()
        .filter(|o| matches!(o.side, Side::Buy) && price <= o.limit_price)
        .map(|o| o.quantity)
        .sum()
}

/// Units offered at `price`: sum over sells whose limit is at or below it.
/// Non-decreasing in `price`.
pub fn aggregate_supply(orders: &[Order], price: Price) -> Quantity {
    orders
        .iter()
        .filter(|o| matches!(o.side, Side::Sell) && price >= o.limit_price)
        .map(|o| o.quantity)
        .sum()
}

/// Uniform price approximately balancing aggregate demand and supply,
/// found by bounded bisection over `[min, max]`.
///
/// Excess demand at the midpoint means the candidate is too low, so the
/// search moves into the upper half; otherwise the lower. The bracket is a
/// heuristic — when the true crossing lies outside it, the search converges
/// to a boundary-adjacent price instead. Deterministic for a given order
/// set and bracket; O(`BISECTION_ITERATIONS` · n).
pub fn clearing_price(orders: &[Order], min: Price, max: Price) -> Price {
    let (mut lo, mut hi) = (min, max);
    for _ in 0..BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if aggregate_demand(orders, mid) > aggregate_supply(orders, mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use crate::types::AgentId;

    use super::*;

    fn make_buy(agent: u32, qty: u64, price: f64) -> Order {
        Order {
            agent: AgentId(agent),
            side: Side::Buy,
            quantity: qty,
            limit_price: price,
        }
    }

    fn make_sell(agent: u32, qty: u64, price: f64) -> Order {
        Order {
            agent: AgentId(agent),
            side: Side::Sell,
            quantity: qty,
            limit_price: price,
        }
    }

    #[test]
    fn aggregation_respects_inclusive_limits() {
        let orders = vec![make_buy(0, 5, 100.0), make_sell(1, 3, 90.0)];

        assert_eq!(aggregate_demand(&orders, 100.0), 5);
        assert_eq!(aggregate_demand(&orders, 100.01), 0);
        assert_eq!(aggregate_supply(&orders, 90.0), 3);
        assert_eq!(aggregate_supply(&orders, 89.99), 0);
    }

    #[test]
    fn balanced_overlap_settles_at_supply_edge() {
        // Equal quantities: demand never exceeds supply inside the overlap,
        // so every midpoint above the ask moves the upper bound down and the
        // search lands where supply first appears.
        let orders = vec![make_buy(0, 10, 100.0), make_sell(1, 10, 50.0)];
        let price = clearing_price(&orders, 0.0, 300.0);
        assert!((price - 50.0).abs() < 1e-4, "price = {}", price);
    }

    #[test]
    fn excess_demand_pushes_price_to_demand_edge() {
        let orders = vec![make_buy(0, 20, 100.0), make_sell(1, 10, 50.0)];
        let price = clearing_price(&orders, 0.0, 300.0);
        assert!((price - 100.0).abs() < 1e-4, "price = {}", price);
    }

    #[test]
    fn empty_order_set_returns_bracket_low_end() {
        // demand(mid) = supply(mid) = 0 everywhere, so the upper bound
        // collapses onto the lower.
        let price = clearing_price(&[], 0.0, 300.0);
        assert!(price >= 0.0 && price < 1e-3, "price = {}", price);
    }

    #[test]
    fn result_never_leaves_the_bracket() {
        // Crossing far outside the bracket: result pins to a boundary.
        let orders = vec![make_buy(0, 10, 5000.0), make_sell(1, 5, 4000.0)];
        let price = clearing_price(&orders, 0.0, 30.0);
        assert!((0.0..=30.0).contains(&price), "price = {}", price);
    }
}
