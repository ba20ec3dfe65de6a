use serde::{Deserialize, Serialize};

// ============================================================================
// Core scalar types
// ============================================================================

/// Price of the single traded asset, in currency units.
pub type Price = f64;

/// Whole units of the asset named by an order. Always computed non-negative
/// during order generation, even though holdings themselves are signed.
pub type Quantity = u64;

/// Index of a trader in the world's dense trader array.
///
/// Orders carry this index instead of a reference to the trader, so the
/// order set stays independent of agent storage and settlement can borrow
/// the trader array mutably without aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
