use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::Price;

// ============================================================================
// Per-tick metrics and the recorded series
// ============================================================================

/// Metrics for one completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct TickRecord {
    pub tick: u64,
    /// Uniform price the tick's trades executed at.
    pub price: Price,
    /// Traded notional counted once per trade (half the per-side sum).
    pub volume: f64,
    /// Orders that were marketable at the clearing price.
    pub participants: u32,
}

/// Append-only series of tick records, one per completed tick, handed to
/// the reporting collaborator when the run is done.
#[derive(Debug, Clone, Default)]
pub struct MetricsSeries {
    records: Vec<TickRecord>,
}

impl MetricsSeries {
    pub fn push(&mut self, record: TickRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TickRecord> {
        self.records.last()
    }

    /// Evenly strided subset of at most `max_points` records, for callers
    /// that chart fewer points than ticks run. Zero means "everything".
    pub fn downsample(&self, max_points: usize) -> Vec<TickRecord> {
        if max_points == 0 || self.records.len() <= max_points {
            return self.records.clone();
        }
        let stride = self.records.len().div_ceil(max_points);
        self.records.iter().step_by(stride).copied().collect()
    }
}

// ============================================================================
// Serializable snapshot for JS chart renderers
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SeriesSnapshot {
    pub ticks: Vec<TickRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: u64) -> MetricsSeries {
        let mut s = MetricsSeries::default();
        for tick in 0..n {
            s.push(TickRecord {
                tick,
                price: 100.0,
                volume: 0.0,
                participants: 0,
            });
        }
        s
    }

    #[test]
    fn downsample_keeps_order_and_bounds_length() {
        let s = series(1000);
        let sampled = s.downsample(100);
        assert!(sampled.len() <= 100);
        assert_eq!(sampled[0].tick, 0);
        assert!(sampled.windows(2).all(|w| w[0].tick < w[1].tick));
    }

    #[test]
    fn downsample_zero_means_everything() {
        let s = series(25);
        assert_eq!(s.downsample(0).len(), 25);
        assert_eq!(s.downsample(50).len(), 25);
    }
}
