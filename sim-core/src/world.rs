// World state for the double-auction market simulation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agents::Trader;
use crate::config::{ConfigError, SimConfig};
use crate::state::{MetricsSeries, TickRecord};
use crate::tick::{SimError, run_market_tick};
use crate::types::Price;

/// Complete state of one simulation run, threaded explicitly through every
/// tick — never process-global.
#[derive(Debug)]
pub struct World {
    pub tick: u64,
    pub traders: Vec<Trader>,
    /// Carried across ticks: seeds the next tick's order drift and bracket.
    pub current_price: Price,
    pub series: MetricsSeries,
    config: SimConfig,
    rng: StdRng,
}

impl World {
    /// Validate the configuration and build the initial population.
    /// Buy propensities are drawn once here and never change afterwards.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let traders = (0..config.agent_count)
            .map(|_| Trader::new(config.initial_cash, config.initial_assets, rng.random()))
            .collect();

        Ok(Self {
            tick: 0,
            traders,
            current_price: config.initial_price(),
            series: MetricsSeries::default(),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // === Stepping ===

    /// Advance the simulation by one tick. The resolved price becomes the
    /// seed for the next tick, so ticks are strictly sequential.
    pub fn advance_tick(&mut self) -> Result<TickRecord, SimError> {
        let record = run_market_tick(
            self.tick,
            &mut self.traders,
            &mut self.rng,
            self.config.avg_drift,
            self.config.std_dev,
            self.current_price,
        )?;

        self.current_price = record.price;
        self.series.push(record);
        self.tick += 1;
        Ok(record)
    }

    /// Run `ticks` further ticks.
    pub fn run(&mut self, ticks: u64) -> Result<(), SimError> {
        for _ in 0..ticks {
            self.advance_tick()?;
        }
        Ok(())
    }

    /// Run `ticks` further ticks, informing `sink` with `(tick, price)`
    /// every `progress_every` ticks. Purely observational; nothing in the
    /// simulation depends on the sink.
    pub fn run_with_progress(
        &mut self,
        ticks: u64,
        mut sink: impl FnMut(u64, Price),
    ) -> Result<(), SimError> {
        let every = self.config.progress_every.max(1);
        for _ in 0..ticks {
            let record = self.advance_tick()?;
            if record.tick % every == 0 {
                sink(record.tick, record.price);

                #[cfg(feature = "instrument")]
                tracing::info!(target: "progress", tick = record.tick, price = record.price);
            }
        }
        Ok(())
    }

    /// Run the whole configured span.
    pub fn run_to_completion(&mut self) -> Result<(), SimError> {
        self.run(self.config.tick_count)
    }
}
