use wasm_bindgen::prelude::*;

mod agents;
mod config;
mod market;
mod rng;
mod state;
mod tick;
mod types;
mod world;

pub use agents::*;
pub use config::*;
pub use market::*;
pub use rng::*;
pub use state::*;
pub use tick::*;
pub use types::*;
pub use world::*;

// ============================================================================
// WASM API - Simulation
// ============================================================================

/// Handle through which a JS frontend drives the simulation and pulls the
/// recorded series for chart rendering. All market logic lives in [`World`];
/// this layer only translates across the boundary.
#[wasm_bindgen]
pub struct Simulation {
    world: World,
}

#[wasm_bindgen]
impl Simulation {
    #[wasm_bindgen(constructor)]
    pub fn new(config: SimConfig) -> Result<Simulation, JsError> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Ok(Self {
            world: World::new(config)?,
        })
    }

    /// Create a simulation with the reference parameter set.
    #[wasm_bindgen]
    pub fn with_defaults() -> Result<Simulation, JsError> {
        Self::new(SimConfig::default())
    }

    /// Create a simulation from a JSON configuration string. Missing fields
    /// fall back to the defaults.
    #[wasm_bindgen]
    pub fn from_json(json: &str) -> Result<Simulation, JsError> {
        Ok(Self {
            world: World::new(SimConfig::from_json(json)?)?,
        })
    }

    /// Advance the simulation by one tick.
    #[wasm_bindgen]
    pub fn advance_tick(&mut self) -> Result<(), JsError> {
        self.world.advance_tick()?;
        Ok(())
    }

    /// Run `ticks` further ticks.
    #[wasm_bindgen]
    pub fn run(&mut self, ticks: u32) -> Result<(), JsError> {
        self.world.run(ticks as u64)?;
        Ok(())
    }

    /// Run the configured tick count in one call.
    #[wasm_bindgen]
    pub fn run_to_completion(&mut self) -> Result<(), JsError> {
        self.world.run_to_completion()?;
        Ok(())
    }

    /// Get the current tick.
    #[wasm_bindgen]
    pub fn get_tick(&self) -> u64 {
        self.world.tick
    }

    /// Price resolved by the most recent tick (the initial price before any
    /// tick has run).
    #[wasm_bindgen]
    pub fn current_price(&self) -> f64 {
        self.world.current_price
    }

    /// Label describing this run's parameters, for naming chart output.
    #[wasm_bindgen]
    pub fn param_id(&self) -> String {
        self.world.config().param_id()
    }

    /// Snapshot of at most `max_points` evenly spaced records (0 = all).
    #[wasm_bindgen]
    pub fn series_snapshot(&self, max_points: usize) -> SeriesSnapshot {
        SeriesSnapshot {
            ticks: self.world.series.downsample(max_points),
        }
    }

    /// Price per completed tick as a typed array (no JSON round-trip).
    #[wasm_bindgen]
    pub fn prices(&self) -> js_sys::Float64Array {
        collect_f64(self.world.series.records().iter().map(|r| r.price))
    }

    /// Reported volume per completed tick.
    #[wasm_bindgen]
    pub fn volumes(&self) -> js_sys::Float64Array {
        collect_f64(self.world.series.records().iter().map(|r| r.volume))
    }

    /// Participant count per completed tick.
    #[wasm_bindgen]
    pub fn participants(&self) -> js_sys::Uint32Array {
        let counts: Vec<u32> = self
            .world
            .series
            .records()
            .iter()
            .map(|r| r.participants)
            .collect();
        js_sys::Uint32Array::from(counts.as_slice())
    }
}

fn collect_f64(values: impl Iterator<Item = f64>) -> js_sys::Float64Array {
    let values: Vec<f64> = values.collect();
    js_sys::Float64Array::from(values.as_slice())
}
