//! Column-oriented capture of simulation events.
//!
//! The market core emits `tracing` events — `target: "tick"`, `"order"`,
//! `"fill"`, `"progress"` — with structured fields. [`TableSubscriber`]
//! turns each target into a table and each field into a typed column, so a
//! run's history can be pulled into polars for analysis or written to
//! parquet for external chart tooling.
//!
//! ```ignore
//! instrument::install_subscriber();
//! // ... run the simulation ...
//! let recorder = instrument::drain();
//! let ticks = &recorder.tables["tick"];
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

// === TABLES ===

/// A column of values of one primitive type. The type is fixed by the first
/// event that records the field.
#[derive(Debug, Clone)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow to `len` with default-valued cells. Never shrinks.
    fn pad_to(&mut self, len: usize) {
        match self {
            TypedColumn::U64(v) if v.len() < len => v.resize(len, 0),
            TypedColumn::I64(v) if v.len() < len => v.resize(len, 0),
            TypedColumn::F64(v) if v.len() < len => v.resize(len, 0.0),
            TypedColumn::Str(v) if v.len() < len => v.resize(len, String::new()),
            _ => {}
        }
    }
}

/// One event target's history: a column per field, a row per event.
/// Fields absent from an event get a default-valued cell, so columns never
/// go ragged even when the schema grows mid-run.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl EventTable {
    fn pad_columns(&mut self) {
        for col in self.columns.values_mut() {
            col.pad_to(self.row_count);
        }
    }
}

/// Collection of tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, EventTable>,
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

// === EVENT CAPTURE ===

/// Extracts event fields into table columns. New columns are pre-padded to
/// the current row count so earlier rows stay aligned.
struct ColumnVisitor<'a> {
    table: &'a mut EventTable,
    row_count: usize,
}

impl Visit for ColumnVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        let col = self
            .table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| TypedColumn::U64(vec![0; self.row_count]));
        if let TypedColumn::U64(v) = col {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        let col = self
            .table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| TypedColumn::I64(vec![0; self.row_count]));
        if let TypedColumn::I64(v) = col {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let col = self
            .table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| TypedColumn::F64(vec![0.0; self.row_count]));
        if let TypedColumn::F64(v) = col {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let col = self
            .table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| TypedColumn::Str(vec![String::new(); self.row_count]));
        if let TypedColumn::Str(v) = col {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }
}

/// Subscriber that collects info-level events into the thread-local
/// recorder. Spans are ignored; the simulation only emits events.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();

        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();

            table.pad_columns();
            let row_count = table.row_count;
            event.record(&mut ColumnVisitor { table, row_count });
            table.row_count += 1;
            table.pad_columns();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install [`TableSubscriber`] as the global default. Call once at the
/// start of a run or test.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Drain all recorded data from the thread-local recorder.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Clear all recorded data without returning it.
pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

// === POLARS EXPORT ===

use polars::prelude::*;

impl EventTable {
    /// Convert this table to a polars DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();

        DataFrame::new(columns)
    }
}

impl Recorder {
    /// Convert every table to a polars DataFrame, dropping any that fail.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

/// Drain all recorded data and convert to polars DataFrames.
pub fn drain_to_dataframes() -> HashMap<String, DataFrame> {
    drain().to_dataframes()
}

/// Write every table as `{dir}/{target}.parquet`, then a `_ready` sentinel
/// so watchers know the set is complete.
pub fn save_parquet(
    dfs: &mut HashMap<String, DataFrame>,
    dir: &std::path::Path,
) -> PolarsResult<()> {
    std::fs::create_dir_all(dir).map_err(io_err)?;
    for (name, df) in dfs.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{}.parquet", name))).map_err(io_err)?;
        ParquetWriter::new(file).finish(df)?;
    }
    std::fs::File::create(dir.join("_ready")).map_err(io_err)?;
    Ok(())
}

fn io_err(e: std::io::Error) -> PolarsError {
    PolarsError::IO {
        error: e.into(),
        msg: None,
    }
}

// === RUN RECORDER ===

/// RAII guard for one recorded run: clears and installs the subscriber on
/// creation, writes parquet under `{parent}/{run_name}/` on drop.
///
/// ```ignore
/// let mut rec = instrument::RunRecorder::new("data", &config.param_id());
/// // ... run the simulation ...
/// let dfs = rec.get();
/// analyze(&dfs);
/// ```
pub struct RunRecorder {
    run_dir: std::path::PathBuf,
    dfs: Option<HashMap<String, DataFrame>>,
}

impl RunRecorder {
    pub fn new(parent: impl Into<std::path::PathBuf>, run_name: &str) -> Self {
        let run_dir = parent.into().join(sanitize(run_name));
        clear();
        install_subscriber();
        Self { run_dir, dfs: None }
    }

    /// Drain recorded data and return the DataFrames. The first call drains
    /// the thread-local recorder; later calls return the cached result.
    pub fn get(&mut self) -> &HashMap<String, DataFrame> {
        self.dfs.get_or_insert_with(drain_to_dataframes)
    }

    pub fn run_dir(&self) -> &std::path::Path {
        &self.run_dir
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        let mut dfs = self.dfs.take().unwrap_or_else(drain_to_dataframes);
        if dfs.is_empty() {
            return;
        }
        if let Err(e) = save_parquet(&mut dfs, &self.run_dir) {
            eprintln!(
                "RunRecorder({}): failed to write parquet: {}",
                self.run_dir.display(),
                e
            );
        }
    }
}

/// Directory-safe version of a run label such as `SimConfig::param_id()`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(80)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_events_become_aligned_columns() {
        use tracing::subscriber::with_default;

        clear();
        with_default(TableSubscriber, || {
            tracing::info!(target: "tick", tick = 0u64, price = 100.5f64, participants = 12u64);
            tracing::info!(target: "tick", tick = 1u64, price = 99.25f64, participants = 9u64);
            tracing::info!(target: "tick", tick = 2u64, price = 101.0f64);
        });

        let recorder = drain();
        let table = &recorder.tables["tick"];
        assert_eq!(table.row_count, 3);

        let TypedColumn::U64(ticks) = &table.columns["tick"] else {
            panic!("tick should be a U64 column");
        };
        assert_eq!(ticks, &vec![0, 1, 2]);

        let TypedColumn::F64(prices) = &table.columns["price"] else {
            panic!("price should be an F64 column");
        };
        assert_eq!(prices, &vec![100.5, 99.25, 101.0]);

        // Missing field on the last row is padded with the default.
        let TypedColumn::U64(participants) = &table.columns["participants"] else {
            panic!("participants should be a U64 column");
        };
        assert_eq!(participants, &vec![12, 9, 0]);
    }

    #[test]
    fn late_columns_are_pre_padded() {
        use tracing::subscriber::with_default;

        clear();
        with_default(TableSubscriber, || {
            tracing::info!(target: "fill", tick = 0u64, side = "buy");
            tracing::info!(target: "fill", tick = 1u64, side = "sell", price = 98.0f64);
        });

        let recorder = drain();
        let table = &recorder.tables["fill"];
        assert_eq!(table.row_count, 2);

        // `price` first appeared in row 1, so row 0 holds the default.
        let TypedColumn::F64(prices) = &table.columns["price"] else {
            panic!("price should be an F64 column");
        };
        assert_eq!(prices, &vec![0.0, 98.0]);

        let TypedColumn::Str(sides) = &table.columns["side"] else {
            panic!("side should be a Str column");
        };
        assert_eq!(sides, &vec!["buy".to_string(), "sell".to_string()]);
    }

    #[test]
    fn tables_convert_to_dataframes() {
        let mut table = EventTable::default();
        table
            .columns
            .insert("tick".to_string(), TypedColumn::U64(vec![0, 1, 2]));
        table.columns.insert(
            "volume".to_string(),
            TypedColumn::F64(vec![10.0, 12.5, 11.0]),
        );
        table.row_count = 3;

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 2);
    }
}
