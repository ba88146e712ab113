//! Event recording for the settlement engine.
//!
//! A `tracing` subscriber turns every engine event into one row of a table
//! named after the event's target (`ledger`, `gather`, `build_state`, ...).
//! Columns are created on first sight of a field and typed by the first value
//! recorded into them. Rows that lack a field get that column's zero value.
//!
//! ```ignore
//! let recorder = instrument::record(|| {
//!     state.advance(1.0);
//! });
//! let gather = recorder.table("gather").unwrap();
//! assert_eq!(gather.u64s("units"), Some(&[1][..]));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Level, Metadata, Subscriber};

// === COLUMNS ===

#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append zero values until the column holds `rows` entries
    fn pad_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            TypedColumn::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            TypedColumn::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            TypedColumn::F64(v) => v.extend(std::iter::repeat_n(0.0, missing)),
            TypedColumn::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            TypedColumn::Str(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }
}

// === TABLES ===

/// All events recorded under one target.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl EventTable {
    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.get(name)
    }

    pub fn u64s(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            TypedColumn::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn i64s(&self, name: &str) -> Option<&[i64]> {
        match self.columns.get(name)? {
            TypedColumn::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn f64s(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            TypedColumn::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn strs(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name)? {
            TypedColumn::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Number of rows whose string column `name` equals `value`
    pub fn count_where(&self, name: &str, value: &str) -> usize {
        self.strs(name)
            .map(|v| v.iter().filter(|s| s.as_str() == value).count())
            .unwrap_or(0)
    }

    /// Sum of an integer column, whichever signedness it was recorded with
    pub fn sum(&self, name: &str) -> i64 {
        match self.columns.get(name) {
            Some(TypedColumn::U64(v)) => v.iter().map(|x| *x as i64).sum(),
            Some(TypedColumn::I64(v)) => v.iter().sum(),
            _ => 0,
        }
    }

    fn finish_row(&mut self) {
        self.row_count += 1;
        let rows = self.row_count;
        for column in self.columns.values_mut() {
            column.pad_to(rows);
        }
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, EventTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    /// Rows recorded under `target`, zero if none
    pub fn row_count(&self, target: &str) -> usize {
        self.tables.get(target).map(|t| t.row_count).unwrap_or(0)
    }

    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        targets.sort_unstable();
        targets
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

// === SUBSCRIBER ===

/// Writes one event's fields into the current row of a table.
struct RowVisitor<'a> {
    table: &'a mut EventTable,
}

impl RowVisitor<'_> {
    fn column(&mut self, field: &Field, empty: impl FnOnce(usize) -> TypedColumn) -> &mut TypedColumn {
        let rows = self.table.row_count;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| empty(rows))
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let TypedColumn::U64(v) = self.column(field, |n| TypedColumn::U64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let TypedColumn::I64(v) = self.column(field, |n| TypedColumn::I64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let TypedColumn::F64(v) = self.column(field, |n| TypedColumn::F64(vec![0.0; n])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let TypedColumn::Bool(v) = self.column(field, |n| TypedColumn::Bool(vec![false; n])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let TypedColumn::Str(v) =
            self.column(field, |n| TypedColumn::Str(vec![String::new(); n]))
        {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }
}

/// Tracing subscriber that appends events at or above `min_level` to the
/// thread-local recorder. Spans are ignored. Each row also gets a `level`
/// column so warnings can be told apart from regular events.
pub struct EventSubscriber {
    min_level: Level,
}

impl EventSubscriber {
    pub fn new(min_level: Level) -> Self {
        Self { min_level }
    }
}

impl Default for EventSubscriber {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Subscriber for EventSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= self.min_level
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let metadata = event.metadata();
        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder
                .tables
                .entry(metadata.target().to_string())
                .or_default();

            let mut visitor = RowVisitor { table };
            event.record(&mut visitor);
            let rows = visitor.table.row_count;
            if let TypedColumn::Str(levels) = visitor
                .table
                .columns
                .entry("level".to_string())
                .or_insert_with(|| TypedColumn::Str(vec![String::new(); rows]))
            {
                levels.push(metadata.level().to_string());
            }
            visitor.table.finish_row();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the subscriber as the process-wide default. Later calls are no-ops.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(EventSubscriber::default());
}

/// Take everything recorded on this thread so far
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with a scoped subscriber and return only the events it emitted
pub fn record(f: impl FnOnce()) -> Recorder {
    clear();
    tracing::subscriber::with_default(EventSubscriber::default(), f);
    drain()
}

// === POLARS ===

use polars::prelude::*;

impl EventTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<&String> = self.columns.keys().collect();
        names.sort();

        let columns: Vec<Column> = names
            .into_iter()
            .map(|name| match &self.columns[name] {
                TypedColumn::U64(v) => Column::new(name.as_str().into(), v),
                TypedColumn::I64(v) => Column::new(name.as_str().into(), v),
                TypedColumn::F64(v) => Column::new(name.as_str().into(), v),
                TypedColumn::Bool(v) => Column::new(name.as_str().into(), v),
                TypedColumn::Str(v) => Column::new(name.as_str().into(), v),
            })
            .collect();

        DataFrame::new(columns)
    }
}

impl Recorder {
    pub fn to_dataframes(&self) -> PolarsResult<HashMap<String, DataFrame>> {
        self.tables
            .iter()
            .map(|(target, table)| Ok((target.clone(), table.to_dataframe()?)))
            .collect()
    }
}

pub fn drain_to_dataframes() -> PolarsResult<HashMap<String, DataFrame>> {
    drain().to_dataframes()
}
