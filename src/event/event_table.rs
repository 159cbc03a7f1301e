use std::path::PathBuf;
use std::time::Instant;

use fnv::FnvHashMap;
use polars::prelude::*;

use super::baby::{Baby, EventSource, MapBaby, Value};
use super::expression::{FieldKind, FieldSchema};
use crate::error::HepError;

#[derive(Debug, Clone)]
enum ColumnData {
    Scalar(Vec<f64>),
    Vector(Vec<Vec<f64>>),
}

/// Columnar event storage. Columns are converted to plain `f64` vectors
/// once so per-event evaluation never touches polars.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    columns: FnvHashMap<String, ColumnData>,
    height: usize,
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn to_f64_vec(series: &Series) -> Result<Vec<f64>, HepError> {
    let series = series.cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

impl EventTable {
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, HepError> {
        let mut columns = FnvHashMap::default();
        for column in df.columns() {
            let name = column.name().to_string();
            let series = column.as_materialized_series();
            match series.dtype() {
                DataType::List(inner) if is_numeric(&inner) => {
                    let mut rows = Vec::with_capacity(series.len());
                    for entry in series.list()? {
                        rows.push(match entry {
                            Some(values) => to_f64_vec(&values)?,
                            None => Vec::new(),
                        });
                    }
                    columns.insert(name, ColumnData::Vector(rows));
                }
                dtype if is_numeric(dtype) => {
                    columns.insert(name, ColumnData::Scalar(to_f64_vec(series)?));
                }
                dtype => log::debug!("Skipping column '{name}' with type {dtype:?}"),
            }
        }

        Ok(EventTable {
            columns,
            height: df.height(),
        })
    }

    /// Scans one or more parquet files as a single table. When `columns`
    /// is given only those columns are read.
    pub fn from_parquet(files: &[PathBuf], columns: Option<&[String]>) -> Result<Self, HepError> {
        let start = Instant::now();
        let files_ref = files
            .iter()
            .map(|f| PlRefPath::try_from_path(f))
            .collect::<PolarsResult<Vec<_>>>()?;
        let mut lf = LazyFrame::scan_parquet_files(files_ref.into(), ScanArgsParquet::default())?;
        if let Some(columns) = columns {
            lf = lf.select(columns.iter().map(|c| col(c.as_str())).collect::<Vec<_>>());
        }
        let df = lf.collect()?;
        let table = Self::from_dataframe(&df)?;
        log::info!(
            "Loaded {} events from {} file(s) in {:?}",
            table.height,
            files.len(),
            start.elapsed()
        );
        Ok(table)
    }

    /// Builds a table from in-memory events. Every event must provide the
    /// same fields as the first one; missing entries become NaN or empty.
    pub fn from_records(records: &[MapBaby], schema: &FieldSchema, fields: &[&str]) -> Self {
        let mut columns = FnvHashMap::default();
        for &field in fields {
            let data = match schema.kind(field) {
                Some(FieldKind::Vector) => ColumnData::Vector(
                    records
                        .iter()
                        .map(|r| r.vector(field).map(<[f64]>::to_vec).unwrap_or_default())
                        .collect(),
                ),
                _ => ColumnData::Scalar(
                    records
                        .iter()
                        .map(|r| r.scalar(field).unwrap_or(f64::NAN))
                        .collect(),
                ),
            };
            columns.insert(field.to_owned(), data);
        }
        EventTable {
            columns,
            height: records.len(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn schema(&self) -> FieldSchema {
        let mut schema = FieldSchema::new();
        let mut names: Vec<_> = self.columns.keys().collect();
        names.sort();
        for name in names {
            let kind = match self.columns.get(name) {
                Some(ColumnData::Vector(_)) => FieldKind::Vector,
                _ => FieldKind::Scalar,
            };
            schema.insert(name, kind);
        }
        schema
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { table: self, index }
    }

    pub fn value(&self, field: &str, index: usize) -> Option<Value> {
        match self.columns.get(field)? {
            ColumnData::Scalar(v) => v.get(index).map(|x| Value::Scalar(*x)),
            ColumnData::Vector(v) => v.get(index).map(|x| Value::Vector(x.clone())),
        }
    }
}

/// A view of one event of an [`EventTable`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a EventTable,
    index: usize,
}

impl Baby for Row<'_> {
    fn scalar(&self, field: &str) -> Option<f64> {
        match self.table.columns.get(field)? {
            ColumnData::Scalar(v) => v.get(self.index).copied(),
            ColumnData::Vector(_) => None,
        }
    }

    fn vector(&self, field: &str) -> Option<&[f64]> {
        match self.table.columns.get(field)? {
            ColumnData::Vector(v) => v.get(self.index).map(Vec::as_slice),
            ColumnData::Scalar(_) => None,
        }
    }
}

impl EventSource for EventTable {
    fn for_each_event(&self, f: &mut dyn FnMut(&dyn Baby)) -> Result<usize, HepError> {
        for index in 0..self.height {
            f(&self.row(index));
        }
        Ok(self.height)
    }

    fn len_hint(&self) -> usize {
        self.height
    }
}
