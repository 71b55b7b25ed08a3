use crate::frequency::{FrequencyCounter, FrequencyTable, RawFrequencies};
use crate::scanner::resolve_paths;
use arrow::array::{Array, ArrowPrimitiveType, AsArray, PrimitiveArray};
use arrow::datatypes::*;
use log::debug;
use numgen_common::{NumgenError, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies the value distribution of a named attribute.
pub trait FrequencySource: Sync {
    fn frequency_table(&self, attribute: &str) -> Result<RawFrequencies>;
}

impl FrequencySource for HashMap<String, FrequencyTable> {
    fn frequency_table(&self, attribute: &str) -> Result<RawFrequencies> {
        self.get(attribute)
            .cloned()
            .map(RawFrequencies::from)
            .ok_or_else(|| NumgenError::UnknownColumn(attribute.to_owned()))
    }
}

/// Column types whose values can be binned.
pub fn is_binnable(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
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

/// Counts attribute values across one or more Parquet files.
pub struct ParquetFrequencySource {
    paths: Vec<PathBuf>,
    batch_size: usize,
}

impl ParquetFrequencySource {
    pub fn new(paths: Vec<PathBuf>, batch_size: usize) -> Self {
        Self { paths, batch_size: batch_size.max(1) }
    }

    /// Resolve `input` (file, directory or glob) into a source.
    pub fn open(input: &str, batch_size: usize) -> Result<Self> {
        let paths = resolve_paths(input)?;
        if paths.is_empty() {
            return Err(NumgenError::Other(format!("no Parquet files found: {input}")));
        }
        Ok(Self::new(paths, batch_size))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrequencySource for ParquetFrequencySource {
    fn frequency_table(&self, attribute: &str) -> Result<RawFrequencies> {
        let counters: Vec<Result<FrequencyCounter>> = self
            .paths
            .par_iter()
            .map(|p| count_file(p, attribute, self.batch_size))
            .collect();
        let mut total = FrequencyCounter::new();
        for c in counters {
            total.merge(c?);
        }
        let raw = total.finish()?;
        debug!(
            "{attribute}: {} distinct values, {} records, {} nulls across {} file(s)",
            raw.table.len(),
            raw.table.total_count(),
            raw.null_count,
            self.paths.len()
        );
        Ok(raw)
    }
}

fn count_file(path: &Path, column: &str, batch_size: usize) -> Result<FrequencyCounter> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let index = schema
        .fields()
        .iter()
        .position(|f| f.name() == column)
        .ok_or_else(|| NumgenError::UnknownColumn(format!("{column} (in {})", path.display())))?;
    let data_type = schema.field(index).data_type();
    if !is_binnable(data_type) {
        return Err(NumgenError::UnsupportedType {
            column: column.to_owned(),
            data_type: data_type.to_string(),
        });
    }
    let mask = parquet::arrow::ProjectionMask::roots(builder.parquet_schema(), [index]);
    let reader = builder
        .with_projection(mask)
        .with_batch_size(batch_size)
        .build()?;

    let mut counter = FrequencyCounter::new();
    for batch in reader {
        let batch = batch?;
        count_column(batch.column(0).as_ref(), column, &mut counter)?;
    }
    Ok(counter)
}

fn count_column(array: &dyn Array, column: &str, counter: &mut FrequencyCounter) -> Result<()> {
    match array.data_type() {
        DataType::Int8 => count_integers(array.as_primitive::<Int8Type>(), column, counter),
        DataType::Int16 => count_integers(array.as_primitive::<Int16Type>(), column, counter),
        DataType::Int32 => count_integers(array.as_primitive::<Int32Type>(), column, counter),
        DataType::Int64 => count_integers(array.as_primitive::<Int64Type>(), column, counter),
        DataType::UInt8 => count_integers(array.as_primitive::<UInt8Type>(), column, counter),
        DataType::UInt16 => count_integers(array.as_primitive::<UInt16Type>(), column, counter),
        DataType::UInt32 => count_integers(array.as_primitive::<UInt32Type>(), column, counter),
        DataType::UInt64 => count_integers(array.as_primitive::<UInt64Type>(), column, counter),
        DataType::Float32 => count_floats(array.as_primitive::<Float32Type>(), column, counter),
        DataType::Float64 => count_floats(array.as_primitive::<Float64Type>(), column, counter),
        other => Err(NumgenError::UnsupportedType {
            column: column.to_owned(),
            data_type: other.to_string(),
        }),
    }
}

fn count_integers<T>(array: &PrimitiveArray<T>, column: &str, counter: &mut FrequencyCounter) -> Result<()>
where
    T: ArrowPrimitiveType,
    i64: TryFrom<T::Native>,
{
    for v in array.iter() {
        let Some(v) = v else {
            counter.add_null();
            continue;
        };
        let v = i64::try_from(v).map_err(|_| {
            NumgenError::InvalidInput(format!("column {column} holds a value beyond the i64 range"))
        })?;
        counter.add(v);
    }
    Ok(())
}

// stored as float but must hold whole numbers, e.g. 1984.0
fn count_floats<T>(array: &PrimitiveArray<T>, column: &str, counter: &mut FrequencyCounter) -> Result<()>
where
    T: ArrowPrimitiveType,
    T::Native: Into<f64>,
{
    for v in array.iter() {
        let Some(v) = v else {
            counter.add_null();
            continue;
        };
        let v: f64 = v.into();
        if !v.is_finite() || v.fract() != 0.0 || v < i64::MIN as f64 || v >= i64::MAX as f64 {
            return Err(NumgenError::InvalidInput(format!(
                "column {column} holds non-integer value {v}"
            )));
        }
        counter.add(v as i64);
    }
    Ok(())
}
