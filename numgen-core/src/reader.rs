use crate::source::is_binnable;
use bytes::Bytes;
use memmap2::Mmap;
use numgen_common::Result;
use parquet::arrow::parquet_to_arrow_schema;
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParquetFileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub row_count: i64,
    pub row_group_count: usize,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub physical_type: String,
    pub logical_type: Option<String>,
    pub arrow_type: Option<String>, // None for nested leaves without a top-level field
    pub binnable: bool,
}

/// Read footer metadata and describe each column's type and whether it can be binned.
pub fn open_parquet_file(path: &Path) -> Result<ParquetFileInfo> {
    let file = std::fs::File::open(path)?;
    let file_size = file.metadata()?.len();
    // memory-map the file for zero-copy footer access
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    let bytes = Bytes::copy_from_slice(&mmap);
    let reader = SerializedFileReader::new(bytes)?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();
    let descr = file_meta.schema_descr();
    let arrow_schema = parquet_to_arrow_schema(descr, file_meta.key_value_metadata())?;
    let columns = (0..descr.num_columns())
        .map(|i| {
            let col = descr.column(i);
            let field = arrow_schema.field_with_name(col.name()).ok();
            ColumnInfo {
                name: col.name().to_owned(),
                physical_type: format!("{:?}", col.physical_type()),
                logical_type: col.logical_type().map(|lt| format!("{lt:?}")),
                arrow_type: field.map(|f| f.data_type().to_string()),
                binnable: field.is_some_and(|f| is_binnable(f.data_type())),
            }
        })
        .collect();
    let row_count: i64 = (0..meta.num_row_groups())
        .map(|i| meta.row_group(i).num_rows())
        .sum();
    Ok(ParquetFileInfo {
        path: path.to_path_buf(),
        file_size,
        row_count,
        row_group_count: meta.num_row_groups(),
        columns,
    })
}
