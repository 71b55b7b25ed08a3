pub mod config;
pub use config::{AttributeConfig, AttributeSpec, BinningConfig, Config, ExportConfig, SentinelConfig, SentinelPolicy};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NumgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid frequency table: {0}")]
    InvalidInput(String),
    #[error("invalid minimum bin size {0}: must be greater than zero")]
    InvalidBinSize(u64),
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("column {column} has unsupported type {data_type} (expected integer or float)")]
    UnsupportedType { column: String, data_type: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NumgenError>;
