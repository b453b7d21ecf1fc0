use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

use crate::binning::BinError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not load {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("missing value in column {column:?} at row {row}")]
    MissingValue { column: &'static str, row: usize },
    #[error("unrecognised value {value:?} in column {column:?} at row {row}")]
    InvalidValue {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("invalid configuration value {value:?} for {key}")]
    Config { key: &'static str, value: String },
    #[error("{labels} age bins for {records} records")]
    Misaligned { records: usize, labels: usize },
    #[error("binning failed: {0}")]
    Binning(#[from] BinError),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
