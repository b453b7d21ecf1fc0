//! Exploratory analysis of the medical appointment no-show dataset.
//!
//! The pipeline reads the CSV into a polars frame, converts it into typed
//! [`records::AppointmentRecord`]s, drops rows with a negative age, bins ages
//! into labelled ranges and reports frequency tables for the attendance
//! questions.

pub mod aggregate;
pub mod binning;
pub mod config;
pub mod dataset;
pub mod describe;
pub mod error;
pub mod loader;
pub mod records;
pub mod report;

pub use aggregate::{aggregate, aggregate_by, FrequencyTable};
pub use binning::{bin, BinDefinition, BinError, BinLabel};
pub use config::{AnalysisConfig, OutputFormat};
pub use dataset::Dataset;
pub use describe::{correlation, describe, missing_values};
pub use error::{AnalysisError, Result};
pub use report::{AnalysisReport, Inspection};
