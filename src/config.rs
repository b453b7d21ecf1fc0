use lazy_static::lazy_static;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

pub const INPUT_VAR: &str = "NOSHOW_INPUT";
pub const FORMAT_VAR: &str = "NOSHOW_FORMAT";
pub const AGE_CUTS_VAR: &str = "NOSHOW_AGE_CUTS";
pub const AGE_LABELS_VAR: &str = "NOSHOW_AGE_LABELS";

static DEFAULT_INPUT: &str = "data/noshowappointments.csv";

lazy_static! {
    pub static ref DEFAULT_AGE_CUT_POINTS: Vec<i64> = (1..=10).map(|decade| decade * 10).collect();
    pub static ref DEFAULT_AGE_LABELS: Vec<String> = [
        "child", "teen", "adult", "40s", "50s", "60s", "70s", "80s", "90s", "100s", "above_100",
    ]
    .iter()
    .map(|label| label.to_string())
    .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(AnalysisError::Config {
                key: FORMAT_VAR,
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub format: OutputFormat,
    pub age_cut_points: Vec<i64>,
    pub age_labels: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            format: OutputFormat::default(),
            age_cut_points: DEFAULT_AGE_CUT_POINTS.clone(),
            age_labels: DEFAULT_AGE_LABELS.clone(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, falling back to the defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(input) = lookup(INPUT_VAR) {
            config.input = PathBuf::from(input);
        }
        if let Some(format) = lookup(FORMAT_VAR) {
            config.format = format.parse()?;
        }
        if let Some(cuts) = lookup(AGE_CUTS_VAR) {
            config.age_cut_points = split_list(&cuts)
                .map(|cut| {
                    cut.parse::<i64>().map_err(|_| AnalysisError::Config {
                        key: AGE_CUTS_VAR,
                        value: cuts.clone(),
                    })
                })
                .collect::<Result<_>>()?;
        }
        if let Some(labels) = lookup(AGE_LABELS_VAR) {
            config.age_labels = split_list(&labels).map(str::to_string).collect();
        }

        // The binner rejects a mismatch too, but only after the file is loaded.
        if config.age_labels.len() != config.age_cut_points.len() + 1 {
            return Err(AnalysisError::Config {
                key: AGE_LABELS_VAR,
                value: config.age_labels.join(","),
            });
        }

        Ok(config)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}
