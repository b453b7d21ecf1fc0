//! Research-question report built from frequency tables.
//!
//! Every count and percentage here is read off a [`FrequencyTable`] when the
//! report is built; nothing is carried over from an earlier run.

use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;
use std::io;
use tabled::{Table, Tabled};

use crate::aggregate::{aggregate, aggregate_by, FrequencyTable};
use crate::binning::BinLabel;
use crate::dataset::Dataset;
use crate::describe::missing_values;
use crate::error::{AnalysisError, Result};

pub const AGE_DISTRIBUTION: &str = "Patients by age group";
pub const OUTCOME_BY_AGE: &str = "Attendance by age group";
pub const OUTCOME_BY_GENDER: &str = "Attendance by gender";
pub const OUTCOME: &str = "Attendance";
pub const GENDER: &str = "Patients by gender";
pub const SMS: &str = "SMS reminders";
pub const OUTCOME_BY_SMS: &str = "Attendance by SMS reminder";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub group: Option<String>,
    pub count: usize,
    pub percentage: f64,
}

/// One labelled series of counts, with percentages relative to `total`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub total: usize,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    pub fn from_table<K: Ord + fmt::Display>(title: &str, table: &FrequencyTable<K>) -> Self {
        let rows = table
            .iter()
            .map(|(key, count)| ReportRow {
                label: key.to_string(),
                group: None,
                count,
                percentage: table.percentage(key),
            })
            .collect();

        Self {
            title: title.to_string(),
            total: table.total(),
            rows,
        }
    }

    pub fn from_cross_table<K1, K2>(title: &str, table: &FrequencyTable<(K1, K2)>) -> Self
    where
        K1: Ord + fmt::Display,
        K2: Ord + fmt::Display,
    {
        let rows = table
            .iter()
            .map(|(key, count)| ReportRow {
                label: key.0.to_string(),
                group: Some(key.1.to_string()),
                count,
                percentage: table.percentage(key),
            })
            .collect();

        Self {
            title: title.to_string(),
            total: table.total(),
            rows,
        }
    }

    /// Row for `label` (and `group`, for cross-tabulated sections)
    pub fn row(&self, label: &str, group: Option<&str>) -> Option<&ReportRow> {
        self.rows
            .iter()
            .find(|r| r.label == label && r.group.as_deref() == group)
    }
}

/// What the raw file looked like and what cleaning changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub rows: usize,
    pub columns: usize,
    pub missing: Vec<(String, usize)>,
    pub duplicates: usize,
    pub min_age_raw: Option<i64>,
    pub min_age_clean: Option<i64>,
    pub removed: usize,
}

impl Inspection {
    pub fn new(df: &DataFrame, raw: &Dataset, cleaned: &Dataset) -> Self {
        Self {
            rows: df.height(),
            columns: df.width(),
            missing: missing_values(df),
            duplicates: raw.duplicate_count(),
            min_age_raw: raw.min_age(),
            min_age_clean: cleaned.min_age(),
            removed: raw.len().saturating_sub(cleaned.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub inspection: Inspection,
    pub sections: Vec<ReportSection>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    section: &'a str,
    label: &'a str,
    group: Option<&'a str>,
    count: usize,
    percentage: f64,
}

impl AnalysisReport {
    /// Builds every section from `dataset` and its age bins.
    ///
    /// `age_bins` must be parallel to `dataset.records()`.
    pub fn build(dataset: &Dataset, age_bins: &[BinLabel], inspection: Inspection) -> Result<Self> {
        if age_bins.len() != dataset.len() {
            return Err(AnalysisError::Misaligned {
                records: dataset.len(),
                labels: age_bins.len(),
            });
        }

        let records = dataset.records();

        let age_table = aggregate(age_bins.iter(), |bin| (*bin).clone());
        let outcome_by_age = aggregate_by(
            records.iter().zip(age_bins),
            |(r, _)| r.outcome,
            |(_, bin)| (*bin).clone(),
        );
        let outcome_by_gender = aggregate_by(records, |r| r.outcome, |r| r.gender);
        let outcome = aggregate(records, |r| r.outcome);
        let gender = aggregate(records, |r| r.gender);
        let sms = aggregate(records, |r| r.sms);
        let outcome_by_sms = aggregate_by(records, |r| r.outcome, |r| r.sms);

        Ok(Self {
            inspection,
            sections: vec![
                ReportSection::from_table(AGE_DISTRIBUTION, &age_table),
                ReportSection::from_cross_table(OUTCOME_BY_AGE, &outcome_by_age),
                ReportSection::from_cross_table(OUTCOME_BY_GENDER, &outcome_by_gender),
                ReportSection::from_table(OUTCOME, &outcome),
                ReportSection::from_table(GENDER, &gender),
                ReportSection::from_table(SMS, &sms),
                ReportSection::from_cross_table(OUTCOME_BY_SMS, &outcome_by_sms),
            ],
        })
    }

    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// One CSV row per section row: `section,label,group,count,percentage`
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for section in &self.sections {
            for row in &section.rows {
                writer.serialize(CsvRow {
                    section: &section.title,
                    label: &row.label,
                    group: row.group.as_deref(),
                    count: row.count,
                    percentage: row.percentage,
                })?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inspection = &self.inspection;
        writeln!(f, "Shape: {} rows x {} columns", inspection.rows, inspection.columns)?;
        writeln!(f, "Duplicated rows: {}", inspection.duplicates)?;
        let missing: usize = inspection.missing.iter().map(|(_, n)| n).sum();
        writeln!(f, "Missing values: {}", missing)?;
        writeln!(
            f,
            "Rows removed for negative age: {} (min age {} -> {})",
            inspection.removed,
            display_age(inspection.min_age_raw),
            display_age(inspection.min_age_clean)
        )?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", format_section_table(section))?;
        }

        Ok(())
    }
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Percentage")]
    percentage: String,
}

#[derive(Tabled)]
struct CrossTableRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Percentage")]
    percentage: String,
}

/// Renders `section` as a titled ASCII table followed by its total
fn format_section_table(section: &ReportSection) -> String {
    let underline = "=".repeat(section.title.len());
    if section.rows.is_empty() {
        return format!("{}\n{}\nNo data", section.title, underline);
    }

    let cross = section.rows.iter().any(|r| r.group.is_some());
    let table = if cross {
        Table::new(section.rows.iter().map(|r| CrossTableRow {
            label: r.label.clone(),
            group: r.group.clone().unwrap_or_default(),
            count: r.count,
            percentage: format!("{:.2}%", r.percentage),
        }))
    } else {
        Table::new(section.rows.iter().map(|r| TableRow {
            label: r.label.clone(),
            count: r.count,
            percentage: format!("{:.2}%", r.percentage),
        }))
    };

    format!("{}\n{}\n{}\nTotal: {}", section.title, underline, table, section.total)
}

fn display_age(age: Option<i64>) -> String {
    age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
}
