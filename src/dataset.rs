use log::{debug, warn};
use polars::prelude::*;
use std::collections::HashSet;

use crate::binning::{bin, BinLabel};
use crate::error::{AnalysisError, Result};
use crate::records::*;

/// Ordered collection of appointment records; a record is identified by its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<AppointmentRecord>,
}

impl From<Vec<AppointmentRecord>> for Dataset {
    fn from(records: Vec<AppointmentRecord>) -> Self {
        Self { records }
    }
}

impl Dataset {
    /// Converts a frame read with [`AppointmentRecord::raw_schema`] into typed records.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let patient_ids = df.column(PATIENT_ID)?.f64()?;
        let appointment_ids = df.column(APPOINTMENT_ID)?.i64()?;
        let genders = df.column(GENDER)?.utf8()?;
        let scheduled = df.column(SCHEDULED_DAY)?.utf8()?;
        let appointment_days = df.column(APPOINTMENT_DAY)?.utf8()?;
        let ages = df.column(AGE)?.i64()?;
        let neighbourhoods = df.column(NEIGHBOURHOOD)?.utf8()?;
        let scholarships = df.column(SCHOLARSHIP)?.i32()?;
        let hypertension = df.column(HYPERTENSION)?.i32()?;
        let diabetes = df.column(DIABETES)?.i32()?;
        let alcoholism = df.column(ALCOHOLISM)?.i32()?;
        let handicaps = df.column(HANDICAP)?.i32()?;
        let sms = df.column(SMS_RECEIVED)?.i32()?;
        let outcomes = df.column(NO_SHOW)?.utf8()?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let handicap = handicaps
                .get(row)
                .map(|h| {
                    u8::try_from(h).map_err(|_| AnalysisError::InvalidValue {
                        column: HANDICAP,
                        row,
                        value: h.to_string(),
                    })
                })
                .transpose()?;

            records.push(AppointmentRecord {
                patient_id: patient_ids.get(row),
                appointment_id: appointment_ids.get(row),
                gender: parse(genders.get(row), GENDER, row)?,
                scheduled_day: scheduled.get(row).map(str::to_string),
                appointment_day: appointment_days.get(row).map(str::to_string),
                age: required(ages.get(row), AGE, row)?,
                neighbourhood: neighbourhoods.get(row).map(str::to_string),
                scholarship: optional_flag(scholarships.get(row), SCHOLARSHIP, row)?,
                hypertension: optional_flag(hypertension.get(row), HYPERTENSION, row)?,
                diabetes: optional_flag(diabetes.get(row), DIABETES, row)?,
                alcoholism: optional_flag(alcoholism.get(row), ALCOHOLISM, row)?,
                handicap,
                sms: flag(sms.get(row), SMS_RECEIVED, row)?.into(),
                outcome: parse(outcomes.get(row), NO_SHOW, row)?,
            });
        }

        debug!("converted {} rows into appointment records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ages(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.age).collect()
    }

    pub fn min_age(&self) -> Option<i64> {
        self.records.iter().map(|r| r.age).min()
    }

    /// Removes every record with a negative age. Applying it to a clean dataset
    /// returns it unchanged.
    pub fn drop_invalid_age(self) -> Self {
        let before = self.records.len();
        let records: Vec<AppointmentRecord> =
            self.records.into_iter().filter(|r| r.age >= 0).collect();

        let removed = before - records.len();
        if removed > 0 {
            warn!("dropped {} record(s) with a negative age", removed);
        }

        Self { records }
    }

    /// Number of rows identical to an earlier row
    pub fn duplicate_count(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.records.len());
        self.records
            .iter()
            .filter(|r| !seen.insert(r.row_key()))
            .count()
    }

    /// Age bin of every record, parallel to [`Dataset::records`].
    pub fn bin_ages<S: AsRef<str>>(&self, cut_points: &[i64], labels: &[S]) -> Result<Vec<BinLabel>> {
        Ok(bin(&self.ages(), cut_points, labels)?)
    }
}

fn required<T>(value: Option<T>, column: &'static str, row: usize) -> Result<T> {
    value.ok_or(AnalysisError::MissingValue { column, row })
}

fn parse<T: std::str::FromStr>(value: Option<&str>, column: &'static str, row: usize) -> Result<T> {
    let value = required(value, column, row)?;
    value.parse().map_err(|_| AnalysisError::InvalidValue {
        column,
        row,
        value: value.to_string(),
    })
}

fn flag(value: Option<i32>, column: &'static str, row: usize) -> Result<bool> {
    optional_flag(value, column, row)?.ok_or(AnalysisError::MissingValue { column, row })
}

fn optional_flag(value: Option<i32>, column: &'static str, row: usize) -> Result<Option<bool>> {
    match value {
        None => Ok(None),
        Some(0) => Ok(Some(false)),
        Some(1) => Ok(Some(true)),
        Some(other) => Err(AnalysisError::InvalidValue {
            column,
            row,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(age: i64, gender: Gender, sms: bool, outcome: Outcome) -> AppointmentRecord {
        AppointmentRecord {
            patient_id: Some(29872499824296.0),
            appointment_id: Some(5642903 + age),
            gender,
            scheduled_day: Some("2016-04-29T18:38:08Z".to_string()),
            appointment_day: Some("2016-04-29T00:00:00Z".to_string()),
            age,
            neighbourhood: Some("JARDIM DA PENHA".to_string()),
            scholarship: Some(false),
            hypertension: Some(age > 60),
            diabetes: Some(false),
            alcoholism: Some(false),
            handicap: Some(0),
            sms: sms.into(),
            outcome,
        }
    }

    fn with_ages(ages: &[i64]) -> Dataset {
        ages.iter()
            .map(|age| record(*age, Gender::Female, false, Outcome::Show))
            .collect::<Vec<_>>()
            .into()
    }

    fn frame(ages: &[i64], genders: &[&str], outcomes: &[&str]) -> DataFrame {
        let n = ages.len();
        df!(
            PATIENT_ID => vec![1.0f64; n],
            APPOINTMENT_ID => (0..n as i64).collect::<Vec<_>>(),
            GENDER => genders,
            SCHEDULED_DAY => vec!["2016-04-29T18:38:08Z"; n],
            APPOINTMENT_DAY => vec!["2016-04-29T00:00:00Z"; n],
            AGE => ages,
            NEIGHBOURHOOD => vec!["CENTRO"; n],
            SCHOLARSHIP => vec![0i32; n],
            HYPERTENSION => vec![1i32; n],
            DIABETES => vec![0i32; n],
            ALCOHOLISM => vec![0i32; n],
            HANDICAP => vec![2i32; n],
            SMS_RECEIVED => vec![1i32; n],
            NO_SHOW => outcomes
        )
        .unwrap()
    }

    #[test]
    fn test_drop_invalid_age() {
        let cleaned = with_ages(&[-1, 5, 10]).drop_invalid_age();
        assert_eq!(cleaned.ages(), [5, 10]);
        assert_eq!(cleaned.min_age(), Some(5));
    }

    #[test]
    fn test_drop_invalid_age_is_idempotent() {
        let dataset = with_ages(&[3, -2, 0, 80, -1, 41]);
        let once = dataset.clone().drop_invalid_age();
        let twice = once.clone().drop_invalid_age();
        assert_eq!(once, twice);
        assert!(once.len() <= dataset.len());
        assert!(once.min_age().unwrap() >= 0);
    }

    #[test]
    fn test_drop_invalid_age_keeps_order() {
        let cleaned = with_ages(&[7, -1, 2, 9]).drop_invalid_age();
        assert_eq!(cleaned.ages(), [7, 2, 9]);
    }

    #[test]
    fn test_duplicate_count() {
        let mut records = vec![
            record(4, Gender::Male, true, Outcome::Show),
            record(5, Gender::Male, true, Outcome::Show),
        ];
        records.push(records[0].clone());
        records.push(records[0].clone());
        assert_eq!(Dataset::from(records).duplicate_count(), 2);
        assert_eq!(with_ages(&[1, 2, 3]).duplicate_count(), 0);
    }

    #[test]
    fn test_bin_ages_is_parallel_to_records() {
        let dataset = with_ages(&[0, 15, 100, 115]);
        let bins = dataset.bin_ages(&[10, 20], &["a", "b", "c"]).unwrap();
        assert_eq!(bins.len(), dataset.len());
        let labels: Vec<&str> = bins.iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["a", "b", "c", "c"]);
    }

    #[test]
    fn test_bin_ages_of_empty_dataset() {
        let err = Dataset::default().bin_ages(&[10], &["a", "b"]).unwrap_err();
        assert!(matches!(err, AnalysisError::Binning(_)));
    }

    #[test]
    fn test_from_frame() {
        let df = frame(&[62, -1], &["F", "M"], &["No", "Yes"]);
        let dataset = Dataset::from_frame(&df).unwrap();
        let records = dataset.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gender, Gender::Female);
        assert_eq!(records[0].outcome, Outcome::Show);
        assert_eq!(records[1].outcome, Outcome::NoShow);
        assert_eq!(records[1].age, -1);
        assert_eq!(records[0].hypertension, Some(true));
        assert_eq!(records[0].handicap, Some(2));
        assert_eq!(records[0].sms, SmsReminder::Received);
    }

    #[test]
    fn test_from_frame_rejects_unknown_category() {
        let df = frame(&[30], &["Q"], &["No"]);
        let err = Dataset::from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidValue { column: GENDER, row: 0, .. }
        ));
    }

    #[test]
    fn test_from_frame_keeps_rows_with_gaps_in_unused_columns() {
        let df = df!(
            PATIENT_ID => &[Some(1.0f64), None],
            APPOINTMENT_ID => &[1i64, 2],
            GENDER => &["F", "M"],
            SCHEDULED_DAY => &["2016-04-29T18:38:08Z", "2016-04-29T16:08:27Z"],
            APPOINTMENT_DAY => &["2016-04-29T00:00:00Z", "2016-04-29T00:00:00Z"],
            AGE => &[30i64, 40],
            NEIGHBOURHOOD => &[None, Some("CENTRO")],
            SCHOLARSHIP => &[Some(0i32), None],
            HYPERTENSION => &[0i32, 0],
            DIABETES => &[0i32, 0],
            ALCOHOLISM => &[0i32, 0],
            HANDICAP => &[None, Some(1i32)],
            SMS_RECEIVED => &[0i32, 1],
            NO_SHOW => &["No", "Yes"]
        )
        .unwrap();

        let dataset = Dataset::from_frame(&df).unwrap();
        let records = dataset.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].neighbourhood, None);
        assert_eq!(records[0].handicap, None);
        assert_eq!(records[1].patient_id, None);
        assert_eq!(records[1].scholarship, None);
        assert_eq!(records[1].neighbourhood.as_deref(), Some("CENTRO"));

        let missing: Vec<(String, usize)> = crate::describe::missing_values(&df)
            .into_iter()
            .filter(|(_, nulls)| *nulls > 0)
            .collect();
        assert_eq!(
            missing,
            [
                (PATIENT_ID.to_string(), 1),
                (NEIGHBOURHOOD.to_string(), 1),
                (SCHOLARSHIP.to_string(), 1),
                (HANDICAP.to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_from_frame_requires_analysed_columns() {
        let df = df!(
            PATIENT_ID => &[1.0f64],
            APPOINTMENT_ID => &[1i64],
            GENDER => &["F"],
            SCHEDULED_DAY => &["2016-04-29T18:38:08Z"],
            APPOINTMENT_DAY => &["2016-04-29T00:00:00Z"],
            AGE => &[30i64],
            NEIGHBOURHOOD => &["CENTRO"],
            SCHOLARSHIP => &[0i32],
            HYPERTENSION => &[0i32],
            DIABETES => &[0i32],
            ALCOHOLISM => &[0i32],
            HANDICAP => &[0i32],
            SMS_RECEIVED => &[None::<i32>],
            NO_SHOW => &["No"]
        )
        .unwrap();

        let err = Dataset::from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingValue { column: SMS_RECEIVED, row: 0 }
        ));
    }
}
