use polars::prelude::{DataType, Field, Schema};
use std::fmt;
use std::str::FromStr;

pub const PATIENT_ID: &str = "PatientId";
pub const APPOINTMENT_ID: &str = "AppointmentID";
pub const GENDER: &str = "Gender";
pub const SCHEDULED_DAY: &str = "ScheduledDay";
pub const APPOINTMENT_DAY: &str = "AppointmentDay";
pub const AGE: &str = "Age";
pub const NEIGHBOURHOOD: &str = "Neighbourhood";
pub const SCHOLARSHIP: &str = "Scholarship";
pub const HYPERTENSION: &str = "Hipertension";
pub const DIABETES: &str = "Diabetes";
pub const ALCOHOLISM: &str = "Alcoholism";
pub const HANDICAP: &str = "Handcap";
pub const SMS_RECEIVED: &str = "SMS_received";
pub const NO_SHOW: &str = "No-show";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    Female,
    Male,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" => Ok(Gender::Female),
            "M" => Ok(Gender::Male),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "Female"),
            Gender::Male => write!(f, "Male"),
        }
    }
}

/// Whether the patient attended. The source column is phrased negatively:
/// `No-show = "No"` means the patient showed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Show,
    NoShow,
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "No" => Ok(Outcome::Show),
            "Yes" => Ok(Outcome::NoShow),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Show => write!(f, "Show"),
            Outcome::NoShow => write!(f, "No-show"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SmsReminder {
    NotReceived,
    Received,
}

impl From<bool> for SmsReminder {
    fn from(received: bool) -> Self {
        if received {
            SmsReminder::Received
        } else {
            SmsReminder::NotReceived
        }
    }
}

impl fmt::Display for SmsReminder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SmsReminder::NotReceived => write!(f, "No SMS"),
            SmsReminder::Received => write!(f, "Received SMS"),
        }
    }
}

/// One row of the appointments file.
///
/// Gender, age, SMS and outcome feed the report and must be present. The other
/// columns are kept as read, so a gap there shows up in the missing-value
/// counts instead of failing the load.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRecord {
    pub patient_id: Option<f64>,
    pub appointment_id: Option<i64>,
    pub gender: Gender,
    pub scheduled_day: Option<String>,
    pub appointment_day: Option<String>,
    pub age: i64,
    pub neighbourhood: Option<String>,
    pub scholarship: Option<bool>,
    pub hypertension: Option<bool>,
    pub diabetes: Option<bool>,
    pub alcoholism: Option<bool>,
    pub handicap: Option<u8>,
    pub sms: SmsReminder,
    pub outcome: Outcome,
}

impl AppointmentRecord {
    pub fn raw_schema() -> Schema {
        Schema::from_iter(
            vec![
                Field::new(PATIENT_ID, DataType::Float64),
                Field::new(APPOINTMENT_ID, DataType::Int64),
                Field::new(GENDER, DataType::Utf8),
                Field::new(SCHEDULED_DAY, DataType::Utf8),
                Field::new(APPOINTMENT_DAY, DataType::Utf8),
                Field::new(AGE, DataType::Int64),
                Field::new(NEIGHBOURHOOD, DataType::Utf8),
                Field::new(SCHOLARSHIP, DataType::Int32),
                Field::new(HYPERTENSION, DataType::Int32),
                Field::new(DIABETES, DataType::Int32),
                Field::new(ALCOHOLISM, DataType::Int32),
                Field::new(HANDICAP, DataType::Int32),
                Field::new(SMS_RECEIVED, DataType::Int32),
                Field::new(NO_SHOW, DataType::Utf8),
            ])
    }

    /// Every field except the float patient id takes part in equality as is;
    /// the id is compared by bit pattern so rows can be hashed.
    pub(crate) fn row_key(&self) -> RowKey<'_> {
        RowKey {
            patient_id: self.patient_id.map(f64::to_bits),
            appointment_id: self.appointment_id,
            gender: self.gender,
            scheduled_day: self.scheduled_day.as_deref(),
            appointment_day: self.appointment_day.as_deref(),
            age: self.age,
            neighbourhood: self.neighbourhood.as_deref(),
            flags: [
                self.scholarship,
                self.hypertension,
                self.diabetes,
                self.alcoholism,
            ],
            handicap: self.handicap,
            sms: self.sms,
            outcome: self.outcome,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct RowKey<'a> {
    patient_id: Option<u64>,
    appointment_id: Option<i64>,
    gender: Gender,
    scheduled_day: Option<&'a str>,
    appointment_day: Option<&'a str>,
    age: i64,
    neighbourhood: Option<&'a str>,
    flags: [Option<bool>; 4],
    handicap: Option<u8>,
    sms: SmsReminder,
    outcome: Outcome,
}
