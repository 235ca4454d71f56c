//! Appointment records as loaded from the feed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One scheduled clinic visit.
///
/// `values` holds every column of the source row, aligned with
/// [`AppointmentTable::columns`], so the classifier sees the row exactly as
/// it appeared in the feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRecord {
    /// Medical record number
    pub mrn: String,
    /// Appointment identifier
    pub appt_id: String,
    /// Clinic name
    pub clinic: String,
    /// Scheduled date and time
    pub appt_date: NaiveDateTime,
    /// Raw values for all feed columns
    pub values: Vec<String>,
}

impl AppointmentRecord {
    /// Create a record.
    pub fn new(
        mrn: impl Into<String>,
        appt_id: impl Into<String>,
        clinic: impl Into<String>,
        appt_date: NaiveDateTime,
        values: Vec<String>,
    ) -> Self {
        Self {
            mrn: mrn.into(),
            appt_id: appt_id.into(),
            clinic: clinic.into(),
            appt_date,
            values,
        }
    }

    /// Calendar date of the appointment.
    pub fn date(&self) -> NaiveDate {
        self.appt_date.date()
    }

    /// Time of day of the appointment.
    pub fn time(&self) -> NaiveTime {
        self.appt_date.time()
    }
}

/// The full appointment feed, read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentTable {
    columns: Vec<String>,
    records: Vec<AppointmentRecord>,
}

impl AppointmentTable {
    /// Build a table from already-parsed records.
    pub fn new(columns: Vec<String>, records: Vec<AppointmentRecord>) -> Self {
        Self { columns, records }
    }

    /// Column names, in feed order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records, in feed order.
    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the feed had no data rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct clinic names in order of first appearance.
    pub fn clinics(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .map(|r| r.clinic.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}
